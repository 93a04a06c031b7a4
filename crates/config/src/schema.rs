/// Config schema types (routes, dispatch tuning).
use {
    crossrelay_common::Network,
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelayConfig {
    pub routes: Vec<RouteConfig>,
    pub dispatch: DispatchConfig,
}

/// Dispatcher and queue tuning shared by every route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Minimum gap between two "unmatched event" log lines for one source.
    pub unmatched_log_cooldown_secs: u64,
    /// Bound of the command channel feeding the queue worker.
    pub queue_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            unmatched_log_cooldown_secs: 60,
            queue_capacity: 1024,
        }
    }
}

/// One relay rule: a source chat fanned out to destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub source: SourceConfig,
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
    #[serde(default)]
    pub options: RouteOptionsConfig,
}

fn default_true() -> bool {
    true
}

/// Which chat a route listens to. At least one of `chat_id` / `handle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub network: Network,
    #[serde(default)]
    pub chat_id: Option<i64>,
    /// Public handle, with or without the network sigil (`@news`, `news`).
    #[serde(default)]
    pub handle: Option<String>,
}

/// Where a route delivers. Exactly one of `chat_id` / `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    pub network: Network,
    #[serde(default)]
    pub chat_id: Option<i64>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Per-route timing and formatting.
///
/// Durations are signed so a negative value reaches validation and gets a
/// readable diagnostic instead of a type error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteOptionsConfig {
    pub delay_ms: i64,
    pub batch_window_ms: i64,
    pub include_source_footer: bool,
}

impl Default for RouteOptionsConfig {
    fn default() -> Self {
        Self {
            delay_ms: 0,
            batch_window_ms: 1_000,
            include_source_footer: false,
        }
    }
}
