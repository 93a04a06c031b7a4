use std::{fmt, time::Duration};

use {
    crossrelay_common::{InboundEvent, Network},
    crossrelay_config::{DestinationConfig, RouteConfig, SourceConfig},
};

use crate::error::{Error, Result};

/// Lowercase `handle` and strip surrounding whitespace plus one leading
/// network sigil (`@news` and `NEWS` both become `news` on Telegram).
#[must_use]
pub fn normalize_handle(network: Network, handle: &str) -> String {
    let trimmed = handle.trim();
    trimmed
        .strip_prefix(network.sigil())
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// Identity constraints an event's chat must satisfy. At least one is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMatcher {
    pub network: Network,
    pub chat_id: Option<i64>,
    /// Stored normalized, see [`normalize_handle`].
    pub handle: Option<String>,
}

impl SourceMatcher {
    /// Every configured constraint must hold; absent ones are ignored.
    #[must_use]
    pub fn matches(&self, event: &InboundEvent) -> bool {
        if event.network != self.network {
            return false;
        }
        if let Some(chat_id) = self.chat_id
            && event.chat_id != chat_id
        {
            return false;
        }
        if let Some(handle) = &self.handle {
            let Some(event_handle) = event.chat_handle.as_deref() else {
                return false;
            };
            if normalize_handle(self.network, event_handle) != *handle {
                return false;
            }
        }
        self.chat_id.is_some() || self.handle.is_some()
    }
}

impl TryFrom<&SourceConfig> for SourceMatcher {
    type Error = String;

    fn try_from(cfg: &SourceConfig) -> std::result::Result<Self, String> {
        let handle = cfg
            .handle
            .as_deref()
            .map(|h| normalize_handle(cfg.network, h));
        if handle.as_deref().is_some_and(str::is_empty) {
            return Err("source handle is empty".into());
        }
        if cfg.chat_id.is_none() && handle.is_none() {
            return Err("source has no identity constraint".into());
        }
        Ok(Self {
            network: cfg.network,
            chat_id: cfg.chat_id,
            handle,
        })
    }
}

impl fmt::Display for SourceMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)?;
        if let Some(chat_id) = self.chat_id {
            write!(f, " chat {chat_id}")?;
        }
        if let Some(handle) = &self.handle {
            write!(f, " {}{handle}", self.network.sigil())?;
        }
        Ok(())
    }
}

/// Who a destination delivers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Chat(i64),
    User(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat(id) => write!(f, "chat {id}"),
            Self::User(user) => write!(f, "user {user}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    pub network: Network,
    pub target: Target,
}

impl TryFrom<&DestinationConfig> for Destination {
    type Error = String;

    fn try_from(cfg: &DestinationConfig) -> std::result::Result<Self, String> {
        let target = match (cfg.chat_id, cfg.user.as_deref().map(str::trim)) {
            (Some(id), None) => Target::Chat(id),
            (None, Some(user)) if !user.is_empty() => Target::User(user.to_string()),
            (Some(_), Some(_)) => return Err("destination has both chat_id and user".into()),
            _ => return Err("destination has no target".into()),
        };
        Ok(Self {
            network: cfg.network,
            target,
        })
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.network, self.target)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteOptions {
    pub delay: Duration,
    pub batch_window: Duration,
    pub include_source_footer: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            delay: Duration::ZERO,
            batch_window: Duration::from_millis(1_000),
            include_source_footer: false,
        }
    }
}

/// A validated relay rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: String,
    pub enabled: bool,
    pub source: SourceMatcher,
    pub destinations: Vec<Destination>,
    pub options: RouteOptions,
}

impl Route {
    /// Enabled and the source matches.
    #[must_use]
    pub fn applies_to(&self, event: &InboundEvent) -> bool {
        self.enabled && self.source.matches(event)
    }
}

impl TryFrom<&RouteConfig> for Route {
    type Error = Error;

    fn try_from(cfg: &RouteConfig) -> Result<Self> {
        let id = cfg.id.trim().to_string();
        let source =
            SourceMatcher::try_from(&cfg.source).map_err(|m| Error::invalid_route(&id, m))?;
        let destinations = cfg
            .destinations
            .iter()
            .map(Destination::try_from)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|m| Error::invalid_route(&id, m))?;
        if destinations.is_empty() {
            return Err(Error::invalid_route(id, "no destinations"));
        }
        let delay = millis(cfg.options.delay_ms).ok_or_else(|| {
            Error::invalid_route(&id, format!("negative delay_ms {}", cfg.options.delay_ms))
        })?;
        let batch_window = millis(cfg.options.batch_window_ms).ok_or_else(|| {
            Error::invalid_route(
                &id,
                format!("negative batch_window_ms {}", cfg.options.batch_window_ms),
            )
        })?;

        Ok(Self {
            id,
            enabled: cfg.enabled,
            source,
            destinations,
            options: RouteOptions {
                delay,
                batch_window,
                include_source_footer: cfg.options.include_source_footer,
            },
        })
    }
}

fn millis(ms: i64) -> Option<Duration> {
    u64::try_from(ms).ok().map(Duration::from_millis)
}
