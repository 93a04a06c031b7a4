//! Configuration validation engine.
//!
//! Checks a parsed [`RelayConfig`] for contradictions serde cannot express:
//! missing identities, duplicate route ids, negative durations, routes that
//! would relay a chat into itself.

use std::collections::HashSet;

use crate::schema::{DestinationConfig, RelayConfig, RouteConfig};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "missing-field", "duplicate", "conflict", "range", "loop",
    /// "disabled", "empty"
    pub category: &'static str,
    /// Dotted path, e.g. "routes[2].source"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    fn error(category: &'static str, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            category,
            path: path.into(),
            message: message.into(),
        }
    }

    fn warning(
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.category, self.path, self.message
        )
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }
}

/// Validate every route of `config`.
#[must_use]
pub fn validate(config: &RelayConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();

    if config.routes.is_empty() {
        diagnostics.push(Diagnostic::warning(
            "empty",
            "routes",
            "no routes configured; nothing will be relayed",
        ));
    }

    let mut seen_ids = HashSet::new();
    for (idx, route) in config.routes.iter().enumerate() {
        let path = format!("routes[{idx}]");
        let id = route.id.trim();
        if id.is_empty() {
            diagnostics.push(Diagnostic::error(
                "missing-field",
                format!("{path}.id"),
                "route id must not be empty",
            ));
        } else if !seen_ids.insert(id.to_string()) {
            diagnostics.push(Diagnostic::error(
                "duplicate",
                format!("{path}.id"),
                format!("route id \"{id}\" is used more than once"),
            ));
        }
        check_route(route, &path, &mut diagnostics);
    }

    ValidationResult { diagnostics }
}

fn check_route(route: &RouteConfig, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    if !route.enabled {
        diagnostics.push(Diagnostic::warning(
            "disabled",
            path,
            format!("route \"{}\" is disabled", route.id),
        ));
    }

    let source = &route.source;
    let handle = source
        .handle
        .as_deref()
        .map(|h| {
            let h = h.trim();
            h.strip_prefix(source.network.sigil()).unwrap_or(h)
        });
    if handle.is_some_and(str::is_empty) {
        diagnostics.push(Diagnostic::error(
            "missing-field",
            format!("{path}.source.handle"),
            "handle must not be empty",
        ));
    }
    if source.chat_id.is_none() && handle.is_none() {
        diagnostics.push(Diagnostic::error(
            "missing-field",
            format!("{path}.source"),
            "source needs a chat_id, a handle, or both",
        ));
    }

    if route.destinations.is_empty() {
        diagnostics.push(Diagnostic::error(
            "missing-field",
            format!("{path}.destinations"),
            "route needs at least one destination",
        ));
    }

    let mut seen: Vec<&DestinationConfig> = Vec::new();
    for (idx, dest) in route.destinations.iter().enumerate() {
        let dest_path = format!("{path}.destinations[{idx}]");
        match (dest.chat_id, dest.user.as_deref()) {
            (Some(_), Some(_)) => diagnostics.push(Diagnostic::error(
                "conflict",
                &dest_path,
                "destination has both chat_id and user; pick one",
            )),
            (None, None) => diagnostics.push(Diagnostic::error(
                "missing-field",
                &dest_path,
                "destination needs a chat_id or a user",
            )),
            (None, Some(user)) if user.trim().is_empty() => diagnostics.push(Diagnostic::error(
                "missing-field",
                format!("{dest_path}.user"),
                "user must not be empty",
            )),
            _ => {},
        }

        if dest.network == source.network && dest.chat_id.is_some() && dest.chat_id == source.chat_id
        {
            diagnostics.push(Diagnostic::warning(
                "loop",
                &dest_path,
                "destination is the source chat; messages would be relayed into themselves",
            ));
        }

        if seen.contains(&dest) {
            diagnostics.push(Diagnostic::warning(
                "duplicate",
                &dest_path,
                "destination listed twice; it will receive every message twice",
            ));
        }
        seen.push(dest);
    }

    let options = &route.options;
    if options.delay_ms < 0 {
        diagnostics.push(Diagnostic::error(
            "range",
            format!("{path}.options.delay_ms"),
            format!("delay_ms must be >= 0 (got {})", options.delay_ms),
        ));
    }
    if options.batch_window_ms < 0 {
        diagnostics.push(Diagnostic::error(
            "range",
            format!("{path}.options.batch_window_ms"),
            format!(
                "batch_window_ms must be >= 0 (got {})",
                options.batch_window_ms
            ),
        ));
    }
}
