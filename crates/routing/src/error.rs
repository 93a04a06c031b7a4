use crossrelay_config::Diagnostic;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("route table rejected {} config error(s): {}", diagnostics.len(), first_message(diagnostics))]
    InvalidConfig { diagnostics: Vec<Diagnostic> },

    #[error("route {route}: {message}")]
    InvalidRoute { route: String, message: String },
}

impl Error {
    #[must_use]
    pub fn invalid_route(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRoute {
            route: route.into(),
            message: message.into(),
        }
    }
}

fn first_message(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
