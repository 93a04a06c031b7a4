use std::error::Error as StdError;

/// Failures while fetching or uploading a media candidate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source or destination refused the file because of its size.
    #[error("media too large: {detail}")]
    TooLarge { detail: String },

    #[error("media unavailable: {message}")]
    Unavailable { message: String },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A bug or broken invariant, not a property of the media itself.
    #[error("internal media error: {message}")]
    Internal { message: String },
}

impl Error {
    #[must_use]
    pub fn too_large(detail: impl Into<String>) -> Self {
        Self::TooLarge {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn external<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether the failure was caused by file size.
    ///
    /// Clients do not always map size refusals to [`Error::TooLarge`]; the
    /// Telegram Bot API, for one, answers `Bad Request: file is too big`.
    #[must_use]
    pub fn is_too_large(&self) -> bool {
        match self {
            Self::TooLarge { .. } => true,
            Self::Unavailable { message } => mentions_size_limit(message),
            Self::External { source, .. } => mentions_size_limit(&source.to_string()),
            Self::Internal { .. } => false,
        }
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

fn mentions_size_limit(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("too big") || lower.contains("too large")
}

pub type Result<T> = std::result::Result<T, Error>;
