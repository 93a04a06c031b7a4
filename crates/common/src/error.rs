use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A styling span or UTF-16 range did not fit its body text.
    #[error("span {start}..{end} out of bounds for body of length {len}")]
    SpanOutOfBounds { start: usize, end: usize, len: usize },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
