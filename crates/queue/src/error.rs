#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The worker task has exited; nothing can be enqueued any more.
    #[error("queue worker is no longer running")]
    Closed,
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::Closed
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::Closed
    }
}

pub type Result<T> = std::result::Result<T, Error>;
