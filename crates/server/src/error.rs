use thiserror::Error;

/// Request-level failures, mapped to HTTP statuses in `http_server`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing, malformed, or oversized user input. No write is attempted.
    #[error("{0}")]
    Validation(String),
    /// Admin key mismatch. Carries no detail about the store's contents.
    #[error("unauthorized")]
    Unauthorized,
    /// The submission log does not exist yet.
    #[error("not found")]
    NotFound,
    /// Append or read failure on the submission log.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
