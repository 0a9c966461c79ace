/// Main application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Places provider error: {0}")]
    Provider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid provider response: {0}")]
    Decode(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures caused by the remote provider or the transport to it,
    /// as opposed to local misconfiguration or bad input.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::Http(_) | Self::Decode(_))
    }
}

/// Custom result type for the application
pub type AppResult<T> = Result<T, AppError>;
