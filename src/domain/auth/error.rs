use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("authentication is not configured")]
    NotConfigured,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for AuthServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized(msg) => AuthServiceError::Unauthorized(msg),
            AppError::BadRequest(msg) => AuthServiceError::Invalid(msg),
            AppError::Configuration(_) => AuthServiceError::NotConfigured,
            _ => AuthServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(err: AuthServiceError) -> Self {
        match err {
            AuthServiceError::Invalid(msg) => AppError::BadRequest(msg),
            AuthServiceError::Unauthorized(msg) => AppError::Unauthorized(msg),
            AuthServiceError::NotConfigured => {
                AppError::Configuration("Supabase URL or anon key not set".to_string())
            }
            AuthServiceError::Dependency(msg) => AppError::Internal(msg),
            AuthServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
