pub mod error;
pub mod model;
pub mod service;

pub use error::AuthServiceError;
pub use model::{AuthSession, AuthUser, SignUpOutcome, UserMetadata};
pub use service::{AuthService, AuthServiceApi};

use crate::error::AppResult;
use async_trait::async_trait;

/// Email/password identity provider. Token handling is entirely the
/// provider's business; we only keep the session it hands back.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession>;

    /// `None` when the account still has to be confirmed by e-mail.
    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Option<AuthSession>>;

    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}
