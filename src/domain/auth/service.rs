use super::error::AuthServiceError;
use super::model::{AuthSession, SignUpOutcome};
use super::AuthProvider;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

pub struct AuthService {
    provider: Option<Arc<dyn AuthProvider>>,
    session: Mutex<Option<AuthSession>>,
}

impl AuthService {
    /// `provider` is `None` when the identity provider is not configured.
    pub fn new(provider: Option<Arc<dyn AuthProvider>>) -> Self {
        Self {
            provider,
            session: Mutex::new(None),
        }
    }
}

#[async_trait]
pub trait AuthServiceApi: Send + Sync {
    fn is_configured(&self) -> bool;

    /// The signed-in session, unless it has expired.
    fn current_session(&self) -> Option<AuthSession>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthServiceError>;

    async fn sign_up(&self, email: &str, password: &str)
        -> Result<SignUpOutcome, AuthServiceError>;

    /// Forget the local session and revoke it with the provider.
    async fn sign_out(&self) -> Result<(), AuthServiceError>;
}

#[async_trait]
impl AuthServiceApi for AuthService {
    fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    fn current_session(&self) -> Option<AuthSession> {
        self.session
            .lock()
            .clone()
            .filter(|session| !session.is_expired(Utc::now()))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthServiceError> {
        let provider = self.provider()?;
        let email = validate_credentials(email, password)?;

        let session = provider.sign_in_with_password(email, password).await?;

        tracing::info!(user_id = %session.user.id, "Signed in");
        *self.session.lock() = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, AuthServiceError> {
        let provider = self.provider()?;
        let email = validate_credentials(email, password)?;

        match provider.sign_up(email, password).await? {
            Some(session) => {
                tracing::info!(user_id = %session.user.id, "Account created and signed in");
                *self.session.lock() = Some(session.clone());
                Ok(SignUpOutcome::SignedIn(session))
            }
            None => {
                tracing::info!("Account created, e-mail confirmation pending");
                Ok(SignUpOutcome::ConfirmationRequired)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthServiceError> {
        let provider = self.provider()?;
        let session = self.session.lock().take();
        let Some(session) = session else {
            return Ok(());
        };

        if let Err(e) = provider.sign_out(&session.access_token).await {
            tracing::warn!(error = %e, "Remote sign-out failed, local session cleared");
        }

        Ok(())
    }
}

impl AuthService {
    fn provider(&self) -> Result<&Arc<dyn AuthProvider>, AuthServiceError> {
        self.provider.as_ref().ok_or(AuthServiceError::NotConfigured)
    }
}

fn validate_credentials<'a>(email: &'a str, password: &str) -> Result<&'a str, AuthServiceError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthServiceError::Invalid("A valid e-mail address is required".to_string()));
    }
    if password.is_empty() {
        return Err(AuthServiceError::Invalid("Password is required".to_string()));
    }
    Ok(email)
}
