use crate::domain::auth::{AuthProvider, AuthSession};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// The provider reports errors under different keys depending on the endpoint.
#[derive(Debug, Default, Deserialize)]
struct SupabaseErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl SupabaseErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Supabase Auth (GoTrue) REST client for email/password accounts.
pub struct SupabaseAuthClient {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
}

impl SupabaseAuthClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Map a failed response to an authentication error with the provider's message.
    async fn failure(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<SupabaseErrorBody>(&body)
            .ok()
            .and_then(SupabaseErrorBody::into_message)
            .unwrap_or_else(|| format!("Auth request failed with status {}", status.as_u16()));

        tracing::warn!(status = status.as_u16(), message = %message, "Supabase auth request failed");
        AppError::Unauthorized(message)
    }
}

#[async_trait]
impl AuthProvider for SupabaseAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let response = self
            .http_client
            .post(self.endpoint("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Supabase sign-in failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        response
            .json::<AuthSession>()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Supabase session: {}", e)))
    }

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<Option<AuthSession>> {
        let response = self
            .http_client
            .post(self.endpoint("signup"))
            .header("apikey", &self.anon_key)
            .json(&PasswordCredentials { email, password })
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Supabase sign-up failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        // With e-mail confirmation on, the provider answers with the bare user.
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Supabase sign-up: {}", e)))?;

        if body.get("access_token").is_none() {
            return Ok(None);
        }

        serde_json::from_value(body)
            .map(Some)
            .map_err(|e| AppError::Internal(format!("Failed to parse Supabase session: {}", e)))
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Supabase sign-out failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::failure(response).await);
        }

        Ok(())
    }
}
