use crate::e2e::helpers;

use castiron_feed::domain::auth::{
    AuthProvider, AuthService, AuthServiceApi, AuthServiceError, SignUpOutcome,
};
use castiron_feed::error::AppError;
use helpers::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_context::test_context;

fn auth_service(ctx: &TestContext) -> AuthService {
    AuthService::new(Some(Arc::new(ctx.auth_client()) as Arc<dyn AuthProvider>))
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_in_with_email_and_password(ctx: &TestContext) {
    let client = ctx.auth_client();

    let session = client
        .sign_in_with_password("ada@example.com", PASSWORD)
        .await
        .unwrap();

    assert_eq!(session.access_token, ACCESS_TOKEN);
    assert_eq!(session.user.id.to_string(), USER_ID);
    assert_eq!(session.user.display_name(), "Ada Lovelace");
    assert_eq!(session.expires_at.map(|t| t.timestamp()), Some(1893456000));

    let requests = ctx.server.requests_to("/auth/v1/token");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("grant_type=password"));
    assert_eq!(requests[0].header("apikey"), Some(ANON_KEY));
    assert_eq!(
        requests[0].body,
        json!({ "email": "ada@example.com", "password": PASSWORD })
    );
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_provider_message_for_bad_credentials(ctx: &TestContext) {
    let client = ctx.auth_client();

    let result = client
        .sign_in_with_password("ada@example.com", "wrong")
        .await;

    match result {
        Err(AppError::Unauthorized(message)) => assert_eq!(message, "Invalid login credentials"),
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_anon_key(ctx: &TestContext) {
    let client = castiron_feed::infrastructure::auth::SupabaseAuthClient::new(
        ctx.server.base_url.clone(),
        "not-the-key".to_string(),
    );

    let result = client.sign_in_with_password("ada@example.com", PASSWORD).await;

    match result {
        Err(AppError::Unauthorized(message)) => assert_eq!(message, "Invalid API key"),
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_sign_up_and_start_a_session(ctx: &TestContext) {
    let auth = auth_service(ctx);

    let outcome = auth.sign_up("new@example.com", PASSWORD).await.unwrap();

    let SignUpOutcome::SignedIn(session) = outcome else {
        panic!("expected a session");
    };
    assert_eq!(session.user.email.as_deref(), Some("new@example.com"));
    assert_eq!(auth.current_session(), Some(session));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_report_pending_email_confirmation(ctx: &TestContext) {
    let auth = auth_service(ctx);

    let outcome = auth
        .sign_up("new@confirm.example.com", PASSWORD)
        .await
        .unwrap();

    assert_eq!(outcome, SignUpOutcome::ConfirmationRequired);
    assert_eq!(auth.current_session(), None);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_surface_sign_up_conflicts(ctx: &TestContext) {
    let auth = auth_service(ctx);

    let result = auth.sign_up("taken@example.com", PASSWORD).await;

    match result {
        Err(AuthServiceError::Unauthorized(message)) => {
            assert_eq!(message, "User already registered")
        }
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_revoke_session_on_sign_out(ctx: &TestContext) {
    let auth = auth_service(ctx);
    auth.sign_in("ada@example.com", PASSWORD).await.unwrap();

    auth.sign_out().await.unwrap();

    assert_eq!(auth.current_session(), None);
    let requests = ctx.server.requests_to("/auth/v1/logout");
    assert_eq!(requests.len(), 1);
    let expected = format!("Bearer {}", ACCESS_TOKEN);
    assert_eq!(requests[0].header("authorization"), Some(expected.as_str()));
    assert_eq!(requests[0].header("apikey"), Some(ANON_KEY));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_validate_credentials_before_calling_provider(ctx: &TestContext) {
    let auth = auth_service(ctx);

    let result = auth.sign_in("not-an-email", PASSWORD).await;

    assert!(matches!(result, Err(AuthServiceError::Invalid(_))));
    assert!(ctx.server.requests().is_empty());
}
