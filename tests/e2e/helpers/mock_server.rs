use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-places-key";
pub const ANON_KEY: &str = "test-anon-key";
pub const PASSWORD: &str = "correct horse";
pub const ACCESS_TOKEN: &str = "test-access-token";
pub const USER_ID: &str = "8f0c3f2e-5d6b-4c1a-9b7e-2a1d4c6e8f00";

pub const ALPHA_ID: &str = "ChIJalpha0000000001";
pub const BRAVO_ID: &str = "ChIJbravo0000000002";
pub const CHARLIE_ID: &str = "ChIJcharlie00000003";
pub const DELTA_ID: &str = "ChIJdelta0000000004";
/// Nearby-only place with wrongly typed fields
pub const ECHO_ID: &str = "ChIJecho00000000005";
/// Valid-looking id the details endpoint does not know
pub const MISSING_ID: &str = "ChIJmissing00000009";

pub const SECOND_PAGE_TOKEN: &str = "page-2";

/// A request the mock received, kept for assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    fail_search: AtomicBool,
}

/// Places API and Supabase Auth stand-in on an ephemeral local port.
#[derive(Clone)]
pub struct MockServer {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        // Google-style `:verb` paths do not play well with router path params,
        // so everything goes through one dispatcher.
        let app = Router::new().fallback(dispatch).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    /// Make text search answer with a 500 until switched back.
    pub fn fail_search(&self, fail: bool) {
        self.state.fail_search.store(fail, Ordering::SeqCst);
    }
}

async fn dispatch(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let request = RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    };
    state.requests.lock().push(request.clone());

    let path = request.path.as_str();
    if path.starts_with("/v1/") && request.header("x-goog-api-key") != Some(API_KEY) {
        return error(StatusCode::FORBIDDEN, "API key not valid");
    }

    match (method.as_str(), path) {
        ("POST", "/v1/places:searchText") => search_text(&state, &request),
        ("POST", "/v1/places:searchNearby") => (
            StatusCode::OK,
            Json(json!({
                "places": [alpha(), bravo(), charlie(), delta(), echo()]
            })),
        )
            .into_response(),
        ("GET", p) if p.starts_with("/v1/places/") => place_details(&p["/v1/places/".len()..]),
        ("POST", "/auth/v1/token") => token(&request),
        ("POST", "/auth/v1/signup") => signup(&request),
        ("POST", "/auth/v1/logout") => logout(&request),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn search_text(state: &MockState, request: &RecordedRequest) -> Response {
    if state.fail_search.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Backend exploded");
    }

    match request.body.get("pageToken").and_then(Value::as_str) {
        None => (
            StatusCode::OK,
            Json(json!({
                "places": [alpha(), bravo(), charlie()],
                "nextPageToken": SECOND_PAGE_TOKEN
            })),
        )
            .into_response(),
        // Charlie shows up again; the trailing token is blank
        Some(SECOND_PAGE_TOKEN) => (
            StatusCode::OK,
            Json(json!({
                "places": [charlie(), delta()],
                "nextPageToken": "   "
            })),
        )
            .into_response(),
        Some(_) => error(StatusCode::BAD_REQUEST, "Invalid page token"),
    }
}

fn place_details(id: &str) -> Response {
    if id != ALPHA_ID {
        return StatusCode::NOT_FOUND.into_response();
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": ALPHA_ID,
            "displayName": { "text": "Alpha Trattoria", "languageCode": "en" },
            "photos": [
                { "name": format!("places/{}/photos/detail-1", ALPHA_ID) },
                { "name": format!("places/{}/photos/detail-2", ALPHA_ID) },
                { "name": format!("places/{}/photos/list-1", ALPHA_ID) }
            ]
        })),
    )
        .into_response()
}

fn token(request: &RecordedRequest) -> Response {
    if request.header("apikey") != Some(ANON_KEY) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid API key" })),
        )
            .into_response();
    }
    if request.query.as_deref() != Some("grant_type=password") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "unsupported_grant_type" })),
        )
            .into_response();
    }

    let email = request.body.get("email").and_then(Value::as_str).unwrap_or_default();
    let password = request.body.get("password").and_then(Value::as_str);
    if password != Some(PASSWORD) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })),
        )
            .into_response();
    }

    (StatusCode::OK, Json(session(email))).into_response()
}

fn signup(request: &RecordedRequest) -> Response {
    let email = request.body.get("email").and_then(Value::as_str).unwrap_or_default();

    if email == "taken@example.com" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "code": 422, "msg": "User already registered" })),
        )
            .into_response();
    }
    if email.ends_with("@confirm.example.com") {
        // Confirmation pending: the bare user, no tokens
        return (StatusCode::OK, Json(user(email))).into_response();
    }

    (StatusCode::OK, Json(session(email))).into_response()
}

fn logout(request: &RecordedRequest) -> Response {
    let expected = format!("Bearer {}", ACCESS_TOKEN);
    if request.header("authorization") != Some(expected.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "This endpoint requires a Bearer token" })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": { "code": status.as_u16(), "message": message }
        })),
    )
        .into_response()
}

fn user(email: &str) -> Value {
    json!({
        "id": USER_ID,
        "aud": "authenticated",
        "email": email,
        "user_metadata": { "full_name": "Ada Lovelace" }
    })
}

fn session(email: &str) -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1893456000,
        "refresh_token": "test-refresh-token",
        "user": user(email)
    })
}

fn place(id: &str, name: &str, primary_type: Option<&str>, types: &[&str], rating: f64) -> Value {
    let mut place = json!({
        "id": id,
        "displayName": { "text": name, "languageCode": "en" },
        "formattedAddress": format!("{} Main St, Vancouver, WA", &id[4..9]),
        "types": types,
        "rating": rating,
        "photos": [{ "name": format!("places/{}/photos/list-1", id), "widthPx": 1200 }]
    });
    if let Some(label) = primary_type {
        place["primaryTypeDisplayName"] = json!({ "text": label, "languageCode": "en" });
    }
    place
}

pub fn alpha() -> Value {
    place(
        ALPHA_ID,
        "Alpha Trattoria",
        Some("Italian Restaurant"),
        &["italian_restaurant", "restaurant", "food"],
        4.6,
    )
}

pub fn bravo() -> Value {
    place(BRAVO_ID, "Bravo Sushi", None, &["restaurant", "sushi_restaurant"], 4.4)
}

pub fn charlie() -> Value {
    place(CHARLIE_ID, "Charlie's", None, &["restaurant", "food", "establishment"], 3.9)
}

pub fn delta() -> Value {
    place(DELTA_ID, "Delta Taqueria", Some("Mexican Restaurant"), &["mexican_restaurant"], 4.8)
}

pub fn echo() -> Value {
    json!({
        "id": ECHO_ID,
        "displayName": { "text": "Echo Diner", "languageCode": "en" },
        "formattedAddress": 123,
        "types": ["diner", null],
        "rating": "n/a",
        "photos": "none"
    })
}
