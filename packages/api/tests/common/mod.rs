//! In-process mock of the remote backend, enough of it to exercise the
//! authenticated-request/refresh protocol and the typed services.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use api::ApiConfig;

pub const EMAIL: &str = "amira@example.com";
pub const PASSWORD: &str = "hunter2!";

pub struct MockState {
    /// The access token the backend currently accepts.
    pub valid_access: Mutex<String>,
    /// The refresh token the backend currently accepts.
    pub valid_refresh: Mutex<String>,
    /// The access token the next successful refresh will issue.
    pub next_access: Mutex<String>,
    /// When set, a successful refresh also rotates the refresh token.
    pub rotate_refresh_to: Mutex<Option<String>>,
    /// Force the refresh endpoint to reject everything.
    pub fail_refresh: AtomicBool,
    /// Force `/api/countries/` to 401 even with a valid token.
    pub always_unauthorized: AtomicBool,

    pub refresh_calls: AtomicUsize,
    pub countries_calls: AtomicUsize,
    pub profile_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
}

impl MockState {
    fn new() -> Self {
        Self {
            valid_access: Mutex::new("A1".to_string()),
            valid_refresh: Mutex::new("R1".to_string()),
            next_access: Mutex::new("A2".to_string()),
            rotate_refresh_to: Mutex::new(None),
            fail_refresh: AtomicBool::new(false),
            always_unauthorized: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            countries_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        }
    }

    /// Make the currently valid access token stale, as if it expired.
    pub fn expire_access(&self) {
        *self.valid_access.lock().unwrap() = "A1-expired-server-side".to_string();
    }

    fn bearer_ok(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

fn profile_json() -> Value {
    json!({
        "id": 7,
        "username": "amira",
        "email": EMAIL,
        "first_name": "Amira",
        "last_name": "Hassan",
        "phone_number": "+249912345678"
    })
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
        .into_response()
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> axum::response::Response {
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        let access = state.valid_access.lock().unwrap().clone();
        let refresh = state.valid_refresh.lock().unwrap().clone();
        Json(json!({
            "message": "Login successful",
            "tokens": {"access": access, "refresh": refresh},
            "user": profile_json()
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> axum::response::Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // Slow enough that a second concurrent 401 is still waiting on the
    // client's refresh lock when the first refresh lands.
    tokio::time::sleep(Duration::from_millis(25)).await;

    if state.fail_refresh.load(Ordering::SeqCst) {
        return unauthorized();
    }
    let expected_refresh = state.valid_refresh.lock().unwrap().clone();
    if body["refresh"] != json!(expected_refresh) {
        return unauthorized();
    }

    let new_access = state.next_access.lock().unwrap().clone();
    *state.valid_access.lock().unwrap() = new_access.clone();

    let mut response = json!({ "access": new_access });
    if let Some(rotated) = state.rotate_refresh_to.lock().unwrap().clone() {
        *state.valid_refresh.lock().unwrap() = rotated.clone();
        response["refresh"] = json!(rotated);
    }
    Json(response).into_response()
}

async fn logout(Json(_body): Json<Value>) -> axum::response::Response {
    Json(json!({"message": "Logout successful"})).into_response()
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> axum::response::Response {
    state.profile_calls.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    Json(profile_json()).into_response()
}

async fn update_profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> axum::response::Response {
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("multipart/form-data") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "expected multipart/form-data"})),
        )
            .into_response();
    }
    let mut user = profile_json();
    user["first_name"] = json!("Amira-Louise");
    Json(user).into_response()
}

async fn countries(State(state): State<Arc<MockState>>, headers: HeaderMap) -> axum::response::Response {
    state.countries_calls.fetch_add(1, Ordering::SeqCst);
    if state.always_unauthorized.load(Ordering::SeqCst) || !state.bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!([
        {
            "id": 1,
            "name": "Canada",
            "description": "Study and work destinations",
            "code": "CA",
            "types": [{"id": 3, "name": "Student Visa"}]
        },
        {
            "id": 2,
            "name": "Romania",
            "description": "Schengen-adjacent destination",
            "code": "RO",
            "types": []
        }
    ]))
    .into_response()
}

async fn visa_type_detail() -> axum::response::Response {
    Json(json!({
        "id": 3,
        "name": "Student Visa",
        "headings": "Study permits",
        "description": "For admitted students",
        "active": true,
        "processes": [{"id": 1, "points": "Gather transcripts"}],
        "overviews": [{"id": 1, "points": "Overview", "overview": "Long form"}],
        "notes": [{"id": 1, "notes": "Apply early"}],
        "required_documents": [{"id": 1, "document_name": "Passport"}]
    }))
    .into_response()
}

async fn applications(State(state): State<Arc<MockState>>, headers: HeaderMap) -> axum::response::Response {
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!([
        {
            "id": 11,
            "status": "submitted",
            "visa_type": {"id": 3, "name": "Student Visa"},
            "country": {"id": 1, "name": "Canada"},
            "documents": [
                {"id": 21, "document_name": "Passport", "file": "/media/docs/passport.pdf", "status": "pending"}
            ]
        }
    ]))
    .into_response()
}

async fn submit_application(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> axum::response::Response {
    state.submit_calls.fetch_add(1, Ordering::SeqCst);
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with("multipart/form-data") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "expected multipart/form-data"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": 12, "status": "draft", "documents": []})),
    )
        .into_response()
}

async fn admin_login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> axum::response::Response {
    if body["email"] == "staff@example.com" && body["password"] == PASSWORD {
        let access = state.valid_access.lock().unwrap().clone();
        let refresh = state.valid_refresh.lock().unwrap().clone();
        Json(json!({
            "access": access,
            "refresh": refresh,
            "email": "staff@example.com",
            "username": "staff",
            "is_superuser": true
        }))
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn admin_countries(State(state): State<Arc<MockState>>, headers: HeaderMap) -> axum::response::Response {
    countries(State(state), headers).await
}

async fn admin_create_country(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "id": 9,
            "name": body["name"],
            "description": body["description"],
            "code": body["code"],
            "types": []
        })),
    )
        .into_response()
}

fn consultation_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Omar Idris",
        "email": "omar@example.com",
        "phone_number": "+249911111111",
        "message": "Interested in a student visa",
        "created_at": "2024-05-01T10:00:00Z"
    })
}

async fn admin_consultations(State(state): State<Arc<MockState>>, headers: HeaderMap) -> axum::response::Response {
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!([consultation_json(5)])).into_response()
}

async fn admin_consultation_detail(State(state): State<Arc<MockState>>, headers: HeaderMap) -> axum::response::Response {
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    Json(consultation_json(5)).into_response()
}

async fn admin_review(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> axum::response::Response {
    if !state.bearer_ok(&headers) {
        return unauthorized();
    }
    Json(json!({
        "id": 11,
        "status": body["status"],
        "rejection_reason": body.get("rejection_reason").cloned().unwrap_or(Value::Null),
        "documents": []
    }))
    .into_response()
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/accounts/login/", post(login))
        .route("/api/accounts/login/refresh/", post(refresh))
        .route("/api/accounts/logout/", post(logout))
        .route("/api/accounts/profile/", get(profile).put(update_profile))
        .route("/api/countries/", get(countries))
        .route("/api/visa-types/3/", get(visa_type_detail))
        .route(
            "/api/v2/visa-applications/",
            get(applications).post(submit_application),
        )
        .route("/api/admin/login/", post(admin_login))
        .route("/api/admin/token/refresh/", post(refresh))
        .route(
            "/api/admin/countries/",
            get(admin_countries).post(admin_create_country),
        )
        .route("/api/admin/visa-applications/11/", patch(admin_review))
        .route("/api/admin/consultations/", get(admin_consultations))
        .route("/api/admin/consultations/5/", get(admin_consultation_detail))
        // The user-side document re-upload goes to the same handler shape.
        .route("/api/v2/visa-applications/11/", put(submit_application))
        .with_state(state)
}

/// Start the mock backend on an ephemeral port.
pub async fn spawn_backend() -> (ApiConfig, Arc<MockState>) {
    let state = Arc::new(MockState::new());
    let app = router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });
    (ApiConfig::new(format!("http://{addr}")), state)
}
