//! In-process stand-in for the inventory REST API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use stockpanel_client::{ClientConfig, MemoryStorage, SessionStorage};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const CLERK_EMAIL: &str = "clerk@example.com";
pub const CLERK_PASSWORD: &str = "clerk123";

#[derive(Default)]
pub struct MockState {
    /// Issued token -> user JSON.
    sessions: Mutex<HashMap<String, Value>>,
    issued: AtomicUsize,
    /// `Authorization` header of every non-login request, in order.
    pub seen_auth: Mutex<Vec<Option<String>>>,
    /// Reject every authenticated request with 401.
    pub reject_all: AtomicBool,
    pub stats_fail: AtomicBool,
    /// Answer `/inventory` with an object instead of an array.
    pub inventory_as_object: AtomicBool,
}

impl MockState {
    pub fn seen_auth(&self) -> Vec<Option<String>> {
        self.seen_auth.lock().unwrap().clone()
    }

    /// Forget every issued token, as a server restart with new keys would.
    pub fn revoke_all(&self) {
        self.sessions.lock().unwrap().clear();
    }
}

pub struct MockApi {
    pub base_url: String,
    pub state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockApi {
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/change-password", post(change_password))
            .route("/dashboard/stats", get(stats))
            .route("/users", get(users))
            .route("/products", get(products).post(create_product))
            .route("/inventory", get(inventory))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).unwrap()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn memory_storage() -> Arc<dyn SessionStorage> {
    Arc::new(MemoryStorage::new())
}

fn user_json(id: &str, email: &str, first: &str, last: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "firstName": first,
        "lastName": last,
        "role": role,
        "isActive": true,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z",
    })
}

fn known_users() -> Vec<(&'static str, &'static str, Value)> {
    vec![
        (
            ADMIN_EMAIL,
            ADMIN_PASSWORD,
            user_json("u-admin", ADMIN_EMAIL, "Ada", "Admin", "ADMIN"),
        ),
        (
            CLERK_EMAIL,
            CLERK_PASSWORD,
            user_json("u-clerk", CLERK_EMAIL, "Carl", "Clerk", "SECONDARY_INVENTOR"),
        ),
    ]
}

fn message(status: StatusCode, message: impl Into<Value>) -> Response {
    (
        status,
        Json(json!({ "statusCode": status.as_u16(), "message": message.into() })),
    )
        .into_response()
}

/// Record the header and check the bearer token against issued sessions.
fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), Response> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen_auth.lock().unwrap().push(auth.clone());

    if state.reject_all.load(Ordering::SeqCst) {
        return Err(message(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }
    let token = auth.as_deref().and_then(|a| a.strip_prefix("Bearer "));
    match token {
        Some(token) if state.sessions.lock().unwrap().contains_key(token) => Ok(()),
        _ => Err(message(StatusCode::UNAUTHORIZED, "Unauthorized")),
    }
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let Some((_, _, user)) = known_users()
        .into_iter()
        .find(|(e, p, _)| *e == email && *p == password)
    else {
        return message(StatusCode::UNAUTHORIZED, "Invalid credentials");
    };

    let n = state.issued.fetch_add(1, Ordering::SeqCst);
    let token = format!("token-{n}");
    state
        .sessions
        .lock()
        .unwrap()
        .insert(token.clone(), user.clone());

    Json(json!({ "user": user, "accessToken": token })).into_response()
}

async fn change_password(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    StatusCode::CREATED.into_response()
}

async fn stats(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    if state.stats_fail.load(Ordering::SeqCst) {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }
    Json(json!({
        "totalOrders": 12,
        "totalRevenue": 1530.5,
        "lowStockItems": 2,
        "pendingReturns": 1,
        "recentOrders": [],
        "salesTrend": [{ "date": "2024-01-01", "amount": 120.0 }],
    }))
    .into_response()
}

async fn users(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    let users: Vec<Value> = known_users().into_iter().map(|(_, _, u)| u).collect();
    Json(users).into_response()
}

async fn products(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    Json(json!({
        "data": [{
            "id": "p-1",
            "name": "Widget",
            "description": "A widget",
            "price": 9.99,
            "category": "tools",
            "brand": "Acme",
            "images": [],
            "isActive": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
        }],
        "total": 1,
    }))
    .into_response()
}

async fn create_product(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    message(
        StatusCode::BAD_REQUEST,
        json!(["category should not be empty", "brand should not be empty"]),
    )
}

async fn inventory(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&state, &headers) {
        return resp;
    }
    if state.inventory_as_object.load(Ordering::SeqCst) {
        return Json(json!({ "items": [] })).into_response();
    }
    Json(json!([{
        "id": "inv-1",
        "productId": "p-1",
        "quantity": 3,
        "minThreshold": 5,
        "lastUpdated": "2024-01-01T00:00:00Z",
    }]))
    .into_response()
}
