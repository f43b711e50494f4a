//! In-process mock of the catalog backend for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{Value, json};

use jewelbox_auth::{ManualClock, MemoryTokenStore};
use jewelbox_client::JewelboxClient;
use jewelbox_client::api::SignInRequest;
use jewelbox_client::http::HttpTransport;
use jewelbox_core::config::{ApiConfig, SessionConfig};

pub const EMAIL: &str = "ana@example.com";
pub const PASSWORD: &str = "secret-pass";
pub const USER_ID: &str = "u-1";

/// How `POST /auth/refresh` behaves.
#[derive(Debug, Clone, Copy)]
pub enum RefreshMode {
    /// Rotate the pair.
    Issue,
    /// Wait, then rotate the pair.
    Slow(Duration),
    /// Answer with this status and no tokens.
    Fail(u16),
}

#[derive(Debug)]
struct BackendState {
    issued: u32,
    expires_in: u64,
    valid_access: HashSet<String>,
    valid_refresh: HashSet<String>,
    refresh_mode: RefreshMode,
    reject_all_protected: bool,
    refresh_calls: usize,
    protected_calls: usize,
    bearers: Vec<String>,
    credential_auth_headers: Vec<Option<String>>,
    last_query: Option<String>,
}

/// Shared, inspectable backend state.
#[derive(Debug, Clone)]
pub struct Backend {
    state: Arc<Mutex<BackendState>>,
}

impl Backend {
    fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                issued: 0,
                expires_in: 900,
                valid_access: HashSet::new(),
                valid_refresh: HashSet::new(),
                refresh_mode: RefreshMode::Issue,
                reject_all_protected: false,
                refresh_calls: 0,
                protected_calls: 0,
                bearers: Vec::new(),
                credential_auth_headers: Vec::new(),
                last_query: None,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Issue `A{n}`/`R{n}`, invalidating earlier access tokens.
    fn issue(&self) -> Value {
        let mut state = self.lock();
        state.issued += 1;
        let access = format!("A{}", state.issued);
        let refresh = format!("R{}", state.issued);
        state.valid_access.clear();
        state.valid_access.insert(access.clone());
        state.valid_refresh.insert(refresh.clone());
        json!({
            "accessToken": access,
            "refreshToken": refresh,
            "expiresIn": state.expires_in,
            "userId": USER_ID,
        })
    }

    fn record_credential_call(&self, headers: &HeaderMap) {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.lock().credential_auth_headers.push(auth);
    }

    /// Check the bearer on a protected route.
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let mut state = self.lock();
        state.protected_calls += 1;

        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);

        let Some(bearer) = bearer else {
            return Err(unauthorized());
        };
        state.bearers.push(bearer.clone());

        if state.reject_all_protected || !state.valid_access.contains(&bearer) {
            return Err(unauthorized());
        }
        Ok(())
    }

    pub fn set_refresh_mode(&self, mode: RefreshMode) {
        self.lock().refresh_mode = mode;
    }

    pub fn reject_all_protected(&self) {
        self.lock().reject_all_protected = true;
    }

    /// Server-side revocation of every outstanding access token.
    pub fn revoke_access_tokens(&self) {
        self.lock().valid_access.clear();
    }

    pub fn refresh_calls(&self) -> usize {
        self.lock().refresh_calls
    }

    pub fn protected_calls(&self) -> usize {
        self.lock().protected_calls
    }

    pub fn bearers(&self) -> Vec<String> {
        self.lock().bearers.clone()
    }

    pub fn credential_auth_headers(&self) -> Vec<Option<String>> {
        self.lock().credential_auth_headers.clone()
    }

    pub fn last_query(&self) -> Option<String> {
        self.lock().last_query.clone()
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Token expired" })),
    )
        .into_response()
}

fn product(id: &str) -> Option<Value> {
    let (name, category, price, stock) = match id {
        "p-1" => ("Solitaire Ring", "c-rings", 1299.0, 3),
        "p-2" => ("Pearl Necklace", "c-necklaces", 450.5, 10),
        "p-3" => ("Hoop Earrings", "c-earrings", 89.99, 0),
        _ => return None,
    };
    Some(json!({
        "id": id,
        "name": name,
        "description": format!("{name}, handmade"),
        "price": price,
        "categoryId": category,
        "stock": stock,
    }))
}

fn user(id: &str, role: &str) -> Value {
    let email = if id == USER_ID {
        EMAIL.to_string()
    } else {
        format!("{id}@example.com")
    };
    json!({
        "id": id,
        "email": email,
        "phone": null,
        "role": role,
        "createdAt": "2026-01-15T09:30:00Z",
    })
}

async fn sign_in(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record_credential_call(&headers);
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        Json(backend.issue()).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid email or password" })),
        )
            .into_response()
    }
}

async fn sign_up(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record_credential_call(&headers);
    if body["email"] == EMAIL {
        return (StatusCode::CONFLICT, "Email already registered").into_response();
    }
    Json(backend.issue()).into_response()
}

async fn refresh(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record_credential_call(&headers);
    let mode = {
        let mut state = backend.lock();
        state.refresh_calls += 1;
        state.refresh_mode
    };

    match mode {
        RefreshMode::Fail(status) => {
            let status = StatusCode::from_u16(status).unwrap();
            return (status, Json(json!({ "error": "refresh unavailable" }))).into_response();
        }
        RefreshMode::Slow(delay) => tokio::time::sleep(delay).await,
        RefreshMode::Issue => {}
    }

    let presented = body["refreshToken"].as_str().unwrap_or_default().to_string();
    // Refresh tokens are single use.
    if !backend.lock().valid_refresh.remove(&presented) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Refresh token invalid" })),
        )
            .into_response();
    }
    Json(backend.issue()).into_response()
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    Json(user(USER_ID, "ADMIN")).into_response()
}

async fn change_password(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    if body["oldPassword"] != PASSWORD {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Current password is incorrect" })),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn change_phone(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn categories(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    Json(json!([
        { "id": "c-rings", "name": "Rings" },
        { "id": "c-necklaces", "name": "Necklaces", "imageUrl": "/img/necklaces.png" },
        { "id": "c-earrings", "name": "Earrings" },
    ]))
    .into_response()
}

async fn products(
    State(backend): State<Backend>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    backend.lock().last_query = query.clone();

    let category = query
        .as_deref()
        .and_then(|q| q.strip_prefix("categoryId="))
        .map(str::to_string);
    let items: Vec<Value> = ["p-1", "p-2", "p-3"]
        .into_iter()
        .filter_map(product)
        .filter(|p| category.as_deref().is_none_or(|c| p["categoryId"] == c))
        .collect();
    Json(items).into_response()
}

async fn product_by_id(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    match product(&id) {
        Some(p) => Json(p).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Product not found" })),
        )
            .into_response(),
    }
}

async fn create_order(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    let product_id = body["productId"].as_str().unwrap_or_default();
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    let Some(item) = product(product_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Product not found" })),
        )
            .into_response();
    };
    if quantity > item["stock"].as_u64().unwrap_or_default() {
        return (StatusCode::CONFLICT, "Out of stock").into_response();
    }
    let total = item["price"].as_f64().unwrap_or_default() * quantity as f64;
    Json(json!({
        "id": "o-100",
        "productId": product_id,
        "userId": USER_ID,
        "quantity": quantity,
        "totalPrice": total,
        "status": "PENDING",
        "createdAt": "2026-03-01T10:00:00Z",
    }))
    .into_response()
}

async fn search_orders(
    State(backend): State<Backend>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    backend.lock().last_query = query;
    Json(json!({
        "items": [{
            "id": "o-7",
            "productId": "p-1",
            "quantity": 1,
            "totalPrice": 1299.0,
            "status": "SHIPPED",
            "createdAt": "2026-02-10T08:00:00Z",
        }],
        "page": 2,
        "pageSize": 5,
        "totalItems": 6,
    }))
    .into_response()
}

async fn update_order_status(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    Json(json!({
        "id": id,
        "productId": "p-1",
        "quantity": 1,
        "totalPrice": 1299.0,
        "status": body["status"],
        "createdAt": "2026-02-10T08:00:00Z",
    }))
    .into_response()
}

async fn list_users(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    Json(json!([user(USER_ID, "ADMIN"), user("u-2", "USER")])).into_response()
}

async fn update_role(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = backend.authorize(&headers) {
        return r;
    }
    if id == USER_ID {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Cannot change your own role" })),
        )
            .into_response();
    }
    Json(user(&id, body["role"].as_str().unwrap_or("USER"))).into_response()
}

/// A running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub backend: Backend,
}

impl MockBackend {
    /// Start the mock on an ephemeral port.
    pub async fn start() -> Self {
        let backend = Backend::new();

        let api = Router::new()
            .route("/auth/signin", post(sign_in))
            .route("/auth/signup", post(sign_up))
            .route("/auth/refresh", post(refresh))
            .route("/auth/me", get(me))
            .route("/auth/password", put(change_password))
            .route("/auth/phone", put(change_phone))
            .route("/categories", get(categories))
            .route("/products", get(products))
            .route("/products/{id}", get(product_by_id))
            .route("/orders", post(create_order).get(search_orders))
            .route("/orders/{id}/status", put(update_order_status))
            .route("/users", get(list_users))
            .route("/users/{id}/role", put(update_role));

        let app = Router::new()
            .nest("/api", api)
            .with_state(backend.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("No local address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock backend failed");
        });

        Self { addr, backend }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

/// Client wiring used by the tests.
pub struct TestClient {
    pub client: JewelboxClient,
    pub store: Arc<MemoryTokenStore>,
    pub clock: Arc<ManualClock>,
}

impl TestClient {
    /// Client against `base_url` with a frozen clock and an empty store.
    pub fn new(base_url: &str) -> Self {
        Self::with_store(base_url, MemoryTokenStore::new(), 15)
    }

    pub fn with_store(base_url: &str, store: MemoryTokenStore, timeout_seconds: u64) -> Self {
        let api = ApiConfig {
            base_url: base_url.to_string(),
            request_timeout_seconds: timeout_seconds,
            connect_timeout_seconds: 1,
            ..ApiConfig::default()
        };
        let http = HttpTransport::new(&api).expect("Failed to build transport");
        let store = Arc::new(store);
        let clock = Arc::new(ManualClock::new(t0()));

        let client = JewelboxClient::new(
            http,
            store.clone(),
            &SessionConfig::default(),
            clock.clone(),
        );

        Self {
            client,
            store,
            clock,
        }
    }

    /// Sign in with the seeded account.
    pub async fn sign_in(&self) {
        self.client
            .sign_in(&SignInRequest {
                email: EMAIL.to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("Sign-in failed");
    }

    /// Move the clock forward.
    pub fn advance(&self, seconds: i64) {
        self.clock.advance(chrono::Duration::seconds(seconds));
    }

    /// Access token currently held by the persistence adapter.
    pub fn stored_access_token(&self) -> Option<String> {
        self.store.snapshot().map(|p| p.access_token)
    }
}

/// Fixed start time for every test clock.
pub fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}
