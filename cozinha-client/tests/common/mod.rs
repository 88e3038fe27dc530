// cozinha-client/tests/common/mod.rs
// In-process mock of the CozinhaApp backend

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use serde_json::{Value, json};

use cozinha_client::{
    CartConfig, ClientConfig, CozinhaClient, OneshotHttpClient, SessionStorage, SyncConfig,
};

pub const ADMIN_EMAIL: &str = "admin@cozinhaapp.com";
pub const ADMIN_PASSWORD: &str = "Admin123!@#";
pub const ADMIN_ID: &str = "1";

/// Access token in JWT shape whose payload carries `sub`
pub fn make_token(sub: &str, seq: u64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(json!({ "sub": sub, "jti": seq }).to_string());
    format!("{}.{}.mock-signature", header, payload)
}

#[derive(Debug, Clone)]
struct Line {
    id: i64,
    dish_id: i64,
    quantity: u32,
    observations: Option<String>,
}

#[derive(Debug, Default)]
struct BackendState {
    seq: u64,
    access_tokens: HashSet<String>,
    refresh_tokens: HashSet<String>,
    refresh_disabled: bool,
    refresh_delay: Option<Duration>,
    logout_fails: bool,
    opaque_tokens: bool,
    order_rejection: Option<String>,
    add_delay: Option<Duration>,
    lines: Vec<Line>,
    next_line_id: i64,
    orders: Vec<Value>,
    last_order_request: Option<Value>,
    hits: BTreeMap<String, usize>,
    total_hits: usize,
}

/// Shared handle to the mock's state
#[derive(Debug, Clone, Default)]
pub struct Backend {
    state: Arc<Mutex<BackendState>>,
}

fn dishes() -> Vec<Value> {
    vec![
        json!({"id": 1, "nome": "Feijoada", "descricao": "Completa", "preco": 45.9, "categoriaId": 1, "disponivel": true}),
        json!({"id": 2, "nome": "Moqueca", "preco": 59.9, "categoriaId": 1, "disponivel": true}),
        json!({"id": 3, "nome": "Pudim", "preco": 12.5, "categoriaId": 2, "disponivel": true}),
        json!({"id": 4, "nome": "Bolo de rolo", "preco": 15.0, "categoriaId": 2, "disponivel": false}),
    ]
}

fn categories() -> Vec<Value> {
    vec![
        json!({"id": 1, "nome": "Pratos principais", "ativo": true}),
        json!({"id": 2, "nome": "Sobremesas", "ativo": true}),
    ]
}

fn admin_user() -> Value {
    json!({
        "id": ADMIN_ID,
        "nomeCompleto": "Administrador",
        "email": ADMIN_EMAIL,
        "role": "Admin",
        "dataCriacao": "2024-01-01T00:00:00Z"
    })
}

fn dish(id: i64) -> Option<Value> {
    dishes().into_iter().find(|d| d["id"] == id)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

impl Backend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/logout", post(logout))
            .route("/api/auth/refresh-token", post(refresh))
            .route("/api/auth/change-password", post(change_password))
            .route("/api/auth/me", get(me))
            .route("/api/carrinho", get(get_cart).delete(clear_cart))
            .route("/api/carrinho/itens", post(add_line))
            .route("/api/carrinho/itens/{id}", put(update_line).delete(remove_line))
            .route("/api/pedidos", post(create_order))
            .route("/api/pedidos/meus-pedidos", get(my_orders))
            .route("/api/pedidos/{id}", get(get_order))
            .route("/api/pedidos/{id}/cancelar", put(cancel_order))
            .route("/api/categorias", get(list_categories))
            .route("/api/pratos", get(list_dishes))
            .route("/api/pratos/{id}", get(get_dish))
            .route("/api/search", get(search))
            .layer(middleware::from_fn_with_state(self.clone(), count_hits))
            .with_state(self.clone())
    }

    /// Client wired to this backend, with throttling turned off
    pub fn client(&self) -> CozinhaClient<OneshotHttpClient> {
        self.client_with(SessionStorage::in_memory(), fast_cart_config())
    }

    pub fn client_with(
        &self,
        storage: SessionStorage,
        cart: CartConfig,
    ) -> CozinhaClient<OneshotHttpClient> {
        let config = ClientConfig::new("http://mock")
            .with_cart_config(cart)
            .with_sync_config(SyncConfig::default());
        CozinhaClient::with_transport(OneshotHttpClient::new(self.router()), storage, config)
    }

    /// Requests received for `"METHOD /path"`
    pub fn hits(&self, route: &str) -> usize {
        self.lock().hits.get(route).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.lock().total_hits
    }

    /// Invalidates every access token, as if they all expired
    pub fn expire_access_tokens(&self) {
        self.lock().access_tokens.clear();
    }

    pub fn disable_refresh(&self) {
        self.lock().refresh_disabled = true;
    }

    /// Holds every refresh exchange for `delay` before answering
    pub fn delay_refresh(&self, delay: Duration) {
        self.lock().refresh_delay = Some(delay);
    }

    /// Logout answers 500 from now on
    pub fn fail_logout(&self) {
        self.lock().logout_fails = true;
    }

    /// Issue tokens that are not JWTs from now on
    pub fn issue_opaque_tokens(&self) {
        self.lock().opaque_tokens = true;
    }

    pub fn reject_orders(&self, message: &str) {
        self.lock().order_rejection = Some(message.to_string());
    }

    pub fn delay_add_item(&self, delay: Duration) {
        self.lock().add_delay = Some(delay);
    }

    /// Issues a session without going through the client
    pub fn issue_session(&self) -> (String, String) {
        self.lock().issue()
    }

    pub fn cart_quantities(&self) -> Vec<(i64, u32)> {
        self.lock()
            .lines
            .iter()
            .map(|l| (l.dish_id, l.quantity))
            .collect()
    }

    pub fn put_in_cart(&self, dish_id: i64, quantity: u32) {
        self.lock().add(dish_id, quantity, None);
    }

    pub fn last_order_request(&self) -> Option<Value> {
        self.lock().last_order_request.clone()
    }

    pub fn set_order_status(&self, id: i64, status: &str) {
        let mut state = self.lock();
        if let Some(order) = state.orders.iter_mut().find(|o| o["id"] == id) {
            order["status"] = json!(status);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }
}

impl BackendState {
    fn issue(&mut self) -> (String, String) {
        self.seq += 1;
        let token = if self.opaque_tokens {
            format!("opaque-{}", self.seq)
        } else {
            make_token(ADMIN_ID, self.seq)
        };
        let refresh = format!("refresh-{}", self.seq);
        self.access_tokens.insert(token.clone());
        self.refresh_tokens.insert(refresh.clone());
        (token, refresh)
    }

    fn auth_response(&mut self) -> Value {
        let (token, refresh) = self.issue();
        json!({ "token": token, "refreshToken": refresh, "user": admin_user() })
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| self.access_tokens.contains(token))
    }

    fn add(&mut self, dish_id: i64, quantity: u32, observations: Option<String>) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.dish_id == dish_id) {
            line.quantity += quantity;
            return;
        }
        self.next_line_id += 1;
        self.lines.push(Line {
            id: 100 + self.next_line_id,
            dish_id,
            quantity,
            observations,
        });
    }

    fn cart_json(&self) -> Value {
        let items: Vec<Value> = self
            .lines
            .iter()
            .map(|l| {
                let dish = dish(l.dish_id).unwrap_or_default();
                json!({
                    "id": l.id,
                    "pratoId": l.dish_id,
                    "nomePrato": dish["nome"],
                    "precoUnitario": dish["preco"],
                    "quantidade": l.quantity,
                    "observacoes": l.observations,
                })
            })
            .collect();
        // Totals the client is expected to ignore
        json!({ "id": 1, "itens": items, "valorTotal": -1, "quantidadeTotal": -1 })
    }
}

async fn count_hits(State(backend): State<Backend>, request: Request, next: Next) -> Response {
    {
        let mut state = backend.lock();
        let key = format!("{} {}", request.method(), request.uri().path());
        *state.hits.entry(key).or_default() += 1;
        state.total_hits += 1;
    }
    next.run(request).await
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(backend): State<Backend>, Json(body): Json<Credentials>) -> Response {
    let mut state = backend.lock();
    if body.email == ADMIN_EMAIL && body.password == ADMIN_PASSWORD {
        Json(state.auth_response()).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "E-mail ou senha incorretos")
    }
}

async fn register(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let mut state = backend.lock();
    if body["email"] == ADMIN_EMAIL {
        return error(StatusCode::BAD_REQUEST, "E-mail já cadastrado");
    }
    let (token, refresh) = state.issue();
    Json(json!({
        "token": token,
        "refreshToken": refresh,
        "user": { "id": "2", "nomeCompleto": body["nomeCompleto"], "email": body["email"], "role": "Usuario" }
    }))
    .into_response()
}

async fn logout(State(backend): State<Backend>, Json(body): Json<Value>) -> StatusCode {
    let mut state = backend.lock();
    if state.logout_fails {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    if let Some(refresh) = body["refreshToken"].as_str() {
        state.refresh_tokens.remove(refresh);
    }
    StatusCode::OK
}

async fn refresh(State(backend): State<Backend>, Json(body): Json<Value>) -> Response {
    let delay = backend.lock().refresh_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = backend.lock();
    let presented = body["refreshToken"].as_str().unwrap_or_default().to_string();
    if state.refresh_disabled || !state.refresh_tokens.remove(&presented) {
        return error(StatusCode::UNAUTHORIZED, "Refresh token inválido");
    }
    Json(state.auth_response()).into_response()
}

async fn change_password(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body["currentPassword"] != ADMIN_PASSWORD {
        return error(StatusCode::BAD_REQUEST, "Senha atual incorreta");
    }
    Json(json!({ "message": "Senha alterada" })).into_response()
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(admin_user()).into_response()
}

async fn get_cart(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.cart_json()).into_response()
}

async fn clear_cart(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let mut state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.lines.clear();
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct AddLine {
    #[serde(rename = "pratoId")]
    dish_id: i64,
    #[serde(rename = "quantidade")]
    quantity: u32,
    #[serde(rename = "observacoes", default)]
    observations: Option<String>,
}

async fn add_line(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<AddLine>,
) -> Response {
    let delay = {
        let state = backend.lock();
        if !state.authorized(&headers) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        state.add_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if dish(body.dish_id).is_none() {
        return error(StatusCode::NOT_FOUND, "Prato não encontrado");
    }
    let mut state = backend.lock();
    state.add(body.dish_id, body.quantity, body.observations);
    Json(state.cart_json()).into_response()
}

async fn update_line(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let quantity = body["quantidade"].as_u64().unwrap_or_default() as u32;
    match state.lines.iter_mut().find(|l| l.id == id) {
        Some(line) => {
            line.quantity = quantity;
            Json(state.cart_json()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Item não encontrado"),
    }
}

async fn remove_line(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let before = state.lines.len();
    state.lines.retain(|l| l.id != id);
    if state.lines.len() == before {
        return error(StatusCode::NOT_FOUND, "Item não encontrado");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_order(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if let Some(message) = &state.order_rejection {
        return error(StatusCode::UNPROCESSABLE_ENTITY, message);
    }
    let Some(requested) = body["itens"].as_array().filter(|items| !items.is_empty()) else {
        return error(StatusCode::BAD_REQUEST, "Pedido sem itens");
    };

    let mut total = 0.0;
    let mut items = Vec::new();
    for item in requested {
        let Some(dish) = item["pratoId"].as_i64().and_then(dish) else {
            return error(StatusCode::BAD_REQUEST, "Prato inválido");
        };
        let quantity = item["quantidade"].as_u64().unwrap_or_default();
        total += dish["preco"].as_f64().unwrap_or_default() * quantity as f64;
        items.push(json!({
            "pratoId": dish["id"],
            "nomePrato": dish["nome"],
            "quantidade": quantity,
            "precoUnitario": dish["preco"],
        }));
    }

    let id = state.orders.len() as i64 + 1;
    let order = json!({
        "id": id,
        "numeroPedido": format!("PED{:05}", id),
        "itens": items,
        "valorTotal": (total * 100.0).round() / 100.0,
        "status": "Pendente",
        "enderecoEntrega": body["enderecoEntrega"],
        "formaPagamento": body["formaPagamento"],
        "observacoes": body["observacoes"],
        "dataPedido": "2024-05-01T12:00:00Z",
    });
    state.orders.push(order.clone());
    state.last_order_request = Some(body);
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn my_orders(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    let state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(state.orders.clone()).into_response()
}

async fn get_order(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.orders.iter().find(|o| o["id"] == id) {
        Some(order) => Json(order.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Pedido não encontrado"),
    }
}

async fn cancel_order(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let mut state = backend.lock();
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.orders.iter_mut().find(|o| o["id"] == id) {
        Some(order) => {
            order["status"] = json!("Cancelado");
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Pedido não encontrado"),
    }
}

async fn list_categories() -> Json<Vec<Value>> {
    Json(categories())
}

#[derive(Deserialize)]
struct DishFilter {
    #[serde(rename = "categoriaId")]
    category_id: Option<i64>,
}

async fn list_dishes(Query(filter): Query<DishFilter>) -> Json<Vec<Value>> {
    let dishes = dishes()
        .into_iter()
        .filter(|d| filter.category_id.is_none_or(|id| d["categoriaId"] == id))
        .collect();
    Json(dishes)
}

async fn get_dish(Path(id): Path<i64>) -> Response {
    match dish(id) {
        Some(dish) => Json(dish).into_response(),
        None => error(StatusCode::NOT_FOUND, "Prato não encontrado"),
    }
}

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

async fn search(Query(query): Query<SearchQuery>) -> Json<Value> {
    let term = query.q.to_lowercase();
    let matches = |v: &Value| {
        v["nome"]
            .as_str()
            .is_some_and(|name| name.to_lowercase().contains(&term))
    };
    Json(json!({
        "pratos": dishes().into_iter().filter(|d| matches(d)).collect::<Vec<_>>(),
        "categorias": categories().into_iter().filter(|c| matches(c)).collect::<Vec<_>>(),
    }))
}

/// Cart config with no batching or fetch spacing
pub fn fast_cart_config() -> CartConfig {
    CartConfig {
        batch_delay: Duration::ZERO,
        min_fetch_interval: Duration::ZERO,
        ..CartConfig::default()
    }
}
