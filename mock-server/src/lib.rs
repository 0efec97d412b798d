//! In-memory JSON API used to exercise the network core over real HTTP.
//!
//! Routes:
//! - `GET /users/{id}`, `POST /users`: small user store; reads carry an
//!   extra field clients are expected to ignore.
//! - `GET|POST /echo`: reflects the query pairs, headers and body it saw.
//! - `GET /slow/{ms}`: sleeps before answering.
//! - `GET /status/{code}`: answers with an arbitrary status.
//! - `GET /text`, `GET /empty`: non-JSON and empty bodies.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateUser {
    pub name: String,
}

/// What `/echo` saw on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub query: Vec<(String, String)>,
    /// Lower-cased header name to every value received, in arrival order.
    pub headers: BTreeMap<String, Vec<String>>,
    pub body: Option<Value>,
}

pub struct Store {
    users: RwLock<HashMap<u64, User>>,
    next_id: AtomicU64,
}

pub type Db = Arc<Store>;

pub fn app() -> Router {
    let db: Db = Arc::new(Store {
        users: RwLock::new(HashMap::from([(
            1,
            User {
                id: 1,
                name: "Ann".to_string(),
            },
        )])),
        next_id: AtomicU64::new(2),
    });
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .route("/echo", get(echo).post(echo))
        .route("/slow/{ms}", get(slow))
        .route("/status/{code}", get(status))
        .route("/text", get(|| async { "this is not json" }))
        .route("/empty", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Value>, StatusCode> {
    let users = db.users.read().await;
    let user = users.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "id": user.id, "name": user.name, "extra": "ignored" })))
}

async fn create_user(State(db): State<Db>, Json(input): Json<CreateUser>) -> (StatusCode, Json<User>) {
    let user = User {
        id: db.next_id.fetch_add(1, Ordering::Relaxed),
        name: input.name,
    };
    db.users.write().await.insert(user.id, user.clone());
    tracing::debug!(id = user.id, "created user");
    (StatusCode::CREATED, Json(user))
}

async fn echo(
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Echo>, (StatusCode, String)> {
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_str(&body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?)
    };
    let mut seen: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in &headers {
        seen.entry(name.as_str().to_string())
            .or_default()
            .push(value.to_str().unwrap_or_default().to_string());
    }
    Ok(Json(Echo {
        method: method.to_string(),
        query,
        headers: seen,
        body,
    }))
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "slept_ms": ms }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, Json(json!({ "error": format!("status {code}") }))))
}
