//! Fake grid server
//!
//! An in-process HTTP server speaking the grid REST dialect the connector
//! relies on:
//! - `POST/GET/DELETE {GRID_PATH}/{map}/{key}` with `?ttl=` seconds
//! - `DELETE {GRID_PATH}/{map}` to drop a whole map
//! - `GET {QUERY_PATH}/{map}/?query={regex}` returning at most `page_size` keys
//! - 404 answers carrying `CWOBJ9752E` in a JSON body labelled as Atom XML
//! - a `JSESSIONID` cookie handed out to clients without one
//!
//! Every request is recorded, and failures can be queued per HTTP method.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use gridkv::{Config, GridConnector, KeyLayout, PackerKind};
use parking_lot::Mutex;
use regex::Regex;
use serde::Deserialize;

pub const GRID_PATH: &str = "/wxsdata/v1/grids/testgrid";
pub const QUERY_PATH: &str = "/wxsdata/v1/query/testgrid";
pub const SESSION_COOKIE: &str = "JSESSIONID";
pub const DEFAULT_PAGE_SIZE: usize = 500;

// =============================================================================
// Recorded State
// =============================================================================

/// A value held by the fake grid
#[derive(Debug, Clone)]
pub struct StoredValue {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    pub ttl_secs: Option<f64>,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_live(&self) -> bool {
        self.expires_at.map_or(true, |at| Instant::now() < at)
    }
}

/// A request as seen by the fake grid
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub has_session: bool,
}

#[derive(Debug)]
struct InjectedFailure {
    method: Option<Method>,
    status: StatusCode,
    body: String,
}

struct GridState {
    maps: Mutex<HashMap<String, BTreeMap<String, StoredValue>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    failures: Mutex<VecDeque<InjectedFailure>>,
    page_size: usize,
}

// =============================================================================
// Server Handle
// =============================================================================

pub struct FakeGrid {
    addr: SocketAddr,
    state: Arc<GridState>,
}

impl FakeGrid {
    pub async fn start() -> Self {
        Self::start_with_page_size(DEFAULT_PAGE_SIZE).await
    }

    pub async fn start_with_page_size(page_size: usize) -> Self {
        let state = Arc::new(GridState {
            maps: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
            page_size,
        });

        let app = Router::new()
            .route(&format!("{}/:map", GRID_PATH), delete(delete_map))
            .route(
                &format!("{}/:map/:key", GRID_PATH),
                get(get_value).post(put_value).delete(delete_value),
            )
            .route(&format!("{}/:map/", QUERY_PATH), get(query_map))
            .layer(middleware::from_fn_with_state(state.clone(), record_and_inject))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, GRID_PATH)
    }

    pub fn config(&self, packer: PackerKind) -> Config {
        Config::builder()
            .base_url(self.base_url())
            .packer(packer)
            .build()
    }

    pub fn connector(&self) -> GridConnector {
        self.connector_with(PackerKind::Json)
    }

    pub fn connector_with(&self, packer: PackerKind) -> GridConnector {
        GridConnector::new(self.config(packer)).unwrap()
    }

    pub fn flat_connector(&self, map: &str) -> GridConnector {
        let config = Config::builder()
            .base_url(self.base_url())
            .key_layout(KeyLayout::Flat {
                map: map.to_string(),
            })
            .build();
        GridConnector::new(config).unwrap()
    }

    /// Value stored under `key` in `map`, ignoring expiry
    pub fn stored(&self, map: &str, key: &str) -> Option<StoredValue> {
        self.state
            .maps
            .lock()
            .get(map)
            .and_then(|entries| entries.get(key))
            .cloned()
    }

    /// Keys of `map` in sorted order
    pub fn keys(&self, map: &str) -> Vec<String> {
        self.state
            .maps
            .lock()
            .get(map)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Store a value directly, bypassing the connector
    pub fn insert(&self, map: &str, key: &str, body: &[u8]) {
        self.state.maps.lock().entry(map.to_string()).or_default().insert(
            key.to_string(),
            StoredValue {
                body: body.to_vec(),
                content_type: Some("application/json".to_string()),
                ttl_secs: None,
                expires_at: None,
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().clear();
    }

    /// Answer the next request (of any method) with `status` and `body`
    pub fn fail_next(&self, status: u16, body: &str) {
        self.push_failure(None, status, body);
    }

    /// Answer the next request with `method` with `status` and `body`
    pub fn fail_next_method(&self, method: Method, status: u16, body: &str) {
        self.push_failure(Some(method), status, body);
    }

    fn push_failure(&self, method: Option<Method>, status: u16, body: &str) {
        self.state.failures.lock().push_back(InjectedFailure {
            method,
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        });
    }
}

// =============================================================================
// Middleware
// =============================================================================

async fn record_and_inject(
    State(grid): State<Arc<GridState>>,
    request: Request,
    next: Next,
) -> Response {
    let has_session = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |cookies| cookies.contains(SESSION_COOKIE));

    grid.requests.lock().push(RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        has_session,
    });

    let injected = {
        let mut failures = grid.failures.lock();
        let position = failures
            .iter()
            .position(|f| f.method.as_ref().map_or(true, |m| m == request.method()));
        position.and_then(|i| failures.remove(i))
    };

    let mut response = match injected {
        Some(failure) => (
            failure.status,
            [(header::CONTENT_TYPE, "application/atom+xml")],
            failure.body,
        )
            .into_response(),
        None => next.run(request).await,
    };

    if !has_session {
        response.headers_mut().insert(
            header::SET_COOKIE,
            HeaderValue::from_static("JSESSIONID=fake-session; Path=/"),
        );
    }
    response
}

// =============================================================================
// Handlers
// =============================================================================

fn object_not_found(map: &str, key: &str) -> Response {
    let body = serde_json::json!({
        "error": format!(
            "CWOBJ9752E: The requested object with key {} was not found in map {}.",
            key, map
        )
    });
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "application/atom+xml")],
        body.to_string(),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct PutParams {
    ttl: Option<f64>,
}

async fn put_value(
    State(grid): State<Arc<GridState>>,
    Path((map, key)): Path<(String, String)>,
    Query(params): Query<PutParams>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expires_at = params
        .ttl
        .map(|secs| Instant::now() + Duration::from_secs_f64(secs));

    grid.maps.lock().entry(map).or_default().insert(
        key,
        StoredValue {
            body: body.to_vec(),
            content_type,
            ttl_secs: params.ttl,
            expires_at,
        },
    );
    StatusCode::OK
}

async fn get_value(
    State(grid): State<Arc<GridState>>,
    Path((map, key)): Path<(String, String)>,
) -> Response {
    let stored = grid
        .maps
        .lock()
        .get(&map)
        .and_then(|entries| entries.get(&key))
        .filter(|value| value.is_live())
        .cloned();

    match stored {
        Some(value) => {
            let content_type = value
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type)],
                value.body,
            )
                .into_response()
        }
        None => object_not_found(&map, &key),
    }
}

async fn delete_value(
    State(grid): State<Arc<GridState>>,
    Path((map, key)): Path<(String, String)>,
) -> Response {
    let removed = grid
        .maps
        .lock()
        .get_mut(&map)
        .and_then(|entries| entries.remove(&key));

    match removed {
        Some(_) => StatusCode::OK.into_response(),
        None => object_not_found(&map, &key),
    }
}

async fn delete_map(State(grid): State<Arc<GridState>>, Path(map): Path<String>) -> StatusCode {
    grid.maps.lock().remove(&map);
    StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct QueryParams {
    query: String,
}

async fn query_map(
    State(grid): State<Arc<GridState>>,
    Path(map): Path<String>,
    Query(params): Query<QueryParams>,
) -> Response {
    let pattern = match Regex::new(&format!("^(?:{})$", params.query)) {
        Ok(pattern) => pattern,
        Err(e) => {
            let body = serde_json::json!({ "error": format!("bad query: {}", e) });
            return (StatusCode::BAD_REQUEST, body.to_string()).into_response();
        }
    };

    let items: Vec<serde_json::Value> = grid
        .maps
        .lock()
        .get(&map)
        .map(|entries| {
            entries
                .iter()
                .filter(|(key, value)| value.is_live() && pattern.is_match(key))
                .take(grid.page_size)
                .map(|(key, _)| serde_json::json!({ "key": key }))
                .collect()
        })
        .unwrap_or_default();

    Json(serde_json::json!({ "items": items })).into_response()
}
