//! HTTP endpoint for ingesting and querying air quality readings
//!
//! Endpoints:
//! - GET  /                          - Liveness message
//! - GET  /api/hello                 - Greeting
//! - GET  /health                    - Service health and store status
//! - GET  /test                      - Store/connection diagnostics
//! - POST /api/air/ingest            - Validate, compute AQI, persist
//! - GET  /api/air/latest            - Most recent reading
//! - GET  /get_data                  - Alias of /api/air/latest
//! - GET  /api/air/history?limit=N   - Recent readings, oldest first
//!
//! Routing is a plain function from (method, url, body) to an
//! `ApiResponse`, so it can be exercised without a socket. `serve` wraps
//! it in a `tiny_http` accept loop feeding a worker pool.

use crate::ingest::{self, IngestResponse, ValidationError};
use crate::model::Reading;
use crate::store::{ReadingStore, StoreError};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use threadpool::ThreadPool;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

/// Readings returned by /api/air/history when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Upper bound for the history `limit` parameter.
pub const MAX_HISTORY_LIMIT: usize = 500;

/// Store-error detail is cut to this many characters in responses.
const ERROR_DETAIL_CHARS: usize = 120;

const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/",
    "/api/hello",
    "/health",
    "/test",
    "/api/air/ingest",
    "/api/air/latest",
    "/api/air/history",
    "/get_data",
];

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared by all request workers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<Box<dyn ReadingStore>>>,
    database_url_set: bool,
}

impl AppState {
    pub fn new(store: Box<dyn ReadingStore>, database_url_set: bool) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            database_url_set,
        }
    }

    /// A panicking worker must not wedge the store for everyone else.
    fn store(&self) -> MutexGuard<'_, Box<dyn ReadingStore>> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the store back once every other handle is gone, for closing.
    pub fn into_store(self) -> Option<Box<dyn ReadingStore>> {
        Arc::try_unwrap(self.store)
            .ok()
            .map(|m| m.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Status plus optional JSON body (`None` for 204).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<Value>,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self { status, body: Some(body) }
    }

    fn no_content() -> Self {
        Self { status: 204, body: None }
    }

    fn ok<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(body) => Self::json(200, body),
            Err(e) => Self::json(500, json!({ "detail": format!("Serialization error: {}", e) })),
        }
    }

    fn store_error(e: &StoreError) -> Self {
        let detail: String = e.to_string().chars().take(ERROR_DETAIL_CHARS).collect();
        tracing::error!("store error: {}", e);
        Self::json(500, json!({ "detail": format!("Database error: {}", detail) }))
    }

    fn validation_error(e: &ValidationError) -> Self {
        Self::json(422, json!({ "detail": e.to_string(), "field": e.field() }))
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Splits `?a=1&b=2` into decoded key/value pairs.
fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                let spaced = s.replace('+', " ");
                urlencoding::decode(&spaced)
                    .map(|d| d.into_owned())
                    .unwrap_or(spaced)
            };
            (decode(key), decode(value))
        })
        .collect()
}

/// Resolves the history `limit` parameter: default 50, clamped to [1, 500].
pub fn history_limit(query: &str) -> Result<usize, String> {
    let raw = parse_query(query)
        .into_iter()
        .find(|(key, _)| key == "limit")
        .map(|(_, value)| value);

    match raw {
        None => Ok(DEFAULT_HISTORY_LIMIT),
        Some(value) => {
            let trimmed = value.trim();
            let requested: i64 = match trimmed.parse() {
                Ok(n) => n,
                // integers too large for i64 still clamp
                Err(_) if is_integer(trimmed) => {
                    if trimmed.starts_with('-') { 1 } else { MAX_HISTORY_LIMIT as i64 }
                }
                Err(_) => return Err(format!("limit must be an integer (got '{}')", value)),
            };
            Ok(requested.clamp(1, MAX_HISTORY_LIMIT as i64) as usize)
        }
    }
}

/// Optional sign followed by at least one ASCII digit.
fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Routes one request using the current time for new readings.
pub fn handle(state: &AppState, method: &Method, url: &str, body: &str) -> ApiResponse {
    handle_at(state, method, url, body, Utc::now())
}

/// Routes one request; `now` stamps ingested readings and placeholders.
pub fn handle_at(
    state: &AppState,
    method: &Method,
    url: &str,
    body: &str,
    now: DateTime<Utc>,
) -> ApiResponse {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));

    if *method == Method::Options {
        return ApiResponse::no_content();
    }

    match (method, path) {
        (Method::Get, "/") => {
            ApiResponse::json(200, json!({ "message": "Air Quality Analyzer API is running" }))
        }
        (Method::Get, "/api/hello") => {
            ApiResponse::json(200, json!({ "message": "Hello from the backend API!" }))
        }
        (Method::Get, "/health") => handle_health(state),
        (Method::Get, "/test") => handle_diagnostics(state),
        (Method::Post, "/api/air/ingest") => handle_ingest(state, body, now),
        (Method::Get, "/api/air/latest") | (Method::Get, "/get_data") => handle_latest(state, now),
        (Method::Get, "/api/air/history") => handle_history(state, query),
        (_, p) if AVAILABLE_ENDPOINTS.contains(&p) => {
            ApiResponse::json(405, json!({ "detail": "Method Not Allowed" }))
        }
        _ => ApiResponse::json(
            404,
            json!({
                "detail": "Not Found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        ),
    }
}

/// Handle /health endpoint
fn handle_health(state: &AppState) -> ApiResponse {
    let mut store = state.store();
    let backend = store.backend();

    match store.count() {
        Ok(readings) => ApiResponse::json(
            200,
            json!({
                "status": "ok",
                "service": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "store": backend,
                "readings": readings,
            }),
        ),
        Err(e) => {
            tracing::warn!("health check: store unavailable: {}", e);
            ApiResponse::json(
                503,
                json!({
                    "status": "degraded",
                    "service": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "store": backend,
                }),
            )
        }
    }
}

/// Handle /test endpoint. Always 200; reports what works and what doesn't.
fn handle_diagnostics(state: &AppState) -> ApiResponse {
    let mut store = state.store();
    let backend = store.backend();

    let (database, connection_status, readings) = match store.count() {
        Ok(n) => ("connected", "Connected".to_string(), Some(n)),
        Err(e) => {
            let detail: String = e.to_string().chars().take(50).collect();
            ("error", format!("Error: {}", detail), None)
        }
    };

    ApiResponse::json(
        200,
        json!({
            "backend": "running",
            "store": backend,
            "database": database,
            "connection_status": connection_status,
            "readings": readings,
            "database_url": if state.database_url_set { "set" } else { "not set" },
        }),
    )
}

/// Handle POST /api/air/ingest
fn handle_ingest(state: &AppState, body: &str, now: DateTime<Utc>) -> ApiResponse {
    let payload = match ingest::parse_payload(body) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!("rejected reading: {}", e);
            return ApiResponse::validation_error(&e);
        }
    };

    let reading = ingest::build_reading(&payload, now);

    if let Err(e) = state.store().insert(&reading) {
        return ApiResponse::store_error(&e);
    }

    tracing::info!(
        pm25 = reading.pm25,
        pm10 = reading.pm10,
        aqi = reading.aqi,
        category = reading.category.as_str(),
        "reading ingested"
    );

    ApiResponse::ok(&IngestResponse::from(&reading))
}

/// Handle GET /api/air/latest (and /get_data)
fn handle_latest(state: &AppState, now: DateTime<Utc>) -> ApiResponse {
    match state.store().latest() {
        Ok(Some(reading)) => ApiResponse::ok(&reading),
        Ok(None) => ApiResponse::ok(&Reading::placeholder(now)),
        Err(e) => ApiResponse::store_error(&e),
    }
}

/// Handle GET /api/air/history
fn handle_history(state: &AppState, query: &str) -> ApiResponse {
    let limit = match history_limit(query) {
        Ok(limit) => limit,
        Err(detail) => return ApiResponse::json(422, json!({ "detail": detail, "field": "limit" })),
    };

    match state.store().recent(limit) {
        Ok(readings) => ApiResponse::ok(&readings),
        Err(e) => ApiResponse::store_error(&e),
    }
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

/// Build the tiny_http response with JSON body and CORS headers
fn to_http(response: ApiResponse) -> Response<std::io::Cursor<Vec<u8>>> {
    let bytes = response
        .body
        .map(|json| serde_json::to_vec_pretty(&json).unwrap_or_default())
        .unwrap_or_default();

    let headers = [
        ("Content-Type", "application/json"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
        ("Access-Control-Allow-Headers", "*"),
    ];

    headers
        .iter()
        .filter_map(|(name, value)| header(name, value))
        .fold(
            Response::from_data(bytes).with_status_code(StatusCode::from(response.status)),
            |resp, h| resp.with_header(h),
        )
}

/// Read the body, route, and respond to a single request
fn respond(mut request: Request, state: &AppState) {
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = String::new();
    let response = match request.as_reader().read_to_string(&mut body) {
        Ok(_) => handle(state, &method, &url, &body),
        Err(e) => ApiResponse::json(400, json!({ "detail": format!("Unreadable request body: {}", e) })),
    };

    tracing::debug!("{} {} -> {}", method, url, response.status);

    if let Err(e) = request.respond(to_http(response)) {
        tracing::warn!("failed to send response for {} {}: {}", method, url, e);
    }
}

/// Bind the HTTP server
pub fn bind(address: &str) -> Result<Server, String> {
    Server::http(address).map_err(|e| format!("Failed to start HTTP server on {}: {}", address, e))
}

/// Accept requests until `server.unblock()` is called, then wait for
/// in-flight requests to finish.
pub fn serve(server: &Server, state: &AppState, workers: usize) {
    let pool = ThreadPool::with_name("airmon-http".to_string(), workers.max(1));

    for request in server.incoming_requests() {
        let state = state.clone();
        pool.execute(move || respond(request, &state));
    }

    pool.join();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn state() -> AppState {
        AppState::new(Box::new(MemoryStore::new()), false)
    }

    #[test]
    fn test_history_limit_defaults_and_clamps() {
        assert_eq!(history_limit(""), Ok(50));
        assert_eq!(history_limit("limit=10"), Ok(10));
        assert_eq!(history_limit("limit=0"), Ok(1));
        assert_eq!(history_limit("limit=-7"), Ok(1));
        assert_eq!(history_limit("limit=501"), Ok(500));
        assert_eq!(history_limit("other=3&limit=%2020"), Ok(20));
        assert!(history_limit("limit=ten").is_err());
        assert!(history_limit("limit=-").is_err());
    }

    #[test]
    fn test_history_limit_saturates_huge_integers() {
        assert_eq!(history_limit("limit=99999999999999999999"), Ok(500));
        assert_eq!(history_limit("limit=-99999999999999999999"), Ok(1));
        assert_eq!(history_limit("limit=%2B99999999999999999999"), Ok(500));
    }

    #[test]
    fn test_parse_query_decodes() {
        let pairs = parse_query("a=1&b=hello+world&c=%2F&d");
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "hello world".to_string()),
                ("c".to_string(), "/".to_string()),
                ("d".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_options_is_preflight() {
        let resp = handle(&state(), &Method::Options, "/api/air/ingest", "");
        assert_eq!(resp, ApiResponse { status: 204, body: None });
    }

    #[test]
    fn test_wrong_method_is_405() {
        let resp = handle(&state(), &Method::Get, "/api/air/ingest", "");
        assert_eq!(resp.status, 405);
    }

    #[test]
    fn test_unknown_route_is_404() {
        let resp = handle(&state(), &Method::Get, "/api/air/forecast", "");
        assert_eq!(resp.status, 404);
        assert!(resp.body.unwrap()["available_endpoints"].is_array());
    }

    #[test]
    fn test_invalid_history_limit_is_422() {
        let resp = handle(&state(), &Method::Get, "/api/air/history?limit=abc", "");
        assert_eq!(resp.status, 422);
    }

    #[test]
    fn test_to_http_sets_status() {
        let http = to_http(ApiResponse::json(201, json!({})));
        assert_eq!(http.status_code(), StatusCode(201));
    }

    #[test]
    fn test_into_store_after_handles_dropped() {
        let state = state();
        let clone = state.clone();
        drop(clone);
        assert!(state.into_store().is_some());
    }
}
