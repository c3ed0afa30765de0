//! HTTP front end: `GET /track/{terms}` plus a health check.
//!
//! One hyper HTTP/1 connection task per client. Tracking and aggregation are
//! CPU-bound and run on the blocking pool.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW,
    CONTENT_TYPE,
};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode, Uri};
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use shico_tracker::{VocabularyAggregator, VocabularyTracker};
use shico_types::TrackingConfig;
use tokio::net::TcpListener;

use crate::config::NetworkMode;
use crate::error::ServiceError;
use crate::format::TrackResponse;
use crate::params::parse_query;

const TRACK_PREFIX: &str = "/track/";
const ALLOWED_METHODS: &str = "GET, OPTIONS";

/// Shared, read-only state handed to every request.
#[derive(Debug, Clone)]
pub struct AppState {
    tracker: Arc<dyn VocabularyTracker>,
    network_mode: NetworkMode,
}

impl AppState {
    pub fn new(tracker: Arc<dyn VocabularyTracker>, network_mode: NetworkMode) -> Self {
        Self { tracker, network_mode }
    }
}

/// Accept connections until the listener fails.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: Request<hyper::body::Incoming>| {
                let state = state.clone();
                async move { Ok::<_, Infallible>(handle_request(req.method(), req.uri(), &state).await) }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                tracing::debug!(peer = %peer, error = %e, "Connection error");
            }
        });
    }
}

/// Route one request and log its outcome.
pub async fn handle_request(method: &Method, uri: &Uri, state: &AppState) -> Response<Full<Bytes>> {
    let started = Instant::now();
    let response = route(method, uri, state).await;
    tracing::info!(
        method = %method,
        path = uri.path(),
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Handled request"
    );
    response
}

async fn route(method: &Method, uri: &Uri, state: &AppState) -> Response<Full<Bytes>> {
    let path = uri.path();
    let known = path == "/health"
        || path
            .strip_prefix(TRACK_PREFIX)
            .is_some_and(|terms| !terms.contains('/'));

    if !known {
        return error_response(StatusCode::NOT_FOUND, "not_found", format!("No route for {}", path));
    }
    if method == Method::OPTIONS {
        return preflight();
    }
    if method != Method::GET {
        let mut response = error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            format!("{} is not supported", method),
        );
        response.headers_mut().insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        return response;
    }

    if path == "/health" {
        return response(StatusCode::OK, "text/plain", "OK");
    }

    let raw_terms = &path[TRACK_PREFIX.len()..];
    match track(raw_terms, uri.query(), state).await {
        Ok(body) => match serde_json::to_vec(&body) {
            Ok(bytes) => response(StatusCode::OK, "application/json", bytes),
            Err(e) => service_error(&ServiceError::from(e)),
        },
        Err(e) => service_error(&e),
    }
}

/// Split the `{terms}` path segment into trimmed, non-empty terms.
pub fn parse_terms(raw: &str) -> Vec<String> {
    percent_decode_str(raw)
        .decode_utf8_lossy()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

async fn track(raw_terms: &str, query: Option<&str>, state: &AppState) -> Result<TrackResponse, ServiceError> {
    let terms = parse_terms(raw_terms);
    if terms.is_empty() {
        return Err(ServiceError::NoTerms);
    }
    let config = parse_query(query)?;
    tracing::debug!(terms = ?terms, config = ?config, "Tracking request");

    let tracker = Arc::clone(&state.tracker);
    let mode = state.network_mode;
    tokio::task::spawn_blocking(move || run_tracking(tracker.as_ref(), &terms, &config, mode))
        .await
        .map_err(|e| ServiceError::Task(e.to_string()))?
}

/// Track, aggregate and format. Synchronous; call it off the async reactor.
pub fn run_tracking(
    tracker: &dyn VocabularyTracker,
    terms: &[String],
    config: &TrackingConfig,
    mode: NetworkMode,
) -> Result<TrackResponse, ServiceError> {
    let tracked = tracker.track_clouds(terms, &config.track)?;
    let aggregator = VocabularyAggregator::new(&config.aggregation)?;
    let aggregated = aggregator.aggregate(&tracked.results)?;
    Ok(TrackResponse::build(&tracked, &aggregated, mode))
}

fn response(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

fn preflight() -> Response<Full<Bytes>> {
    let mut response = response(StatusCode::NO_CONTENT, "text/plain", Bytes::new());
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

fn error_response(status: StatusCode, code: &str, message: String) -> Response<Full<Bytes>> {
    let body = ErrorBody { error: code, message };
    match serde_json::to_vec(&body) {
        Ok(bytes) => response(status, "application/json", bytes),
        Err(_) => response(status, "text/plain", body.message),
    }
}

fn service_error(err: &ServiceError) -> Response<Full<Bytes>> {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, "Rejected request");
    }
    error_response(status, err.code(), err.to_string())
}
