use super::types::{GioRequest, GioResponse};
use crate::error::ValidationError;
use crate::http_client::build_client_with_timeout;
use anyhow::{Context, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use reqwest::Client;
use serde_json::json;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct BridgeState {
    client: Client,
    gio_url: String,
    domain: u16,
}

impl BridgeState {
    pub fn new(coordinator_url: &str, domain: u16, timeout_secs: u64) -> Self {
        Self {
            client: build_client_with_timeout(timeout_secs),
            gio_url: format!("{}/gio", coordinator_url.trim_end_matches('/')),
            domain,
        }
    }

    pub fn gio_url(&self) -> &str {
        &self.gio_url
    }
}

pub fn router(state: BridgeState) -> Router {
    Router::new()
        .route("/v1/chat/completions", post(handle_completion))
        .route("/gio", post(handle_gio))
        .route("/health", get(handle_health))
        .fallback(handle_not_found)
        .with_state(state)
}

/// Bind `host:port` and serve until `cancel` fires.
pub async fn run_bridge(
    host: &str,
    port: u16,
    state: BridgeState,
    cancel: CancellationToken,
) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse GIO bridge bind address")?;
    let listener = TcpListener::bind(addr)
        .await
        .context("bind GIO bridge socket")?;
    serve_with_listener(listener, state, cancel).await
}

pub async fn serve_with_listener(
    listener: TcpListener,
    state: BridgeState,
    cancel: CancellationToken,
) -> Result<()> {
    let local = listener.local_addr().context("read GIO bridge address")?;
    tracing::info!(upstream = %state.gio_url, "GIO bridge running at http://{local}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .context("GIO bridge server failed")
}

fn json_error(error: &str, details: Option<String>) -> Response {
    let body = match details {
        Some(details) => json!({ "error": error, "details": details }),
        None => json!({ "error": error }),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn handle_completion(State(state): State<BridgeState>, body: Bytes) -> Response {
    let raw = String::from_utf8_lossy(&body);
    let request = GioRequest::for_body(state.domain, raw.as_bytes());
    tracing::info!(url = %state.gio_url, bytes = body.len(), "Forwarding chat completion over GIO");

    let upstream = match state.client.post(&state.gio_url).json(&request).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("GIO forward failed: {e}");
            return (StatusCode::BAD_GATEWAY, "Could not forward request").into_response();
        }
    };

    let Ok(upstream_body) = upstream.bytes().await else {
        return json_error("Could not read GIO response body", None);
    };

    let gio_response: GioResponse = match serde_json::from_slice(&upstream_body) {
        Ok(response) => response,
        Err(e) => return json_error("Invalid GIOResponse format", Some(e.to_string())),
    };
    tracing::debug!(code = gio_response.response_code, "Received GIO response");

    match gio_response.decoded_text() {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(ValidationError::InvalidUtf8(details)) => {
            json_error("Invalid UTF-8 data in response", Some(details))
        }
        Err(e) => json_error("Invalid hex data in response", Some(e.to_string())),
    }
}

async fn handle_gio(body: Bytes) -> Response {
    match serde_json::from_slice::<GioRequest>(&body) {
        Ok(request) => {
            tracing::info!(domain = request.domain, "Received GIO request");
            Json(json!({ "status": "success" })).into_response()
        }
        Err(_) => json_error("Invalid JSON", None),
    }
}

async fn handle_health() -> &'static str {
    "OK"
}

async fn handle_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
