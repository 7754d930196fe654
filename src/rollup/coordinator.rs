//! HTTP client for the rollup coordinator (`/finish` and `/notice`).

use super::notice::{NoticeEmitter, PublishOutcome};
use super::types::{FinishRequest, NoticeRequest, Verdict};
use crate::error::CoordinatorError;
use crate::http_client::{build_client_with_timeout, error_body};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// `/finish` answers this when nothing is pending.
pub const NO_PENDING_REQUEST: StatusCode = StatusCode::ACCEPTED;
/// `/notice` answers this when the notice was stored.
pub const NOTICE_CREATED: StatusCode = StatusCode::CREATED;

/// What one `/finish` exchange produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Exchange {
    /// No request is pending.
    Idle,
    /// A request body, not yet checked for type.
    Request(Value),
    /// The coordinator attached a body that is not JSON.
    Malformed(String),
}

#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Report `verdict` for the previous request and receive the next one.
    async fn finish(&self, verdict: Verdict) -> Result<Exchange, CoordinatorError>;
}

pub struct RollupHttpClient {
    base_url: String,
    /// Pre-computed endpoint URLs (avoids `format!` per request).
    finish_url: String,
    notice_url: String,
    client: Client,
}

impl RollupHttpClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            finish_url: format!("{base_url}/finish"),
            notice_url: format!("{base_url}/notice"),
            base_url,
            client: build_client_with_timeout(timeout_secs),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn request_error(endpoint: &str, err: &reqwest::Error) -> CoordinatorError {
    let message = if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    CoordinatorError::Request {
        endpoint: endpoint.to_string(),
        message,
    }
}

#[async_trait]
impl Coordinator for RollupHttpClient {
    async fn finish(&self, verdict: Verdict) -> Result<Exchange, CoordinatorError> {
        let response = self
            .client
            .post(&self.finish_url)
            .json(&FinishRequest { status: verdict })
            .send()
            .await
            .map_err(|e| request_error("/finish", &e))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), %verdict, "Received finish status");

        if status == NO_PENDING_REQUEST {
            return Ok(Exchange::Idle);
        }

        if !status.is_success() {
            return Err(CoordinatorError::Status {
                endpoint: "/finish".into(),
                status: status.as_u16(),
                body: error_body(response).await,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| request_error("/finish", &e))?;

        Ok(match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Exchange::Request(value),
            Err(e) => Exchange::Malformed(e.to_string()),
        })
    }
}

#[async_trait]
impl NoticeEmitter for RollupHttpClient {
    async fn publish(&self, payload: &str) -> PublishOutcome {
        let response = match self
            .client
            .post(&self.notice_url)
            .json(&NoticeRequest { payload })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = request_error("/notice", &e);
                tracing::error!("Notice publication failed: {err}");
                return PublishOutcome::Failed(err.to_string());
            }
        };

        let status = response.status();
        if status == NOTICE_CREATED {
            tracing::info!(bytes = payload.len(), "Notice published");
            return PublishOutcome::Published;
        }

        let body = error_body(response).await;
        tracing::error!(
            status = status.as_u16(),
            "Notice publication failed: coordinator answered {status}: {body}"
        );
        PublishOutcome::Failed(format!("coordinator answered {status}: {body}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn strips_trailing_slash() {
        let client = RollupHttpClient::new("http://127.0.0.1:5004/", 5);
        assert_eq!(client.base_url(), "http://127.0.0.1:5004");
        assert_eq!(client.finish_url, "http://127.0.0.1:5004/finish");
        assert_eq!(client.notice_url, "http://127.0.0.1:5004/notice");
    }

    #[tokio::test]
    async fn finish_202_means_idle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finish"))
            .and(body_json(json!({"status": "accept"})))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = RollupHttpClient::new(&server.uri(), 5);
        let exchange = client.finish(Verdict::Accept).await.unwrap();
        assert_eq!(exchange, Exchange::Idle);
    }

    #[tokio::test]
    async fn finish_200_returns_request_body() {
        let server = MockServer::start().await;
        let request = json!({"request_type": "inspect_state", "data": {"payload": "0x"}});
        Mock::given(method("POST"))
            .and(path("/finish"))
            .and(body_json(json!({"status": "reject"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(request.clone()))
            .mount(&server)
            .await;

        let client = RollupHttpClient::new(&server.uri(), 5);
        let exchange = client.finish(Verdict::Reject).await.unwrap();
        assert_eq!(exchange, Exchange::Request(request));
    }

    #[tokio::test]
    async fn finish_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finish"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = RollupHttpClient::new(&server.uri(), 5);
        let exchange = client.finish(Verdict::Accept).await.unwrap();
        assert!(matches!(exchange, Exchange::Malformed(_)));
    }

    #[tokio::test]
    async fn finish_server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/finish"))
            .respond_with(ResponseTemplate::new(500).set_body_string("exploded"))
            .mount(&server)
            .await;

        let client = RollupHttpClient::new(&server.uri(), 5);
        let err = client.finish(Verdict::Accept).await.unwrap_err();
        assert!(matches!(
            err,
            CoordinatorError::Status { status: 500, ref body, .. } if body == "exploded"
        ));
    }

    #[tokio::test]
    async fn finish_unreachable_is_request_error() {
        let client = RollupHttpClient::new("http://127.0.0.1:1", 2);
        let err = client.finish(Verdict::Accept).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::Request { .. }));
    }

    #[tokio::test]
    async fn notice_201_is_published() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notice"))
            .and(body_json(json!({"payload": "0x68656c6c6f"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"index": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let client = RollupHttpClient::new(&server.uri(), 5);
        assert_eq!(client.publish("0x68656c6c6f").await, PublishOutcome::Published);
    }

    #[tokio::test]
    async fn notice_other_success_codes_are_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notice"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = RollupHttpClient::new(&server.uri(), 5);
        let outcome = client.publish("0x00").await;
        assert!(matches!(outcome, PublishOutcome::Failed(ref msg) if msg.contains("200")));
    }

    #[tokio::test]
    async fn notice_unreachable_is_absorbed() {
        let client = RollupHttpClient::new("http://127.0.0.1:1", 2);
        assert!(!client.publish("0x00").await.is_published());
    }
}
