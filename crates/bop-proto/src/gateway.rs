//! HTTP client for the queue server.
//!
//! Thin request/response wrapper: every call returns its failure as a value
//! and never retries. Retrying is the caller's business.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::protocol::{EnqueueRequest, QueueItem};
use crate::query::QueryFilter;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Server unreachable, timed out, or the connection dropped.
    #[error("could not reach server: {0}")]
    Transport(#[source] reqwest::Error),
    /// Server answered but the body was not what we expected.
    #[error("could not parse response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("server replied {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("server is down!")]
    ServerDown,
    #[error("nothing to enqueue")]
    EmptyEnqueue,
}

#[derive(Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("bop-queue/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GatewayError::Transport)?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /queue` — current ordering, now-playing first.
    pub async fn fetch_queue(&self) -> Result<Vec<QueueItem>, GatewayError> {
        debug!("GET /queue");
        let resp = self
            .http
            .get(self.url("/queue"))
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        let resp = ensure_ok(resp).await?;
        resp.json::<Vec<QueueItem>>()
            .await
            .map_err(GatewayError::Decode)
    }

    /// `POST /queue` with `{"ids": [...]}`.
    pub async fn enqueue(&self, ids: &[String]) -> Result<(), GatewayError> {
        if ids.is_empty() {
            return Err(GatewayError::EmptyEnqueue);
        }
        debug!("POST /queue ids={}", ids.len());
        let body = EnqueueRequest { ids: ids.to_vec() };
        let resp = self
            .http
            .post(self.url("/queue"))
            .json(&body)
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        ensure_ok(resp).await?;
        Ok(())
    }

    /// `POST /advancedsearch` — one page of results.
    pub async fn search(&self, filter: &QueryFilter) -> Result<Vec<QueueItem>, GatewayError> {
        debug!("POST /advancedsearch page={}", filter.page);
        let resp = self
            .http
            .post(self.url("/advancedsearch"))
            .json(filter)
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        let resp = ensure_ok(resp).await?;
        resp.json::<Vec<QueueItem>>()
            .await
            .map_err(GatewayError::Decode)
    }

    /// `GET /health`. Any transport failure reads as "server is down".
    pub async fn health(&self) -> Result<(), GatewayError> {
        self.http
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| {
                debug!("health probe failed: {}", e);
                GatewayError::ServerDown
            })?;
        Ok(())
    }

    /// Raw bytes from an arbitrary URL (cover images).
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, GatewayError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        let resp = ensure_ok(resp).await?;
        let bytes = resp.bytes().await.map_err(GatewayError::Decode)?;
        Ok(bytes.to_vec())
    }
}

async fn ensure_ok(resp: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = resp.status();
    if status == StatusCode::OK {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(GatewayError::Status {
        status,
        body: body.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = GatewayClient::new("http://box:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/queue"), "http://box:8080/queue");
    }

    #[tokio::test]
    async fn test_enqueue_nothing_is_local_error() {
        let client = GatewayClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let err = client.enqueue(&[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyEnqueue));
    }

    #[test]
    fn test_status_error_message() {
        let err = GatewayError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "song not found".into(),
        };
        assert_eq!(err.to_string(), "server replied 400 Bad Request: song not found");
    }
}
