use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderMap},
    response::Response,
};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tower::Service;
use tracing::{debug, info, warn};

use crate::config::OriginConfig;
use crate::metrics::ORIGIN_REQUESTS_TOTAL;

/// Largest request body buffered before forwarding
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;

const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("invalid origin url: {0}")]
    InvalidUrl(String),

    #[error("failed to build origin client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),

    #[error("origin request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Forwards requests to a remote origin and relays its responses
#[derive(Clone)]
pub struct OriginProxy {
    http_client: reqwest::Client,
    base_url: Arc<str>,
}

impl OriginProxy {
    pub fn new(config: &OriginConfig) -> Result<Self, OriginError> {
        let base_url = config.url.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(OriginError::InvalidUrl(config.url.clone()));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("error-boundary/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(OriginError::Client)?;

        info!(
            "Initialized origin proxy for {} with timeout {}ms",
            base_url, config.timeout_ms
        );

        Ok(Self {
            http_client,
            base_url: Arc::from(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Target URL on the origin for a request path and query
    fn target_url(&self, request: &Request) -> String {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Send one request to the origin and buffer its response
    pub async fn forward(&self, request: Request) -> Result<Response, OriginError> {
        let result = self.send(request).await;

        let label = if result.is_ok() { "ok" } else { "error" };
        ORIGIN_REQUESTS_TOTAL.with_label_values(&[label]).inc();

        result
    }

    async fn send(&self, request: Request) -> Result<Response, OriginError> {
        let url = self.target_url(&request);
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await?;

        let mut headers = parts.headers;
        strip_hop_by_hop(&mut headers);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        debug!(method = %parts.method, url = %url, "Forwarding request to origin");

        let upstream = self
            .http_client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Origin request failed");
                e
            })?;

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        strip_hop_by_hop(&mut headers);
        let bytes = upstream.bytes().await?;

        debug!(status = %status.as_u16(), bytes = bytes.len(), "Origin responded");

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

impl Service<Request> for OriginProxy {
    type Response = Response;
    type Error = OriginError;
    type Future = BoxFuture<'static, Result<Response, OriginError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let proxy = self.clone();
        Box::pin(async move { proxy.forward(request).await })
    }
}

fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
}
