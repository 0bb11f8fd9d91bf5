//! Static directory used as the downstream when no origin is configured

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::io;
use std::path::Path;
use std::task::{Context, Poll};
use tower::Service;
use tower_http::services::ServeDir;
use tracing::warn;

/// Serves files from a directory.
///
/// Missing files still answer `404`; any other I/O error is returned as
/// `Err` so the error boundary can report it.
#[derive(Clone)]
pub struct StaticFiles {
    serve_dir: ServeDir,
}

impl StaticFiles {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            serve_dir: ServeDir::new(dir),
        }
    }
}

impl Service<Request> for StaticFiles {
    type Response = Response;
    type Error = io::Error;
    type Future = BoxFuture<'static, Result<Response, io::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let path = request.uri().path().to_string();
        let future = self.serve_dir.try_call(request);

        Box::pin(async move {
            future
                .await
                .map(IntoResponse::into_response)
                .map_err(|e| {
                    warn!(path = %path, error = %e, "Failed to read static file");
                    e
                })
        })
    }
}
