use axum::{extract::Request, response::IntoResponse, response::Response};
use futures::future::BoxFuture;
use std::convert::Infallible;
use std::task::{Context as TaskContext, Poll};
use tower::{BoxError, Layer, Service};

use super::context::{Context, ServiceContinuation};
use super::interceptor::{BoundaryPolicy, Interceptor};

/// Wraps a fallible service so that it never returns `Err`
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorBoundaryLayer {
    interceptor: Interceptor,
}

impl ErrorBoundaryLayer {
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self {
            interceptor: Interceptor::new(policy),
        }
    }
}

impl<S> Layer<S> for ErrorBoundaryLayer {
    type Service = ErrorBoundaryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorBoundaryService {
            inner,
            interceptor: self.interceptor,
        }
    }
}

/// Service produced by [`ErrorBoundaryLayer`]
#[derive(Debug, Clone)]
pub struct ErrorBoundaryService<S> {
    inner: S,
    interceptor: Interceptor,
}

impl<S> ErrorBoundaryService<S> {
    pub fn new(inner: S, policy: BoundaryPolicy) -> Self {
        ErrorBoundaryLayer::new(policy).layer(inner)
    }
}

impl<S> Service<Request> for ErrorBoundaryService<S>
where
    S: Service<Request> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    // Readiness of the inner service is awaited inside the continuation, where
    // its errors are caught like any other failure.
    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let next = ServiceContinuation::new(self.inner.clone());
        let interceptor = self.interceptor;

        Box::pin(async move {
            let ctx = Context::new(request, next);
            Ok(interceptor.intercept(ctx).await)
        })
    }
}
