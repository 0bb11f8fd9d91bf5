use async_trait::async_trait;
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use std::future::Future;
use tower::{BoxError, Service, ServiceExt};

/// The downstream half of a request: produces the response or fails
#[async_trait]
pub trait Continuation: Send + 'static {
    async fn proceed(self, request: Request) -> Result<Response, BoxError>;
}

/// Inbound request bundled with the continuation that handles it
pub struct Context<C> {
    request: Request,
    next: C,
}

impl<C: Continuation> Context<C> {
    pub fn new(request: Request, next: C) -> Self {
        Self { request, next }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn into_parts(self) -> (Request, C) {
        (self.request, self.next)
    }

    /// Run the continuation on the bundled request
    pub async fn proceed(self) -> Result<Response, BoxError> {
        self.next.proceed(self.request).await
    }
}

/// Continuation backed by an async closure. See [`continuation_fn`].
#[derive(Clone)]
pub struct FnContinuation<F> {
    f: F,
}

/// Build a continuation from `async |request| -> Result<impl IntoResponse, E>`
pub fn continuation_fn<F>(f: F) -> FnContinuation<F> {
    FnContinuation { f }
}

#[async_trait]
impl<F, Fut, R, E> Continuation for FnContinuation<F>
where
    F: FnOnce(Request) -> Fut + Send + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + 'static,
    E: Into<BoxError> + 'static,
{
    async fn proceed(self, request: Request) -> Result<Response, BoxError> {
        (self.f)(request)
            .await
            .map(IntoResponse::into_response)
            .map_err(Into::into)
    }
}

/// Continuation backed by a tower service.
///
/// The service is driven to readiness before the call, so readiness errors
/// surface as failures of the continuation.
#[derive(Clone)]
pub struct ServiceContinuation<S> {
    inner: S,
}

impl<S> ServiceContinuation<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S> Continuation for ServiceContinuation<S>
where
    S: Service<Request> + Send + 'static,
    S::Response: IntoResponse,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    async fn proceed(self, request: Request) -> Result<Response, BoxError> {
        self.inner
            .oneshot(request)
            .await
            .map(IntoResponse::into_response)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use std::convert::Infallible;

    fn request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_context_exposes_request() {
        let next = continuation_fn(|_req: Request| async { Ok::<_, Infallible>("OK") });
        let ctx = Context::new(request("/page?x=1"), next);
        assert_eq!(ctx.request().uri().path(), "/page");

        let response = ctx.proceed().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fn_continuation_receives_request() {
        let next = continuation_fn(|req: Request| async move {
            Ok::<_, Infallible>(req.uri().path().to_string())
        });
        let response = next.proceed(request("/echo")).await.unwrap();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"/echo");
    }

    #[tokio::test]
    async fn test_fn_continuation_error() {
        let next = continuation_fn(|_req: Request| async {
            Err::<Response, _>(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"))
        });
        let err = next.proceed(request("/")).await.unwrap_err();
        assert_eq!(err.to_string(), "disk gone");
    }

    #[tokio::test]
    async fn test_service_continuation() {
        let svc = tower::service_fn(|_req: Request| async {
            Ok::<_, Infallible>((StatusCode::ACCEPTED, "queued"))
        });
        let response = ServiceContinuation::new(svc)
            .proceed(request("/"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
