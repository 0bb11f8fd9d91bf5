use axum::response::Response;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error};

use super::context::{Context, Continuation};
use super::outcome::{translate, Outcome};
use crate::errors::ErrorInfo;
use crate::metrics::BOUNDARY_FAILURES_TOTAL;

/// Knobs controlling how failures are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryPolicy {
    /// Put the downstream error message in the response body
    pub expose_messages: bool,
    /// Treat a panicking continuation as a failure instead of unwinding
    pub catch_panics: bool,
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        Self {
            expose_messages: true,
            catch_panics: true,
        }
    }
}

/// Runs a continuation and converts its failure into a `500` response.
///
/// Every failure is caught exactly once here; nothing is retried and nothing
/// propagates to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interceptor {
    policy: BoundaryPolicy,
}

impl Interceptor {
    pub fn new(policy: BoundaryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Entry point: proceed with the context and answer with a response
    pub async fn intercept<C: Continuation>(&self, ctx: Context<C>) -> Response {
        let outcome = self.run(ctx).await;
        self.respond(outcome)
    }

    /// Proceed and capture the result as an [`Outcome`] without translating it
    pub async fn run<C: Continuation>(&self, ctx: Context<C>) -> Outcome {
        debug!(
            method = %ctx.request().method(),
            path = %ctx.request().uri().path(),
            "Proceeding to downstream"
        );
        let (request, next) = ctx.into_parts();
        let proceed = next.proceed(request);

        if !self.policy.catch_panics {
            return Outcome::from(proceed.await);
        }

        match AssertUnwindSafe(proceed).catch_unwind().await {
            Ok(result) => Outcome::from(result),
            Err(payload) => Outcome::Failure(ErrorInfo::from_panic(payload)),
        }
    }

    /// Record a failure and apply the message policy before translating
    fn respond(&self, outcome: Outcome) -> Response {
        match outcome {
            Outcome::Success(response) => {
                debug!(status = %response.status().as_u16(), "Downstream succeeded");
                response
            }
            Outcome::Failure(info) => {
                error!(
                    kind = %info.kind,
                    message = %info.message,
                    "Downstream failed, answering with 500"
                );
                BOUNDARY_FAILURES_TOTAL
                    .with_label_values(&[info.kind.as_label()])
                    .inc();

                let info = if self.policy.expose_messages {
                    info
                } else {
                    info.redacted()
                };
                translate(Outcome::Failure(info))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::continuation_fn;
    use crate::errors::FailureKind;
    use axum::{
        body::Body,
        extract::Request,
        http::StatusCode,
        response::IntoResponse,
    };
    use std::convert::Infallible;
    use tower::BoxError;

    fn request() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    async fn parts(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn failing(message: &'static str) -> Context<impl Continuation> {
        Context::new(
            request(),
            continuation_fn(move |_req: Request| async move {
                Err::<Response, BoxError>(message.into())
            }),
        )
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let ctx = Context::new(
            request(),
            continuation_fn(|_req: Request| async { Ok::<_, Infallible>("OK") }),
        );
        let (status, body) = parts(Interceptor::default().intercept(ctx).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_non_200_success_is_not_rewritten() {
        let ctx = Context::new(
            request(),
            continuation_fn(|_req: Request| async {
                Ok::<_, Infallible>((StatusCode::NOT_FOUND, "missing").into_response())
            }),
        );
        let (status, body) = parts(Interceptor::default().intercept(ctx).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "missing");
    }

    #[tokio::test]
    async fn test_error_becomes_500_with_message() {
        let response = Interceptor::default().intercept(failing("boom")).await;
        let (status, body) = parts(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error: boom");
    }

    #[tokio::test]
    async fn test_empty_message() {
        let response = Interceptor::default().intercept(failing("")).await;
        let (status, body) = parts(response).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error: ");
    }

    #[tokio::test]
    async fn test_same_input_same_response() {
        let interceptor = Interceptor::default();
        let first = parts(interceptor.intercept(failing("boom")).await).await;
        let second = parts(interceptor.intercept(failing("boom")).await).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_redacted_message() {
        let interceptor = Interceptor::new(BoundaryPolicy {
            expose_messages: false,
            ..BoundaryPolicy::default()
        });
        let (status, body) = parts(interceptor.intercept(failing("db password wrong")).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error: Internal Server Error");
    }

    #[tokio::test]
    async fn test_panic_is_caught() {
        let ctx = Context::new(
            request(),
            continuation_fn(|_req: Request| async {
                if true {
                    panic!("handler exploded");
                }
                Ok::<_, Infallible>("unreachable")
            }),
        );

        let outcome = Interceptor::default().run(ctx).await;
        match outcome {
            Outcome::Failure(info) => {
                assert_eq!(info.kind, FailureKind::Panic);
                assert_eq!(info.message, "handler exploded");
            }
            Outcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_formatted_panic_message() {
        let ctx = Context::new(
            request(),
            continuation_fn(|_req: Request| async {
                if true {
                    panic!("bad id {}", 7);
                }
                Ok::<_, Infallible>("unreachable")
            }),
        );
        let (status, body) = parts(Interceptor::default().intercept(ctx).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "Error: bad id 7");
    }

    #[tokio::test]
    #[should_panic(expected = "not caught")]
    async fn test_panic_unwinds_when_capture_disabled() {
        let interceptor = Interceptor::new(BoundaryPolicy {
            catch_panics: false,
            ..BoundaryPolicy::default()
        });
        let ctx = Context::new(
            request(),
            continuation_fn(|_req: Request| async {
                if true {
                    panic!("not caught");
                }
                Ok::<_, Infallible>("unreachable")
            }),
        );
        interceptor.intercept(ctx).await;
    }
}
