//! Error-translating interceptor
//!
//! Runs a downstream continuation for a request and turns any failure into a
//! `500` response whose body is `Error: <message>`.

pub mod context;
pub mod interceptor;
pub mod layer;
pub mod outcome;

pub use context::{continuation_fn, Context, Continuation, FnContinuation, ServiceContinuation};
pub use interceptor::{BoundaryPolicy, Interceptor};
pub use layer::{ErrorBoundaryLayer, ErrorBoundaryService};
pub use outcome::{translate, Outcome};
