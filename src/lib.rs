//! HTTP error boundary: runs a downstream handler and turns any failure into
//! a `500` response with body `Error: <message>`.

pub mod api;
pub mod boundary;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod origin;
pub mod static_files;
