//! Remote origin used as the downstream when `ORIGIN_URL` is configured

pub mod proxy;

pub use proxy::{OriginError, OriginProxy};
