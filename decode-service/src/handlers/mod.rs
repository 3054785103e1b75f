//! HTTP handlers for decode-service.
//!
//! The decode endpoint adapts axum requests to function events; the rest
//! are infrastructure probes.

pub mod decode;
pub mod health;
pub mod metrics;

pub use decode::decode;
pub use health::{health_check, not_found, readiness_check};
pub use metrics::metrics;
