//! Per-request access log.

use std::time::Instant;

use tracing::{info, warn};

use crate::method::Method;
use crate::status::Status;

/// Emits one structured line per request. Server errors log at `warn`.
/// Methods outside RFC 9110 are logged as `OTHER`.
pub fn record(method: Option<Method>, path: &str, status: Status, started: Instant) {
    let method = method.map_or("OTHER", Method::as_str);
    let code = u16::from(status);
    let latency_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    if code >= 500 {
        warn!(method, path, status = code, latency_us, "request");
    } else {
        info!(method, path, status = code, latency_us, "request");
    }
}
