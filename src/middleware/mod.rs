//! Middleware layer.
//!
//! Cross-cutting steps the server runs around every request, in this order:
//!
//! 1. [`strip_trailing_slash`] on the path, before route resolution
//! 2. the routed handler (or the fallback)
//! 3. [`force_html`] on the response
//! 4. [`trace::record`] once the response is final

pub mod trace;

use crate::response::{HTML, Response};

/// Drops trailing `/` from every path except the root.
pub fn strip_trailing_slash(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

/// Every response leaves as `text/html; charset=utf-8`.
pub fn force_html(mut res: Response) -> Response {
    res.set_header("content-type", HTML);
    res
}
