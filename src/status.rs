//! HTTP status codes as a typed enum.
//!
//! Only the codes this application actually answers with are listed.
//!
//! ```rust
//! use inkpot::{Response, Status};
//!
//! Response::builder()
//!     .status(Status::NotFound)
//!     .html("article not found");
//! ```

/// The HTTP status codes the application emits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                  // 200
    Found,               // 302
    NotFound,            // 404
    InternalServerError, // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Found               => 302,
            Status::NotFound            => 404,
            Status::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                  => Self::OK,
            Status::Found               => Self::FOUND,
            Status::NotFound            => Self::NOT_FOUND,
            Status::InternalServerError => Self::INTERNAL_SERVER_ERROR,
        }
    }
}
