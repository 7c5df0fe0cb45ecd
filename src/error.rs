//! Error types.
//!
//! Application-level outcomes (404, 500, a form with messages) are expressed
//! as HTTP [`Response`](crate::Response) values by the controller. The types
//! here are what the layers underneath report to it, plus the startup
//! [`Error`] for failures that stop the process.

use thiserror::Error;

/// Failures that prevent the server from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("templates: {0}")]
    Template(#[from] tera::Error),
    #[error("routing: {0}")]
    Route(#[from] RouteError),
}

/// Route registration and reverse-routing failures.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("no route named `{0}`")]
    UnknownRoute(String),
    #[error("route name `{0}` is already registered")]
    DuplicateName(String),
    #[error("route `{route}` needs parameter `{param}`")]
    MissingParam { route: String, param: String },
    #[error("route `{route}`: `{value}` is not a valid `{param}`")]
    InvalidParam { route: String, param: String, value: String },
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error(transparent)]
    Conflict(#[from] matchit::InsertError),
}

/// Article persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row has the requested id.
    #[error("article not found")]
    NotFound,
    /// Connection, statement, constraint, or driver failure.
    #[error("persistence: {0}")]
    Persistence(#[from] sqlx::Error),
    /// The statement did not finish before the configured deadline.
    #[error("database call exceeded {0:?}")]
    Timeout(std::time::Duration),
}

/// Template lookup or execution failure.
#[derive(Debug, Error)]
#[error("render `{template}`: {source}")]
pub struct RenderError {
    pub template: String,
    #[source]
    pub source: tera::Error,
}
