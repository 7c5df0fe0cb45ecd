//! # inkpot
//!
//! A minimal content-management backend. Visitors read articles; authors
//! create, edit, and delete them through plain HTML forms; SQLite keeps them.
//!
//! ## The pipeline
//!
//! ```text
//! hyper request
//!   → strip trailing slash
//!   → Router (named routes, typed `{id:[0-9]+}` placeholders)
//!   → ArticleController endpoint
//!        validate → ArticleStore → Renderer / redirect
//!   → force text/html
//!   → access log
//! ```
//!
//! Everything is built once at startup and passed in explicitly. The router
//! is read-only after construction; the database pool is the only shared
//! mutable resource.
//!
//! ## Wiring
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use inkpot::{App, ArticleStore, PoolSettings, Server, store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), inkpot::Error> {
//!     let settings = PoolSettings {
//!         max_open: 25,
//!         idle_timeout: Duration::from_secs(300),
//!         max_lifetime: Duration::from_secs(300),
//!     };
//!     let pool = store::connect("sqlite://inkpot.db?mode=rwc", &settings).await?;
//!     let store = ArticleStore::new(pool, Duration::from_secs(5));
//!     store.migrate().await?;
//!
//!     let app = App::new(store)?;
//!     Server::bind("0.0.0.0:3000".parse().unwrap())
//!         .serve(app.router, app.controller)
//!         .await
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod controller;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod store;
pub mod validator;

pub use config::Config;
pub use controller::{ArticleController, ArticleFormData};
pub use error::{Error, RenderError, RouteError, StoreError};
pub use handler::Handler;
pub use method::Method;
pub use render::Renderer;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{ReverseUrl, Router};
pub use routes::App;
pub use server::Server;
pub use status::Status;
pub use store::{Article, ArticleStore, PoolSettings};
