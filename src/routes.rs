//! The route table and the object graph behind it.

use std::sync::Arc;

use crate::controller::ArticleController;
use crate::error::{Error, RouteError};
use crate::method::Method;
use crate::render::Renderer;
use crate::router::{ReverseUrl, Router};
use crate::store::ArticleStore;

/// Every endpoint the site answers, by name.
///
/// | Method | Path | Name |
/// |---|---|---|
/// | GET | `/` | `home` |
/// | GET | `/about` | `about` |
/// | GET | `/articles` | `articles.index` |
/// | GET | `/articles/create` | `articles.create` |
/// | POST | `/articles` | `articles.store` |
/// | GET | `/articles/{id}` | `articles.show` |
/// | GET | `/articles/{id}/edit` | `articles.edit` |
/// | POST | `/articles/{id}` | `articles.update` |
/// | POST | `/articles/{id}/delete` | `articles.delete` |
pub fn router() -> Result<Router<ArticleController>, RouteError> {
    Ok(Router::new()
        .try_route("home", Method::Get, "/", ArticleController::home)?
        .try_route("about", Method::Get, "/about", ArticleController::about)?
        .try_route("articles.index", Method::Get, "/articles", ArticleController::index)?
        .try_route("articles.create", Method::Get, "/articles/create", ArticleController::create_form)?
        .try_route("articles.store", Method::Post, "/articles", ArticleController::store)?
        .try_route("articles.show", Method::Get, "/articles/{id:[0-9]+}", ArticleController::show)?
        .try_route("articles.edit", Method::Get, "/articles/{id:[0-9]+}/edit", ArticleController::edit_form)?
        .try_route("articles.update", Method::Post, "/articles/{id:[0-9]+}", ArticleController::update)?
        .try_route("articles.delete", Method::Post, "/articles/{id:[0-9]+}/delete", ArticleController::delete)?
        .fallback(ArticleController::not_found))
}

/// The wired application: router plus the controller it dispatches to.
pub struct App {
    pub router: Arc<Router<ArticleController>>,
    pub controller: Arc<ArticleController>,
}

impl App {
    /// Builds the route table, then hands its reverse-URL side to the
    /// renderer and the controller.
    ///
    /// Fails with [`Error::Route`] on a bad route table and with
    /// [`Error::Template`] on a template that does not parse.
    pub fn new(store: ArticleStore) -> Result<Self, Error> {
        let router = Arc::new(router()?);
        let urls: Arc<dyn ReverseUrl> = Arc::clone(&router) as Arc<dyn ReverseUrl>;
        let renderer = Renderer::new(Arc::clone(&urls))?;
        let controller = Arc::new(ArticleController::new(store, renderer, urls));
        Ok(Self { router, controller })
    }
}
