//! HTTP endpoints for the site and the article resource.
//!
//! Each endpoint is a straight line: read the request, validate, touch the
//! store, answer. This module is the only place where a store or render
//! failure turns into a status code, and nothing internal ever reaches the
//! client: a 500 always carries the same generic message.

use std::fmt::Display;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{RouteError, StoreError};
use crate::render::Renderer;
use crate::request::Request;
use crate::response::Response;
use crate::router::ReverseUrl;
use crate::status::Status;
use crate::store::{Article, ArticleStore, Created, Deleted, Updated};
use crate::validator::{FieldErrors, validate};

const ARTICLE_NOT_FOUND: &str = "article not found";
const INTERNAL_ERROR: &str = "internal server error";
const NO_CHANGES: &str = "no changes made";

const HOME_PAGE: &str = "<h1>Hello, welcome to inkpot!</h1>";
const ABOUT_PAGE: &str = "This blog keeps programming notes. For feedback or suggestions, \
    write to <a href=\"mailto:summer@example.com\">summer@example.com</a>";
const NOT_FOUND_PAGE: &str = "<h1>Page not found :(</h1><p>If this looks wrong, please contact us.</p>";

/// Early-exit result: the error side is already the response to send.
type Reply = Result<Response, Response>;

/// Submitted article fields. Absent or undecodable fields read as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ArticleForm {
    title: String,
    body: String,
}

/// What the create and edit templates render: the attempt, where to post it,
/// and what was wrong with it.
#[derive(Debug, Serialize)]
pub struct ArticleFormData {
    pub title: String,
    pub body: String,
    pub target_url: String,
    pub errors: FieldErrors,
}

#[derive(Serialize)]
struct IndexEntry {
    title: String,
    url: String,
}

#[derive(Serialize)]
struct IndexPage {
    articles: Vec<IndexEntry>,
}

/// Owns every collaborator an endpoint needs. Built once in `main`.
pub struct ArticleController {
    store: ArticleStore,
    renderer: Renderer,
    urls: Arc<dyn ReverseUrl>,
}

impl ArticleController {
    pub fn new(store: ArticleStore, renderer: Renderer, urls: Arc<dyn ReverseUrl>) -> Self {
        Self { store, renderer, urls }
    }

    // ── Static pages ──────────────────────────────────────────────────────────

    pub async fn home(self: Arc<Self>, _req: Request) -> Response {
        Response::html(HOME_PAGE)
    }

    pub async fn about(self: Arc<Self>, _req: Request) -> Response {
        Response::html(ABOUT_PAGE)
    }

    pub async fn not_found(self: Arc<Self>, req: Request) -> Response {
        debug!(method = ?req.method(), path = req.path(), "no route");
        Response::builder().status(Status::NotFound).html(NOT_FOUND_PAGE)
    }

    // ── Articles ──────────────────────────────────────────────────────────────

    /// `GET /articles`
    pub async fn index(self: Arc<Self>, _req: Request) -> Reply {
        let articles = self
            .store
            .list_all()
            .await
            .map_err(server_error)?
            .into_iter()
            .map(|article| -> Result<IndexEntry, RouteError> {
                let url = article.link(self.urls.as_ref())?;
                Ok(IndexEntry { title: article.title, url })
            })
            .collect::<Result<Vec<_>, RouteError>>()
            .map_err(server_error)?;
        self.page("articles/index.html", &IndexPage { articles })
    }

    /// `GET /articles/{id}`
    pub async fn show(self: Arc<Self>, req: Request) -> Reply {
        let article = self.find(&req).await?;
        self.page("articles/show.html", &article)
    }

    /// `GET /articles/create`
    pub async fn create_form(self: Arc<Self>, _req: Request) -> Reply {
        let data = ArticleFormData {
            title: String::new(),
            body: String::new(),
            target_url: self.url("articles.store", &[])?,
            errors: FieldErrors::new(),
        };
        self.page("articles/create.html", &data)
    }

    /// `POST /articles`
    pub async fn store(self: Arc<Self>, req: Request) -> Reply {
        let form = read_form(&req);
        let errors = validate(&form.title, &form.body);
        if !errors.is_empty() {
            let data = ArticleFormData {
                title: form.title,
                body: form.body,
                target_url: self.url("articles.store", &[])?,
                errors,
            };
            return self.page("articles/create.html", &data);
        }

        match self.store.create(&form.title, &form.body).await {
            Ok(Created::Inserted(id)) => {
                info!(id, "article created");
                Ok(Response::html(format!("article created, id {id}")))
            }
            Ok(Created::NoRowInserted) => Err(server_error("insert reported no row")),
            Err(e) => Err(server_error(e)),
        }
    }

    /// `GET /articles/{id}/edit`
    pub async fn edit_form(self: Arc<Self>, req: Request) -> Reply {
        let article = self.find(&req).await?;
        let data = ArticleFormData {
            target_url: self.url("articles.update", &[("id", &article.id.to_string())])?,
            title: article.title,
            body: article.body,
            errors: FieldErrors::new(),
        };
        self.page("articles/edit.html", &data)
    }

    /// `POST /articles/{id}`
    pub async fn update(self: Arc<Self>, req: Request) -> Reply {
        let article = self.find(&req).await?;
        let form = read_form(&req);
        let errors = validate(&form.title, &form.body);
        if !errors.is_empty() {
            let data = ArticleFormData {
                title: form.title,
                body: form.body,
                target_url: self.url("articles.update", &[("id", &article.id.to_string())])?,
                errors,
            };
            return self.page("articles/edit.html", &data);
        }

        match self.store.update(article.id, &form.title, &form.body).await {
            Ok(Updated::Changed(_)) => {
                info!(id = article.id, "article updated");
                let link = article.link(self.urls.as_ref()).map_err(server_error)?;
                Ok(Response::redirect(&link))
            }
            Ok(Updated::Unchanged) => Ok(Response::html(NO_CHANGES)),
            Err(e) => Err(server_error(e)),
        }
    }

    /// `POST /articles/{id}/delete`
    pub async fn delete(self: Arc<Self>, req: Request) -> Reply {
        let article = self.find(&req).await?;
        match self.store.delete(article.id).await {
            Ok(Deleted::Removed(_)) => {
                info!(id = article.id, "article deleted");
                Ok(Response::redirect(&self.url("articles.index", &[])?))
            }
            Ok(Deleted::AlreadyGone) => {
                warn!(id = article.id, "article vanished before delete");
                Err(article_not_found())
            }
            Err(e) => Err(server_error(e)),
        }
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    /// Loads the article named by the `id` path parameter.
    async fn find(&self, req: &Request) -> Result<Article, Response> {
        // The route only admits digits, but a value past i64::MAX still fails here.
        let id: i64 = req
            .param("id")
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(article_not_found)?;
        self.store.get_by_id(id).await.map_err(|e| match e {
            StoreError::NotFound => article_not_found(),
            other => server_error(other),
        })
    }

    fn page<T: Serialize>(&self, template: &str, data: &T) -> Reply {
        self.renderer
            .render(template, data)
            .map(Response::html)
            .map_err(server_error)
    }

    fn url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, Response> {
        self.urls.reverse_url(name, params).map_err(server_error)
    }
}

fn read_form(req: &Request) -> ArticleForm {
    req.form().unwrap_or_else(|e| {
        debug!(error = %e, "undecodable form body");
        ArticleForm::default()
    })
}

fn article_not_found() -> Response {
    Response::builder().status(Status::NotFound).html(ARTICLE_NOT_FOUND)
}

fn server_error(cause: impl Display) -> Response {
    error!(error = %cause, "request failed");
    Response::builder().status(Status::InternalServerError).html(INTERNAL_ERROR)
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use bytes::Bytes;
    use rstest::rstest;

    use super::*;
    use crate::method::Method;
    use crate::response::HTML;
    use crate::routes::App;
    use crate::server::respond;
    use crate::store::tests::{break_table, memory_store, stalled_store};

    async fn app() -> App {
        App::new(memory_store().await).unwrap()
    }

    async fn send(app: &App, method: impl Into<Option<Method>>, path: &str, form: &str) -> Response {
        let req = Request::new(method, path.to_owned(), Bytes::from(form.to_owned()));
        respond(&app.router, Arc::clone(&app.controller), req, Instant::now()).await
    }

    async fn seed(app: &App, title: &str, body: &str) -> i64 {
        match app.controller.store.create(title, body).await.unwrap() {
            Created::Inserted(id) => id,
            Created::NoRowInserted => panic!("seed insert failed"),
        }
    }

    fn text(res: &Response) -> String {
        String::from_utf8_lossy(res.body()).into_owned()
    }

    #[rstest]
    #[case("/", "welcome to inkpot")]
    #[case("/about", "mailto:")]
    #[case("/about/", "mailto:")]
    #[tokio::test]
    async fn static_pages(#[case] path: &str, #[case] needle: &str) {
        let app = app().await;
        let res = send(&app, Method::Get, path, "").await;
        assert_eq!(res.status_code(), Status::Ok);
        assert!(text(&res).contains(needle));
        assert_eq!(res.header("content-type"), Some(HTML));
    }

    #[rstest]
    #[case(Method::Get, "/missing")]
    #[case(Method::Get, "/articles/abc")]
    #[case(Method::Post, "/articles/create")]
    #[case(Method::Delete, "/articles/1")]
    #[tokio::test]
    async fn unmatched_requests_get_the_not_found_page(#[case] method: Method, #[case] path: &str) {
        let app = app().await;
        let res = send(&app, method, path, "").await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(text(&res), NOT_FOUND_PAGE);
        assert_eq!(res.header("content-type"), Some(HTML));
    }

    #[tokio::test]
    async fn methods_outside_rfc_9110_get_the_not_found_page() {
        let app = app().await;
        let res = send(&app, None::<Method>, "/articles", "").await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(text(&res), NOT_FOUND_PAGE);
        assert_eq!(res.header("content-type"), Some(HTML));
    }

    #[tokio::test]
    async fn store_rerenders_form_on_short_title() {
        let app = app().await;
        let res = send(&app, Method::Post, "/articles", "title=Hi&body=1234567890").await;

        assert_eq!(res.status_code(), Status::Ok);
        let page = text(&res);
        assert!(page.contains("title length must be between 3 and 40"));
        assert!(page.contains(r#"value="Hi""#));
        assert!(page.contains(r#"action="/articles""#));
        assert!(!page.contains("body length"));
        assert!(app.controller.store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_reports_both_field_errors() {
        let app = app().await;
        let res = send(&app, Method::Post, "/articles", "").await;
        let page = text(&res);
        assert!(page.contains("title required"));
        assert!(page.contains("body required"));
    }

    #[tokio::test]
    async fn store_persists_valid_article_and_reports_id() {
        let app = app().await;
        let res = send(&app, Method::Post, "/articles", "title=Hello+World&body=0123456789").await;

        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(text(&res), "article created, id 1");
        let stored = app.controller.store.get_by_id(1).await.unwrap();
        assert_eq!(stored.title, "Hello World");
        assert_eq!(stored.body, "0123456789");
    }

    #[tokio::test]
    async fn show_unknown_id_is_404() {
        let app = app().await;
        let res = send(&app, Method::Get, "/articles/999999", "").await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(text(&res), ARTICLE_NOT_FOUND);
    }

    #[tokio::test]
    async fn show_id_past_i64_is_404() {
        let app = app().await;
        let res = send(&app, Method::Get, "/articles/99999999999999999999", "").await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(text(&res), ARTICLE_NOT_FOUND);
    }

    #[tokio::test]
    async fn show_renders_article_with_links() {
        let app = app().await;
        let id = seed(&app, "Rust <notes>", "ownership and borrowing").await;
        let res = send(&app, Method::Get, &format!("/articles/{id}/"), "").await;

        assert_eq!(res.status_code(), Status::Ok);
        let page = text(&res);
        assert!(page.contains("Rust &lt;notes&gt;"));
        assert!(page.contains("ownership and borrowing"));
        assert!(page.contains(&format!(r#"href="/articles/{id}/edit""#)));
        assert!(page.contains(&format!(r#"action="/articles/{id}/delete""#)));
    }

    #[tokio::test]
    async fn index_lists_articles_or_nothing() {
        let app = app().await;
        let empty = send(&app, Method::Get, "/articles", "").await;
        assert_eq!(empty.status_code(), Status::Ok);
        assert!(!text(&empty).contains("<li>"));

        let first = seed(&app, "First post", "0123456789").await;
        let second = seed(&app, "Second post", "0123456789").await;
        let page = text(&send(&app, Method::Get, "/articles", "").await);
        assert!(page.contains(&format!(r#"href="/articles/{first}""#)));
        assert!(page.contains(&format!(r#"href="/articles/{second}""#)));
        assert!(page.find("First post") < page.find("Second post"));
    }

    #[tokio::test]
    async fn create_form_posts_to_store_route() {
        let app = app().await;
        let res = send(&app, Method::Get, "/articles/create", "").await;
        assert_eq!(res.status_code(), Status::Ok);
        let page = text(&res);
        assert!(page.contains(r#"action="/articles""#));
        assert!(!page.contains(r#"class="error""#));
    }

    #[tokio::test]
    async fn edit_form_prefills_current_values() {
        let app = app().await;
        let id = seed(&app, "Draft", "first version of the text").await;
        let res = send(&app, Method::Get, &format!("/articles/{id}/edit"), "").await;

        assert_eq!(res.status_code(), Status::Ok);
        let page = text(&res);
        assert!(page.contains(r#"value="Draft""#));
        assert!(page.contains("first version of the text"));
        assert!(page.contains(&format!(r#"action="/articles/{id}""#)));
    }

    #[tokio::test]
    async fn update_with_identical_values_makes_no_changes() {
        let app = app().await;
        let id = seed(&app, "Same title", "same body text").await;
        let res = send(&app, Method::Post, &format!("/articles/{id}"), "title=Same+title&body=same+body+text").await;

        assert_eq!(res.status_code(), Status::Ok);
        assert_eq!(text(&res), NO_CHANGES);
        assert_eq!(res.header("location"), None);
    }

    #[tokio::test]
    async fn update_redirects_to_show_page() {
        let app = app().await;
        let id = seed(&app, "Old title", "old body text").await;
        let res = send(&app, Method::Post, &format!("/articles/{id}"), "title=New+title&body=new+body+text").await;

        assert_eq!(res.status_code(), Status::Found);
        assert_eq!(res.header("location"), Some(format!("/articles/{id}").as_str()));
        assert_eq!(res.header("content-type"), Some(HTML));
        let stored = app.controller.store.get_by_id(id).await.unwrap();
        assert_eq!((stored.title.as_str(), stored.body.as_str()), ("New title", "new body text"));
    }

    #[tokio::test]
    async fn update_rerenders_edit_form_on_invalid_input() {
        let app = app().await;
        let id = seed(&app, "Keep me", "untouched body").await;
        let res = send(&app, Method::Post, &format!("/articles/{id}"), "title=Keep+me&body=short").await;

        assert_eq!(res.status_code(), Status::Ok);
        let page = text(&res);
        assert!(page.contains("body length must be at least 10"));
        assert!(page.contains(&format!(r#"action="/articles/{id}""#)));
        assert_eq!(app.controller.store.get_by_id(id).await.unwrap().body, "untouched body");
    }

    #[tokio::test]
    async fn update_unknown_article_is_404() {
        let app = app().await;
        let res = send(&app, Method::Post, "/articles/42", "title=Whatever&body=0123456789").await;
        assert_eq!(res.status_code(), Status::NotFound);
        assert_eq!(text(&res), ARTICLE_NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_redirects_then_404s() {
        let app = app().await;
        let id = seed(&app, "Short lived", "0123456789").await;
        let path = format!("/articles/{id}/delete");

        let first = send(&app, Method::Post, &path, "").await;
        assert_eq!(first.status_code(), Status::Found);
        assert_eq!(first.header("location"), Some("/articles"));

        let second = send(&app, Method::Post, &path, "").await;
        assert_eq!(second.status_code(), Status::NotFound);
        assert_eq!(text(&second), ARTICLE_NOT_FOUND);
    }

    #[rstest]
    #[case(Method::Get, "/articles", "")]
    #[case(Method::Get, "/articles/1", "")]
    #[case(Method::Get, "/articles/1/edit", "")]
    #[case(Method::Post, "/articles", "title=Hello+World&body=0123456789")]
    #[case(Method::Post, "/articles/1", "title=Hello+World&body=0123456789")]
    #[case(Method::Post, "/articles/1/delete", "")]
    #[tokio::test]
    async fn database_failures_are_500_without_detail(
        #[case] method: Method,
        #[case] path: &str,
        #[case] form: &str,
    ) {
        let app = app().await;
        break_table(&app.controller.store).await;
        let res = send(&app, method, path, form).await;

        assert_eq!(res.status_code(), Status::InternalServerError);
        assert_eq!(text(&res), INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn database_deadline_is_500_without_detail() {
        let (store, _held) = stalled_store().await;
        let app = App::new(store).unwrap();
        let res = send(&app, Method::Get, "/articles/1", "").await;

        assert_eq!(res.status_code(), Status::InternalServerError);
        assert_eq!(text(&res), INTERNAL_ERROR);
    }
}
