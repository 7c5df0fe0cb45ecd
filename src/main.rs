//! inkpot server entry point.
//!
//! ```text
//! RUST_LOG=debug inkpot --listen 127.0.0.1:3000 --database-url sqlite://blog.db?mode=rwc
//! ```

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inkpot::{App, ArticleStore, Config, Error, ReverseUrl, Server, store};

#[tokio::main]
async fn main() -> Result<(), Error> {
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = Config::parse();

    let pool = store::connect(&config.database_url, &config.pool_settings()).await?;
    let articles = ArticleStore::new(pool, config.db_timeout());
    articles.migrate().await?;

    let app = App::new(articles)?;

    for (name, params) in [("home", &[][..]), ("articles.show", &[("id", "23")][..])] {
        match app.router.reverse_url(name, params) {
            Ok(url) => info!(route = name, %url, "named route"),
            Err(e) => warn!(route = name, error = %e, "named route"),
        }
    }

    Server::bind(config.listen)
        .serve(app.router, app.controller)
        .await
}
