//! Article persistence on SQLite.
//!
//! One statement per operation, every input bound as a parameter. Write
//! operations report what actually happened as a named outcome instead of a
//! bare row count, so "nothing inserted", "nothing changed" and "already
//! deleted" can never be confused with each other or with success.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use sqlx::FromRow;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::{RouteError, StoreError};
use crate::router::ReverseUrl;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS articles (
    id    INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    title TEXT NOT NULL,
    body  TEXT
)";

// ── Model ─────────────────────────────────────────────────────────────────────

/// One stored post. `id == 0` marks an instance that was never persisted.
#[derive(Clone, Debug, Default, FromRow, PartialEq, Eq, Serialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub body: String,
}

impl Article {
    /// URL of this article's detail page.
    pub fn link(&self, urls: &dyn ReverseUrl) -> Result<String, RouteError> {
        urls.reverse_url("articles.show", &[("id", &self.id.to_string())])
    }
}

/// Outcome of [`ArticleStore::create`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Created {
    Inserted(i64),
    /// The driver reported no error but no row either.
    NoRowInserted,
}

/// Outcome of [`ArticleStore::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Updated {
    Changed(u64),
    /// The submitted values equal the stored ones (or the row is gone).
    Unchanged,
}

/// Outcome of [`ArticleStore::delete`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deleted {
    Removed(u64),
    /// Another request removed the row first.
    AlreadyGone,
}

// ── Pool ──────────────────────────────────────────────────────────────────────

/// Connection pool limits.
#[derive(Clone, Debug)]
pub struct PoolSettings {
    pub max_open: u32,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Opens the pool. Idle connections are capped by `max_open`, closed after
/// `idle_timeout`, and every connection is replaced once it reaches
/// `max_lifetime`.
pub async fn connect(url: &str, settings: &PoolSettings) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_open)
        .idle_timeout(settings.idle_timeout)
        .max_lifetime(settings.max_lifetime)
        .connect(url)
        .await?;
    info!(
        max_open = settings.max_open,
        idle_timeout = ?settings.idle_timeout,
        max_lifetime = ?settings.max_lifetime,
        "database pool ready"
    );
    Ok(pool)
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// CRUD on the `articles` table. The only writer of `Article::id`.
#[derive(Clone)]
pub struct ArticleStore {
    pool: SqlitePool,
    deadline: Duration,
}

impl ArticleStore {
    /// Every statement must finish within `deadline`.
    pub fn new(pool: SqlitePool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    /// Creates the `articles` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        self.bounded(sqlx::query(CREATE_TABLE).execute(&self.pool)).await?;
        Ok(())
    }

    pub async fn create(&self, title: &str, body: &str) -> Result<Created, StoreError> {
        let done = self
            .bounded(
                sqlx::query("INSERT INTO articles (title, body) VALUES (?, ?)")
                    .bind(title)
                    .bind(body)
                    .execute(&self.pool),
            )
            .await?;
        let id = done.last_insert_rowid();
        if done.rows_affected() == 0 || id <= 0 {
            return Ok(Created::NoRowInserted);
        }
        debug!(id, "article inserted");
        Ok(Created::Inserted(id))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Article, StoreError> {
        self.bounded(
            sqlx::query_as::<_, Article>(
                "SELECT id, title, COALESCE(body, '') AS body FROM articles WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::NotFound)
    }

    /// Rewrites title and body. Rows whose values already match are not
    /// counted, so resubmitting the stored values yields `Unchanged`.
    pub async fn update(&self, id: i64, title: &str, body: &str) -> Result<Updated, StoreError> {
        let done = self
            .bounded(
                sqlx::query(
                    "UPDATE articles SET title = ?1, body = ?2
                     WHERE id = ?3 AND (title IS NOT ?1 OR body IS NOT ?2)",
                )
                .bind(title)
                .bind(body)
                .bind(id)
                .execute(&self.pool),
            )
            .await?;
        Ok(match done.rows_affected() {
            0 => Updated::Unchanged,
            n => Updated::Changed(n),
        })
    }

    pub async fn delete(&self, id: i64) -> Result<Deleted, StoreError> {
        let done = self
            .bounded(sqlx::query("DELETE FROM articles WHERE id = ?").bind(id).execute(&self.pool))
            .await?;
        Ok(match done.rows_affected() {
            0 => Deleted::AlreadyGone,
            n => Deleted::Removed(n),
        })
    }

    /// All articles, oldest first.
    pub async fn list_all(&self) -> Result<Vec<Article>, StoreError> {
        self.bounded(
            sqlx::query_as::<_, Article>(
                "SELECT id, title, COALESCE(body, '') AS body FROM articles ORDER BY id",
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.deadline, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout(self.deadline)),
        }
    }
}
