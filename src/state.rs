//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::config::Config;
use crate::db;
use crate::lessons::LessonService;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Lesson query service.
    lessons: LessonService,
}

impl AppState {
    /// Create new application state with a database connection.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        db::run_migrations(&db)
            .await
            .context("failed to run migrations")?;

        Ok(Self::from_pool(db, config.query_timeout))
    }

    /// Build state around an existing pool.
    ///
    /// Used by tests that bring their own pool and skip migrations.
    pub fn from_pool(db: PgPool, query_timeout: std::time::Duration) -> Self {
        let lessons = LessonService::new(db.clone(), query_timeout);

        Self {
            inner: Arc::new(AppStateInner { db, lessons }),
        }
    }

    /// Get the database pool.
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get the lesson query service.
    pub fn lessons(&self) -> &LessonService {
        &self.inner.lessons
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }
}
