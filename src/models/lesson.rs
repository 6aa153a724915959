//! Lesson model.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_query_binder::SqlxValues;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Lesson record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lesson {
    /// Unique identifier.
    pub id: i32,

    /// Calendar day the lesson takes place, no time component.
    pub date: NaiveDate,

    /// Lesson title.
    pub title: String,

    /// Status flag (0 or 1).
    pub status: i16,
}

impl Lesson {
    /// Fetch one page of lessons using a statement rendered by the query
    /// builder. All filter values travel as bound parameters.
    pub async fn find_page(pool: &PgPool, sql: &str, values: SqlxValues) -> Result<Vec<Self>> {
        let lessons = sqlx::query_as_with::<_, Lesson, _>(sql, values)
            .fetch_all(pool)
            .await
            .context("failed to fetch lessons page")?;

        Ok(lessons)
    }
}
