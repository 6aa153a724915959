//! Student attendance queries.

use anyhow::{Context, Result};
use sqlx::PgPool;

/// One student signed up for one lesson, flattened from the join against
/// the `lesson_students` attendance table. `visit` records whether the
/// student actually attended.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LessonStudent {
    /// Lesson the student is signed up for.
    pub lesson_id: i32,

    /// Student id.
    pub id: i32,

    /// Student display name.
    pub name: String,

    /// Whether the student attended the lesson.
    pub visit: bool,
}

impl LessonStudent {
    /// Batch-fetch the students (with their visit flags) for a set of
    /// lessons in one query.
    ///
    /// Rows come back ordered by (lesson_id, student id) so that grouping
    /// preserves a deterministic per-lesson order.
    pub async fn list_for_lessons(pool: &PgPool, lesson_ids: &[i32]) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, LessonStudent>(
            r#"
            SELECT ls.lesson_id, s.id, s.name, ls.visit
            FROM lesson_students ls
            JOIN students s ON s.id = ls.student_id
            WHERE ls.lesson_id = ANY($1)
            ORDER BY ls.lesson_id, s.id
            "#,
        )
        .bind(lesson_ids)
        .fetch_all(pool)
        .await
        .context("failed to fetch students for lessons")?;

        Ok(rows)
    }
}
