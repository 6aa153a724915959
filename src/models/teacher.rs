//! Teacher assignment queries.

use anyhow::{Context, Result};
use sqlx::PgPool;

/// One teacher attached to one lesson, flattened from the join against
/// the `lesson_teachers` association table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct LessonTeacher {
    /// Lesson this teacher is assigned to.
    pub lesson_id: i32,

    /// Teacher id.
    pub id: i32,

    /// Teacher display name.
    pub name: String,
}

impl LessonTeacher {
    /// Resolve which lessons any of the given teachers are assigned to.
    ///
    /// Returns the distinct lesson ids in ascending order. An empty result
    /// means no lesson can match the teacher filter.
    pub async fn lesson_ids_for_teachers(
        pool: &PgPool,
        teacher_ids: &[i32],
    ) -> Result<Vec<i32>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT lesson_id
            FROM lesson_teachers
            WHERE teacher_id = ANY($1)
            ORDER BY lesson_id
            "#,
        )
        .bind(teacher_ids)
        .fetch_all(pool)
        .await
        .context("failed to resolve lessons for teachers")?;

        Ok(ids)
    }

    /// Batch-fetch the teachers for a set of lessons in one query.
    ///
    /// Rows come back ordered by (lesson_id, teacher id) so that grouping
    /// preserves a deterministic per-lesson order.
    pub async fn list_for_lessons(pool: &PgPool, lesson_ids: &[i32]) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, LessonTeacher>(
            r#"
            SELECT lt.lesson_id, t.id, t.name
            FROM lesson_teachers lt
            JOIN teachers t ON t.id = lt.teacher_id
            WHERE lt.lesson_id = ANY($1)
            ORDER BY lt.lesson_id, t.id
            "#,
        )
        .bind(lesson_ids)
        .fetch_all(pool)
        .await
        .context("failed to fetch teachers for lessons")?;

        Ok(rows)
    }
}
