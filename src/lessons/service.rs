//! Lesson query service.
//!
//! Runs the whole request pipeline for one lessons query: resolve the
//! teacher filter, execute the paginated page query, batch-fetch the
//! related teachers and students, and assemble the enriched response
//! records. The store work runs under a single deadline.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Lesson, LessonStudent, LessonTeacher};

use super::filter::LessonFilter;
use super::query::{FilterClause, LessonQueryBuilder};

/// Teacher entry nested in a lesson summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeacherEntry {
    pub id: i32,
    pub name: String,
}

/// Student entry nested in a lesson summary, carrying the visit flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentEntry {
    pub id: i32,
    pub name: String,
    pub visit: bool,
}

/// One lesson enriched with its teachers, students, and attendance count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonSummary {
    pub id: i32,
    pub date: NaiveDate,
    pub title: String,
    pub status: i16,
    /// Number of students who actually attended.
    pub visit_count: i64,
    pub students: Vec<StudentEntry>,
    pub teachers: Vec<TeacherEntry>,
}

impl LessonSummary {
    /// Group the related rows by lesson and produce the response records,
    /// preserving the page's lesson order.
    ///
    /// Lessons without teachers or students get empty arrays; the visit
    /// count is the number of attendance rows with `visit = true`.
    pub fn assemble(
        lessons: Vec<Lesson>,
        teachers: Vec<LessonTeacher>,
        students: Vec<LessonStudent>,
    ) -> Vec<LessonSummary> {
        let mut teachers_by_lesson: HashMap<i32, Vec<TeacherEntry>> = HashMap::new();
        for row in teachers {
            teachers_by_lesson
                .entry(row.lesson_id)
                .or_default()
                .push(TeacherEntry {
                    id: row.id,
                    name: row.name,
                });
        }

        let mut students_by_lesson: HashMap<i32, Vec<StudentEntry>> = HashMap::new();
        for row in students {
            students_by_lesson
                .entry(row.lesson_id)
                .or_default()
                .push(StudentEntry {
                    id: row.id,
                    name: row.name,
                    visit: row.visit,
                });
        }

        lessons
            .into_iter()
            .map(|lesson| {
                let teachers = teachers_by_lesson.remove(&lesson.id).unwrap_or_default();
                let students = students_by_lesson.remove(&lesson.id).unwrap_or_default();
                let visit_count = students.iter().filter(|s| s.visit).count() as i64;

                LessonSummary {
                    id: lesson.id,
                    date: lesson.date,
                    title: lesson.title,
                    status: lesson.status,
                    visit_count,
                    students,
                    teachers,
                }
            })
            .collect()
    }
}

/// Service executing lesson queries against the store.
pub struct LessonService {
    pool: PgPool,
    query_timeout: Duration,
}

impl LessonService {
    /// Create a new lesson service over a connection pool.
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Run one lessons query under the store deadline.
    ///
    /// Returns at most one page of lessons, each enriched with teachers,
    /// students, and its visit count. A deadline overrun surfaces as a
    /// store error, not a partial result.
    pub async fn find_lessons(&self, filter: &LessonFilter) -> AppResult<Vec<LessonSummary>> {
        match timeout(self.query_timeout, self.run_pipeline(filter)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Deadline),
        }
    }

    async fn run_pipeline(&self, filter: &LessonFilter) -> AppResult<Vec<LessonSummary>> {
        // The teacher filter resolves to lesson ids up front. No matching
        // assignment means no lesson can satisfy the query.
        let lesson_ids = match &filter.teacher_ids {
            Some(teacher_ids) => {
                let ids =
                    LessonTeacher::lesson_ids_for_teachers(&self.pool, teacher_ids).await?;
                if ids.is_empty() {
                    debug!(
                        teacher_ids = ?teacher_ids,
                        "no lessons match the teacher filter"
                    );
                    return Ok(Vec::new());
                }
                Some(ids)
            }
            None => None,
        };

        let clauses = FilterClause::compile(filter, lesson_ids);
        let (sql, values) =
            LessonQueryBuilder::new(clauses).build(filter.page, filter.lessons_per_page);
        debug!(
            page = filter.page,
            per_page = filter.lessons_per_page,
            "executing lessons page query"
        );

        let lessons = Lesson::find_page(&self.pool, &sql, values).await?;
        if lessons.is_empty() {
            return Ok(Vec::new());
        }

        let page_ids: Vec<i32> = lessons.iter().map(|l| l.id).collect();

        // The two related fetches are independent; run them concurrently.
        let (teachers, students) = tokio::try_join!(
            LessonTeacher::list_for_lessons(&self.pool, &page_ids),
            LessonStudent::list_for_lessons(&self.pool, &page_ids),
        )?;

        debug!(
            lessons = page_ids.len(),
            teachers = teachers.len(),
            students = students.len(),
            "assembling lesson summaries"
        );

        Ok(LessonSummary::assemble(lessons, teachers, students))
    }
}
