//! Lesson query module.
//!
//! This module provides:
//! - LessonsQuery / LessonFilter: request parameter parsing and validation
//! - FilterClause / LessonQueryBuilder: SeaQuery-based SQL generation
//! - LessonService: executes the paginated lesson query pipeline

mod filter;
mod query;
mod service;

pub use filter::{
    CountFilter, DEFAULT_LESSONS_PER_PAGE, DateFilter, LessonFilter, LessonsQuery,
};
pub use query::{FilterClause, LessonQueryBuilder};
pub use service::{LessonService, LessonSummary, StudentEntry, TeacherEntry};
