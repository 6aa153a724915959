//! Lesson filter parsing and validation.
//!
//! Raw query-string parameters arrive as optional strings and are turned
//! into a typed [`LessonFilter`]. Every malformed value fails fast with a
//! validation error naming the offending parameter.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Page size applied when `lessonsPerPage` is not supplied.
pub const DEFAULT_LESSONS_PER_PAGE: u32 = 5;

/// Raw query-string parameters for the lessons endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonsQuery {
    /// Single day `YYYY-MM-DD` or inclusive range `YYYY-MM-DD,YYYY-MM-DD`.
    pub date: Option<String>,

    /// Lesson status, `"0"` or `"1"`.
    pub status: Option<String>,

    /// Comma-separated teacher ids.
    pub teacher_ids: Option<String>,

    /// Exact attendance count, or inclusive `min,max` range.
    pub students_count: Option<String>,

    /// 1-based page number.
    pub page: Option<String>,

    /// Page size.
    pub lessons_per_page: Option<String>,
}

/// Date constraint: a single day or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    On(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

/// Attendance-count constraint: an exact size or an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountFilter {
    Exactly(i64),
    Between(i64, i64),
}

/// Validated lesson query filter.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonFilter {
    pub date: Option<DateFilter>,
    pub status: Option<i16>,
    pub teacher_ids: Option<Vec<i32>>,
    pub students_count: Option<CountFilter>,
    pub page: u32,
    pub lessons_per_page: u32,
}

impl LessonsQuery {
    /// Validate raw parameters and convert them into a typed filter.
    pub fn parse(self) -> AppResult<LessonFilter> {
        let date = self.date.as_deref().map(parse_date_filter).transpose()?;
        let status = self.status.as_deref().map(parse_status).transpose()?;
        let teacher_ids = self
            .teacher_ids
            .as_deref()
            .map(parse_teacher_ids)
            .transpose()?;
        let students_count = self
            .students_count
            .as_deref()
            .map(parse_students_count)
            .transpose()?;
        let page = parse_page_param(self.page.as_deref(), "page", 1)?;
        let lessons_per_page = parse_page_param(
            self.lessons_per_page.as_deref(),
            "lessonsPerPage",
            DEFAULT_LESSONS_PER_PAGE,
        )?;

        Ok(LessonFilter {
            date,
            status,
            teacher_ids,
            students_count,
            page,
            lessons_per_page,
        })
    }
}

fn invalid_date() -> AppError {
    AppError::Validation("date must be YYYY-MM-DD or YYYY-MM-DD,YYYY-MM-DD".to_string())
}

/// Parse a `date` parameter: one day, or two comma-joined days.
fn parse_date_filter(raw: &str) -> AppResult<DateFilter> {
    let parts: Vec<&str> = raw.split(',').collect();
    match parts.as_slice() {
        [single] => Ok(DateFilter::On(parse_day(single)?)),
        [start, end] => Ok(DateFilter::Between(parse_day(start)?, parse_day(end)?)),
        _ => Err(invalid_date()),
    }
}

/// Parse one calendar day. chrono also rejects non-calendar dates like
/// `2019-02-30` that a pure shape check would let through.
fn parse_day(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| invalid_date())
}

fn parse_status(raw: &str) -> AppResult<i16> {
    match raw.trim() {
        "0" => Ok(0),
        "1" => Ok(1),
        _ => Err(AppError::Validation("status must be 0 or 1".to_string())),
    }
}

fn parse_teacher_ids(raw: &str) -> AppResult<Vec<i32>> {
    let invalid =
        || AppError::Validation("teacherIds must be comma-separated integers".to_string());

    raw.split(',')
        .map(|part| {
            let id: i32 = part.trim().parse().map_err(|_| invalid())?;
            if id < 0 {
                return Err(invalid());
            }
            Ok(id)
        })
        .collect()
}

fn parse_students_count(raw: &str) -> AppResult<CountFilter> {
    let invalid = || {
        AppError::Validation("studentsCount must be one or two comma-separated integers".to_string())
    };

    let mut values = Vec::new();
    for part in raw.split(',') {
        let n: i64 = part.trim().parse().map_err(|_| invalid())?;
        if n < 0 {
            return Err(invalid());
        }
        values.push(n);
    }

    match values.as_slice() {
        [exact] => Ok(CountFilter::Exactly(*exact)),
        [min, max] => Ok(CountFilter::Between(*min, *max)),
        _ => Err(invalid()),
    }
}

fn parse_page_param(raw: Option<&str>, name: &str, default: u32) -> AppResult<u32> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{name} must be a positive integer")))?;
    if value == 0 {
        return Err(AppError::Validation(format!(
            "{name} must be a positive integer"
        )));
    }

    Ok(value)
}
