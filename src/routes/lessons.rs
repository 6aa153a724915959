//! Lessons query API route.
//!
//! REST endpoint for the filtered, paginated lessons listing.

use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use axum::Router;

use crate::error::AppResult;
use crate::lessons::{LessonSummary, LessonsQuery};
use crate::state::AppState;

/// Create the lessons router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/lessons", get(list_lessons))
}

/// GET /api/lessons — filtered, paginated lessons with related data.
///
/// All filter parameters are optional; an unfiltered request returns the
/// first page with the default page size.
async fn list_lessons(
    State(state): State<AppState>,
    Query(params): Query<LessonsQuery>,
) -> AppResult<Json<Vec<LessonSummary>>> {
    let filter = params.parse()?;
    let lessons = state.lessons().find_lessons(&filter).await?;

    Ok(Json(lessons))
}
