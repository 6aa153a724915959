//! Lesson page query builder using SeaQuery.
//!
//! Compiles a validated filter into one paginated SELECT over `lessons`.
//! The attendance-count constraint is expressed as a correlated scalar
//! subquery, so the page statement never joins the association tables and
//! LIMIT always counts whole lessons.

use chrono::NaiveDate;
use sea_query::{
    Asterisk, Expr, ExprTrait, Iden, Order, PostgresQueryBuilder, Query, SimpleExpr,
    SubQueryStatement,
};
use sea_query_binder::{SqlxBinder, SqlxValues};

use super::filter::{CountFilter, DateFilter, LessonFilter};

/// `lessons` table identifiers.
#[derive(Iden)]
enum Lessons {
    Table,
    Id,
    Date,
    Title,
    Status,
}

/// `lesson_students` table identifiers.
#[derive(Iden)]
enum LessonStudents {
    Table,
    LessonId,
}

/// One filter clause of the page query. Clauses are ANDed together.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    DateEquals(NaiveDate),
    DateBetween(NaiveDate, NaiveDate),
    StatusEquals(i16),
    LessonIdIn(Vec<i32>),
    AttendanceCountInRange(i64, i64),
}

impl FilterClause {
    /// Compile a validated filter into its clause list.
    ///
    /// `lesson_ids` carries the pre-resolved teacher membership
    /// restriction, if the request filtered by teachers. An exact
    /// attendance count becomes a degenerate range.
    pub fn compile(filter: &LessonFilter, lesson_ids: Option<Vec<i32>>) -> Vec<FilterClause> {
        let mut clauses = Vec::new();

        match filter.date {
            Some(DateFilter::On(day)) => clauses.push(FilterClause::DateEquals(day)),
            Some(DateFilter::Between(start, end)) => {
                clauses.push(FilterClause::DateBetween(start, end));
            }
            None => {}
        }

        if let Some(status) = filter.status {
            clauses.push(FilterClause::StatusEquals(status));
        }

        if let Some(ids) = lesson_ids {
            clauses.push(FilterClause::LessonIdIn(ids));
        }

        match filter.students_count {
            Some(CountFilter::Exactly(n)) => {
                clauses.push(FilterClause::AttendanceCountInRange(n, n));
            }
            Some(CountFilter::Between(min, max)) => {
                clauses.push(FilterClause::AttendanceCountInRange(min, max));
            }
            None => {}
        }

        clauses
    }

    /// Lower this clause to a SQL expression.
    fn to_expr(&self) -> SimpleExpr {
        match self {
            FilterClause::DateEquals(day) => Expr::col((Lessons::Table, Lessons::Date)).eq(*day),
            FilterClause::DateBetween(start, end) => {
                Expr::col((Lessons::Table, Lessons::Date)).between(*start, *end)
            }
            FilterClause::StatusEquals(status) => {
                Expr::col((Lessons::Table, Lessons::Status)).eq(*status)
            }
            FilterClause::LessonIdIn(ids) => {
                Expr::col((Lessons::Table, Lessons::Id)).is_in(ids.iter().copied())
            }
            FilterClause::AttendanceCountInRange(min, max) => {
                attendance_count_subquery().between(*min, *max)
            }
        }
    }
}

/// Correlated scalar subquery counting the attendance rows of the current
/// lesson row.
fn attendance_count_subquery() -> SimpleExpr {
    let sub = Query::select()
        .expr(Expr::col(Asterisk).count())
        .from(LessonStudents::Table)
        .and_where(
            Expr::col((LessonStudents::Table, LessonStudents::LessonId))
                .equals((Lessons::Table, Lessons::Id)),
        )
        .take();

    SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(sub)))
}

/// Query builder for the lessons page statement.
pub struct LessonQueryBuilder {
    clauses: Vec<FilterClause>,
}

impl LessonQueryBuilder {
    /// Create a builder over a compiled clause list.
    pub fn new(clauses: Vec<FilterClause>) -> Self {
        Self { clauses }
    }

    /// Build the page SELECT with pagination.
    ///
    /// Ordered by (id, date) ascending so pagination is deterministic and
    /// stable. Returns the SQL text and its bound values; no filter value
    /// is ever rendered into the statement itself.
    pub fn build(&self, page: u32, per_page: u32) -> (String, SqlxValues) {
        let mut query = Query::select();

        query
            .columns([
                (Lessons::Table, Lessons::Id),
                (Lessons::Table, Lessons::Date),
                (Lessons::Table, Lessons::Title),
                (Lessons::Table, Lessons::Status),
            ])
            .from(Lessons::Table);

        for clause in &self.clauses {
            query.and_where(clause.to_expr());
        }

        query.order_by((Lessons::Table, Lessons::Id), Order::Asc);
        query.order_by((Lessons::Table, Lessons::Date), Order::Asc);

        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        query.limit(u64::from(per_page));
        query.offset(offset);

        query.build_sqlx(PostgresQueryBuilder)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use sea_query::Value;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn base_filter() -> LessonFilter {
        LessonFilter {
            date: None,
            status: None,
            teacher_ids: None,
            students_count: None,
            page: 1,
            lessons_per_page: 5,
        }
    }

    #[test]
    fn unfiltered_query_selects_lesson_columns() {
        let (sql, values) = LessonQueryBuilder::new(Vec::new()).build(1, 5);

        assert!(sql.contains("FROM \"lessons\""));
        assert!(sql.contains("\"lessons\".\"id\""));
        assert!(sql.contains("\"lessons\".\"date\""));
        assert!(sql.contains("\"lessons\".\"title\""));
        assert!(sql.contains("\"lessons\".\"status\""));
        assert!(!sql.contains("WHERE"));
        // Only LIMIT and OFFSET are bound
        assert_eq!(values.0.0.len(), 2);
    }

    #[test]
    fn ordering_is_id_then_date_ascending() {
        let (sql, _) = LessonQueryBuilder::new(Vec::new()).build(1, 5);

        assert!(
            sql.contains("ORDER BY \"lessons\".\"id\" ASC, \"lessons\".\"date\" ASC"),
            "unexpected ordering: {sql}"
        );
    }

    #[test]
    fn pagination_is_bound_not_inlined() {
        let (sql, values) = LessonQueryBuilder::new(Vec::new()).build(3, 10);

        assert!(sql.contains("LIMIT $"), "limit should be a parameter: {sql}");
        assert!(sql.contains("OFFSET $"), "offset should be a parameter: {sql}");
        assert!(!sql.contains("LIMIT 10"), "limit must not be inlined: {sql}");

        // (page 3 - 1) * 10 = offset 20
        let bound: Vec<u64> = values
            .0
            .0
            .iter()
            .filter_map(|v| match v {
                Value::BigUnsigned(Some(n)) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(bound, vec![10, 20]);
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let (_, values) = LessonQueryBuilder::new(Vec::new()).build(u32::MAX, 1_000);

        let offset = u64::from(u32::MAX - 1) * 1_000;
        assert!(
            values
                .0
                .0
                .iter()
                .any(|v| matches!(v, Value::BigUnsigned(Some(n)) if *n == offset))
        );
    }

    #[test]
    fn date_equals_is_parameterized() {
        let clauses = vec![FilterClause::DateEquals(day("2019-09-01"))];
        let (sql, values) = LessonQueryBuilder::new(clauses).build(1, 5);

        assert!(sql.contains("\"lessons\".\"date\" = $1"), "{sql}");
        assert!(!sql.contains("2019"), "date value leaked into SQL: {sql}");
        assert_eq!(values.0.0.len(), 3);
    }

    #[test]
    fn date_between_is_parameterized() {
        let clauses = vec![FilterClause::DateBetween(
            day("2019-09-01"),
            day("2019-09-30"),
        )];
        let (sql, _) = LessonQueryBuilder::new(clauses).build(1, 5);

        assert!(
            sql.contains("\"lessons\".\"date\" BETWEEN $1 AND $2"),
            "{sql}"
        );
        assert!(!sql.contains("2019"), "date value leaked into SQL: {sql}");
    }

    #[test]
    fn status_clause_binds_value() {
        let clauses = vec![FilterClause::StatusEquals(1)];
        let (sql, values) = LessonQueryBuilder::new(clauses).build(1, 5);

        assert!(sql.contains("\"lessons\".\"status\" = $1"), "{sql}");
        assert!(
            values
                .0
                .0
                .iter()
                .any(|v| matches!(v, Value::SmallInt(Some(1))))
        );
    }

    #[test]
    fn lesson_id_restriction_uses_in_list() {
        let clauses = vec![FilterClause::LessonIdIn(vec![1, 3, 7])];
        let (sql, values) = LessonQueryBuilder::new(clauses).build(1, 5);

        assert!(
            sql.contains("\"lessons\".\"id\" IN ($1, $2, $3)"),
            "{sql}"
        );
        // Three ids plus LIMIT and OFFSET
        assert_eq!(values.0.0.len(), 5);
    }

    #[test]
    fn attendance_range_is_a_correlated_subquery() {
        let clauses = vec![FilterClause::AttendanceCountInRange(2, 5)];
        let (sql, _) = LessonQueryBuilder::new(clauses).build(1, 5);

        assert!(
            sql.contains("(SELECT COUNT(*) FROM \"lesson_students\""),
            "{sql}"
        );
        assert!(
            sql.contains("\"lesson_students\".\"lesson_id\" = \"lessons\".\"id\""),
            "{sql}"
        );
        assert!(sql.contains("BETWEEN $1 AND $2"), "{sql}");
    }

    #[test]
    fn page_query_never_joins() {
        let clauses = vec![
            FilterClause::DateBetween(day("2019-09-01"), day("2019-09-30")),
            FilterClause::StatusEquals(1),
            FilterClause::LessonIdIn(vec![1, 2, 3]),
            FilterClause::AttendanceCountInRange(0, 10),
        ];
        let (sql, _) = LessonQueryBuilder::new(clauses).build(2, 25);

        assert!(!sql.contains("JOIN"), "page query must not join: {sql}");
    }

    #[test]
    fn clauses_are_anded_in_order() {
        let clauses = vec![
            FilterClause::DateEquals(day("2019-09-01")),
            FilterClause::StatusEquals(0),
        ];
        let (sql, _) = LessonQueryBuilder::new(clauses).build(1, 5);

        let date_pos = sql.find("\"date\" = $1").unwrap();
        let status_pos = sql.find("\"status\" = $2").unwrap();
        assert!(date_pos < status_pos);
        assert!(sql.contains(" AND "), "{sql}");
    }

    #[test]
    fn compile_empty_filter_yields_no_clauses() {
        let clauses = FilterClause::compile(&base_filter(), None);
        assert!(clauses.is_empty());
    }

    #[test]
    fn compile_maps_every_filter_dimension() {
        let filter = LessonFilter {
            date: Some(DateFilter::Between(day("2019-09-01"), day("2019-09-30"))),
            status: Some(1),
            teacher_ids: Some(vec![1]),
            students_count: Some(CountFilter::Between(2, 5)),
            ..base_filter()
        };

        let clauses = FilterClause::compile(&filter, Some(vec![10, 11]));
        assert_eq!(
            clauses,
            vec![
                FilterClause::DateBetween(day("2019-09-01"), day("2019-09-30")),
                FilterClause::StatusEquals(1),
                FilterClause::LessonIdIn(vec![10, 11]),
                FilterClause::AttendanceCountInRange(2, 5),
            ]
        );
    }

    #[test]
    fn compile_exact_count_becomes_degenerate_range() {
        let filter = LessonFilter {
            students_count: Some(CountFilter::Exactly(4)),
            ..base_filter()
        };

        let clauses = FilterClause::compile(&filter, None);
        assert_eq!(clauses, vec![FilterClause::AttendanceCountInRange(4, 4)]);
    }

    #[test]
    fn compile_single_date_becomes_equals() {
        let filter = LessonFilter {
            date: Some(DateFilter::On(day("2019-09-01"))),
            ..base_filter()
        };

        let clauses = FilterClause::compile(&filter, None);
        assert_eq!(clauses, vec![FilterClause::DateEquals(day("2019-09-01"))]);
    }
}
