use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use crate::buckets::bucket_scores;
use crate::filter::FilterCriteria;
use crate::models::{BucketCount, LeaderboardRow, RankedRow, StudentRecord};
use crate::score::{self, Metric};

/// Appends the structured filters in fixed order: department, starting year,
/// ending year. Every value goes through `push_bind`; filter text never lands
/// in the SQL itself.
fn push_structured_filters(builder: &mut QueryBuilder<'static, Postgres>, criteria: &FilterCriteria) {
    if let Some(department) = &criteria.department {
        builder.push(" AND department = ").push_bind(department.clone());
    }
    if let Some(year) = criteria.starting_year {
        builder.push(" AND starting_year = ").push_bind(year);
    }
    if let Some(year) = criteria.ending_year {
        builder.push(" AND ending_year = ").push_bind(year);
    }
}

/// Appends the free-text filter: case-insensitive substring match on the
/// student name or the external LeetCode id.
fn push_search_filter(builder: &mut QueryBuilder<'static, Postgres>, criteria: &FilterCriteria) {
    if let Some(term) = &criteria.search {
        let pattern = format!("%{}%", term.to_lowercase());
        builder
            .push(" AND (LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(lc_id) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Ranking over a stored score column. `column` is one of the crate's own
/// column names, never user input. Null scores sort last in both directions;
/// ties break on ascending roll number.
fn ranking_query(criteria: &FilterCriteria, column: &str) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT name, rno, {column}::float8 AS score FROM students WHERE 1=1"
    ));
    push_structured_filters(&mut builder, criteria);
    push_search_filter(&mut builder, criteria);
    builder.push(format!(
        " ORDER BY {column} {} NULLS LAST, rno ASC",
        criteria.sort.sql()
    ));
    builder
}

fn leaderboard_query(criteria: &FilterCriteria) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT name, lc_id, lc FROM students WHERE 1=1");
    push_structured_filters(&mut builder, criteria);
    push_search_filter(&mut builder, criteria);
    builder.push(format!(" ORDER BY lc {} NULLS LAST, rno ASC", criteria.sort.sql()));
    builder
}

/// Non-null scores for the distribution. Only the structured filters apply
/// here: a search term narrows the table view, never the chart.
fn scores_query(criteria: &FilterCriteria, column: &str) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {column}::float8 AS score FROM students WHERE {column} IS NOT NULL"
    ));
    push_structured_filters(&mut builder, criteria);
    builder
}

fn students_query(criteria: &FilterCriteria) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(
        "SELECT rno, name, department, starting_year, ending_year, cgpa, lc, lc_id \
         FROM students WHERE 1=1",
    );
    push_structured_filters(&mut builder, criteria);
    push_search_filter(&mut builder, criteria);
    builder.push(" ORDER BY rno ASC");
    builder
}

fn stored_column(metric: Metric) -> Option<&'static str> {
    match metric {
        Metric::Cgpa => Some("cgpa"),
        Metric::Leetcode => Some("lc"),
        Metric::Overall => None,
    }
}

pub async fn fetch_ranking(
    pool: &PgPool,
    criteria: &FilterCriteria,
    metric: Metric,
) -> Result<Vec<RankedRow>, sqlx::Error> {
    let Some(column) = stored_column(metric) else {
        // The overall score is derived, not stored, so it ranks in process.
        let students = fetch_students(pool, criteria).await?;
        return Ok(score::rank_overall(&students, criteria.sort));
    };

    let mut builder = ranking_query(criteria, column);
    let rows = builder.build().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| RankedRow {
            name: row.get("name"),
            rno: row.get("rno"),
            score: row.get("score"),
        })
        .collect())
}

pub async fn fetch_leaderboard(
    pool: &PgPool,
    criteria: &FilterCriteria,
) -> Result<Vec<LeaderboardRow>, sqlx::Error> {
    let mut builder = leaderboard_query(criteria);
    let rows = builder.build().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| LeaderboardRow {
            name: row.get("name"),
            lc_id: row.get("lc_id"),
            lc: row.get("lc"),
        })
        .collect())
}

/// Bucket counts for the requested metric under the structured filters.
/// Every configured bucket comes back, zero counts included.
pub async fn fetch_score_distribution(
    pool: &PgPool,
    criteria: &FilterCriteria,
    metric: Metric,
) -> Result<Vec<BucketCount>, sqlx::Error> {
    let scores: Vec<f64> = match stored_column(metric) {
        Some(column) => {
            let mut builder = scores_query(criteria, column);
            let rows = builder.build().fetch_all(pool).await?;
            rows.into_iter().map(|row| row.get("score")).collect()
        }
        None => {
            let students = fetch_students(pool, &criteria.structured_only()).await?;
            students
                .iter()
                .map(|s| score::overall_score(s.cgpa, s.lc))
                .collect()
        }
    };

    Ok(bucket_scores(&scores, metric.buckets()))
}

pub async fn fetch_students(
    pool: &PgPool,
    criteria: &FilterCriteria,
) -> Result<Vec<StudentRecord>, sqlx::Error> {
    let mut builder = students_query(criteria);
    let rows = builder.build().fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| StudentRecord {
            rno: row.get("rno"),
            name: row.get("name"),
            department: row.get("department"),
            starting_year: row.get("starting_year"),
            ending_year: row.get("ending_year"),
            cgpa: row.get("cgpa"),
            lc: row.get("lc"),
            lc_id: row.get("lc_id"),
        })
        .collect())
}

pub async fn fetch_departments(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT department FROM students ORDER BY department")
        .fetch_all(pool)
        .await
}

/// Batches are graduation (ending) years, newest first.
pub async fn fetch_batches(pool: &PgPool) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT ending_year FROM students ORDER BY ending_year DESC")
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortOrder;

    fn criteria(
        department: Option<&str>,
        starting_year: Option<i32>,
        ending_year: Option<i32>,
        sort: SortOrder,
        search: Option<&str>,
    ) -> FilterCriteria {
        FilterCriteria::new(
            department.map(str::to_string),
            starting_year,
            ending_year,
            sort,
            search.map(str::to_string),
        )
    }

    #[test]
    fn unfiltered_ranking_has_no_predicates() {
        let sql = ranking_query(&criteria(None, None, None, SortOrder::Desc, None), "cgpa")
            .into_sql();
        assert!(!sql.contains("AND"));
        assert!(sql.ends_with("ORDER BY cgpa DESC NULLS LAST, rno ASC"));
    }

    #[test]
    fn predicates_compose_in_fixed_order_with_placeholders() {
        let sql = ranking_query(
            &criteria(Some("CSE"), Some(2022), Some(2026), SortOrder::Desc, Some("an")),
            "cgpa",
        )
        .into_sql();

        let department = sql.find("department = $1").expect("department clause");
        let starting = sql.find("starting_year = $2").expect("starting_year clause");
        let ending = sql.find("ending_year = $3").expect("ending_year clause");
        let search = sql
            .find("(LOWER(name) LIKE $4 OR LOWER(lc_id) LIKE $5)")
            .expect("search clause");
        assert!(department < starting && starting < ending && ending < search);
    }

    #[test]
    fn ascending_sort_keeps_nulls_last() {
        let sql = ranking_query(&criteria(None, None, None, SortOrder::Asc, None), "cgpa")
            .into_sql();
        assert!(sql.contains("ORDER BY cgpa ASC NULLS LAST"));
    }

    #[test]
    fn filter_values_never_reach_the_sql_text() {
        let hostile = "' OR '1'='1";
        let sql = ranking_query(
            &criteria(Some(hostile), None, None, SortOrder::Desc, Some(hostile)),
            "cgpa",
        )
        .into_sql();
        assert!(!sql.contains(hostile));
        assert!(sql.contains("department = $1"));
    }

    #[test]
    fn sentinel_department_builds_the_same_sql_as_no_department() {
        let with_sentinel =
            ranking_query(&criteria(Some("All"), None, None, SortOrder::Desc, None), "cgpa")
                .into_sql();
        let without =
            ranking_query(&criteria(None, None, None, SortOrder::Desc, None), "cgpa").into_sql();
        assert_eq!(with_sentinel, without);
    }

    #[test]
    fn distribution_query_ignores_search_and_drops_nulls() {
        let sql = scores_query(
            &criteria(Some("IT"), None, Some(2025), SortOrder::Desc, Some("rahul")),
            "cgpa",
        )
        .into_sql();
        assert!(sql.contains("cgpa IS NOT NULL"));
        assert!(sql.contains("department = $1"));
        assert!(sql.contains("ending_year = $2"));
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn leaderboard_searches_name_and_lc_id() {
        let sql =
            leaderboard_query(&criteria(None, None, Some(2025), SortOrder::Asc, Some("Rahul")))
                .into_sql();
        assert!(sql.contains("ending_year = $1"));
        assert!(sql.contains("(LOWER(name) LIKE $2 OR LOWER(lc_id) LIKE $3)"));
        assert!(sql.contains("ORDER BY lc ASC NULLS LAST, rno ASC"));
    }
}
