use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid {field} value {value:?}: expected an integer year")]
    InvalidYear { field: &'static str, value: String },
}

/// Ranking direction. Anything other than a case-insensitive `asc`/`desc`
/// falls back to descending, matching the dashboard's default view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(text) if text.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    /// SQL direction keyword. A closed enum, never user text.
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Normalized filter set shared by the ranking, leaderboard, and distribution
/// queries. Absent fields mean "no filter"; the `All` department sentinel and
/// empty strings are folded into absence at construction time.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub department: Option<String>,
    pub starting_year: Option<i32>,
    pub ending_year: Option<i32>,
    pub sort: SortOrder,
    pub search: Option<String>,
}

impl FilterCriteria {
    pub fn new(
        department: Option<String>,
        starting_year: Option<i32>,
        ending_year: Option<i32>,
        sort: SortOrder,
        search: Option<String>,
    ) -> Self {
        Self {
            department: department.as_deref().and_then(normalize_department),
            starting_year,
            ending_year,
            sort,
            search: search.as_deref().and_then(normalize_search),
        }
    }

    /// Builds criteria from untrusted query-string text. Year values that are
    /// present but non-numeric are rejected; empty strings count as absent.
    pub fn from_params(
        department: Option<&str>,
        starting_year: Option<&str>,
        ending_year: Option<&str>,
        sort: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            department: department.and_then(normalize_department),
            starting_year: parse_year("startingYear", starting_year)?,
            ending_year: parse_year("endingYear", ending_year)?,
            sort: SortOrder::parse_or_default(sort),
            search: search.and_then(normalize_search),
        })
    }

    /// Builds criteria for the listing view, where the cohort filter arrives
    /// as `batch` (an ending year) alongside the free-text search.
    pub fn from_listing_params(
        department: Option<&str>,
        batch: Option<&str>,
        sort: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            department: department.and_then(normalize_department),
            starting_year: None,
            ending_year: parse_year("batch", batch)?,
            sort: SortOrder::parse_or_default(sort),
            search: search.and_then(normalize_search),
        })
    }

    /// The same criteria with the free-text search dropped. Distributions are
    /// computed over the structured filters only; a search term narrows the
    /// table, not the chart.
    pub fn structured_only(&self) -> FilterCriteria {
        FilterCriteria {
            search: None,
            ..self.clone()
        }
    }
}

fn normalize_department(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn normalize_search(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_year(field: &'static str, raw: Option<&str>) -> Result<Option<i32>, FilterError> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(|_| FilterError::InvalidYear {
            field,
            value: text.to_string(),
        }),
    }
}
