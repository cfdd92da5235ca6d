use serde::Serialize;

#[derive(Debug, Clone)]
pub struct StudentRecord {
    pub rno: String,
    pub name: String,
    pub department: String,
    pub starting_year: i32,
    pub ending_year: i32,
    pub cgpa: Option<f64>,
    pub lc: Option<i32>,
    pub lc_id: Option<String>,
}

/// One row of a ranking view: the student plus the score the view ranks by.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRow {
    pub name: String,
    pub rno: String,
    pub score: Option<f64>,
}

/// One row of the LeetCode listing view.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub name: String,
    pub lc_id: Option<String>,
    pub lc: Option<i32>,
}

/// One bar of a score histogram. Every configured bucket is emitted, count 0
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: u64,
}
