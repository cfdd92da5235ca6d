use std::cmp::Ordering;

use crate::buckets::{Bucket, CGPA_BUCKETS, LC_BUCKETS, OVERALL_BUCKETS};
use crate::filter::SortOrder;
use crate::models::{RankedRow, StudentRecord};

/// Which score a ranking or distribution is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Metric {
    #[default]
    Cgpa,
    Leetcode,
    Overall,
}

impl Metric {
    pub fn buckets(self) -> &'static [Bucket] {
        match self {
            Metric::Cgpa => CGPA_BUCKETS,
            Metric::Leetcode => LC_BUCKETS,
            Metric::Overall => OVERALL_BUCKETS,
        }
    }
}

const CGPA_WEIGHT: f64 = 0.6;
const LC_WEIGHT: f64 = 0.4;

/// Merges the two independently-scaled metrics into one 0-100 score:
/// 60% CGPA (normalized from /10 to /100) plus 40% raw solved count.
/// Missing values clamp to 0 before weighting, so the result is never null.
/// The weighting is a fixed policy, not a knob.
pub fn overall_score(cgpa: Option<f64>, lc: Option<i32>) -> f64 {
    cgpa.unwrap_or(0.0) * 10.0 * CGPA_WEIGHT + f64::from(lc.unwrap_or(0)) * LC_WEIGHT
}

/// Ranks students by the derived overall score. The score is computed, not
/// stored, so ordering happens in process; ties break on ascending roll
/// number, the same tie-break the stored-score queries use.
pub fn rank_overall(students: &[StudentRecord], sort: SortOrder) -> Vec<RankedRow> {
    let mut rows: Vec<RankedRow> = students
        .iter()
        .map(|student| RankedRow {
            name: student.name.clone(),
            rno: student.rno.clone(),
            score: Some(overall_score(student.cgpa, student.lc)),
        })
        .collect();

    rows.sort_by(|a, b| {
        let by_score = match sort {
            SortOrder::Desc => b.score.partial_cmp(&a.score),
            SortOrder::Asc => a.score.partial_cmp(&b.score),
        }
        .unwrap_or(Ordering::Equal);
        by_score.then_with(|| a.rno.cmp(&b.rno))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(rno: &str, cgpa: Option<f64>, lc: Option<i32>) -> StudentRecord {
        StudentRecord {
            rno: rno.to_string(),
            name: format!("Student {rno}"),
            department: "CSE".to_string(),
            starting_year: 2021,
            ending_year: 2025,
            cgpa,
            lc,
            lc_id: None,
        }
    }

    #[test]
    fn overall_weights_cgpa_sixty_lc_forty() {
        let score = overall_score(Some(8.0), Some(50));
        assert!((score - 68.0).abs() < 1e-9);
    }

    #[test]
    fn missing_components_clamp_to_zero() {
        assert!((overall_score(None, Some(100)) - 40.0).abs() < 1e-9);
        assert!((overall_score(Some(9.0), None) - 54.0).abs() < 1e-9);
        assert_eq!(overall_score(None, None), 0.0);
    }

    #[test]
    fn overall_ranking_sorts_descending_with_rno_tie_break() {
        let students = vec![
            student("22CS101", Some(8.0), Some(50)),
            student("22CS100", Some(8.0), Some(50)),
            student("22CS102", Some(9.5), Some(200)),
            student("22CS103", None, None),
        ];

        let ranked = rank_overall(&students, SortOrder::Desc);
        let rnos: Vec<&str> = ranked.iter().map(|r| r.rno.as_str()).collect();
        assert_eq!(rnos, vec!["22CS102", "22CS100", "22CS101", "22CS103"]);

        // all-null student ranks at 0, never as a missing score
        assert_eq!(ranked[3].score, Some(0.0));
    }

    #[test]
    fn overall_ranking_ascending_reverses_scores_not_tie_breaks() {
        let students = vec![
            student("22CS101", Some(8.0), Some(50)),
            student("22CS100", Some(8.0), Some(50)),
            student("22CS102", Some(9.5), Some(200)),
        ];

        let ranked = rank_overall(&students, SortOrder::Asc);
        let rnos: Vec<&str> = ranked.iter().map(|r| r.rno.as_str()).collect();
        assert_eq!(rnos, vec!["22CS100", "22CS101", "22CS102"]);
    }

    #[test]
    fn metric_maps_to_its_bucket_schema() {
        assert_eq!(Metric::Cgpa.buckets()[0].label, "9.0-10.0");
        assert_eq!(Metric::Leetcode.buckets()[0].label, "0-49");
        assert_eq!(Metric::Overall.buckets()[0].label, "90-100");
    }
}
