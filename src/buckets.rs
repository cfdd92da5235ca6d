use crate::models::BucketCount;

/// One histogram range: `[min, max)`, or `[min, ..)` when `max` is `None`.
/// The configured bucket order is the output order.
#[derive(Debug, Clone, Copy)]
pub struct Bucket {
    pub label: &'static str,
    pub min: f64,
    pub max: Option<f64>,
}

impl Bucket {
    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && self.max.is_none_or(|max| score < max)
    }
}

/// CGPA ranges as shown on the ranking chart, highest first.
pub const CGPA_BUCKETS: &[Bucket] = &[
    Bucket { label: "9.0-10.0", min: 9.0, max: None },
    Bucket { label: "8.0-8.9", min: 8.0, max: Some(9.0) },
    Bucket { label: "7.0-7.9", min: 7.0, max: Some(8.0) },
    Bucket { label: "6.0-6.9", min: 6.0, max: Some(7.0) },
    Bucket { label: "Below 6.0", min: 0.0, max: Some(6.0) },
];

/// Solved-count ranges for the LeetCode chart, ascending.
pub const LC_BUCKETS: &[Bucket] = &[
    Bucket { label: "0-49", min: 0.0, max: Some(50.0) },
    Bucket { label: "50-99", min: 50.0, max: Some(100.0) },
    Bucket { label: "100-149", min: 100.0, max: Some(150.0) },
    Bucket { label: "150-199", min: 150.0, max: Some(200.0) },
    Bucket { label: "200+", min: 200.0, max: None },
];

/// Overall-score ranges, highest first. The overall score lives on a 0-100
/// scale (see `score::overall_score`).
pub const OVERALL_BUCKETS: &[Bucket] = &[
    Bucket { label: "90-100", min: 90.0, max: None },
    Bucket { label: "80-89", min: 80.0, max: Some(90.0) },
    Bucket { label: "70-79", min: 70.0, max: Some(80.0) },
    Bucket { label: "60-69", min: 60.0, max: Some(70.0) },
    Bucket { label: "Below 60", min: 0.0, max: Some(60.0) },
];

/// Folds scores into the configured buckets. Every bucket is emitted in
/// configured order, zero counts included, so chart output is deterministic
/// whatever order the store returned rows in.
pub fn bucket_scores(scores: &[f64], buckets: &[Bucket]) -> Vec<BucketCount> {
    let mut counts = vec![0u64; buckets.len()];

    for &score in scores {
        if let Some(slot) = buckets.iter().position(|bucket| bucket.contains(score)) {
            counts[slot] += 1;
        }
    }

    buckets
        .iter()
        .zip(counts)
        .map(|(bucket, count)| BucketCount {
            label: bucket.label.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(counts: &[BucketCount]) -> Vec<&str> {
        counts.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn every_bucket_is_emitted_even_when_empty() {
        let counts = bucket_scores(&[], CGPA_BUCKETS);
        assert_eq!(
            labels(&counts),
            vec!["9.0-10.0", "8.0-8.9", "7.0-7.9", "6.0-6.9", "Below 6.0"]
        );
        assert!(counts.iter().all(|c| c.count == 0));
    }

    #[test]
    fn counts_sum_to_the_number_of_scores() {
        let scores = [9.2, 7.5, 8.8, 0.0, 10.0, 5.99, 6.0];
        let counts = bucket_scores(&scores, CGPA_BUCKETS);
        let total: u64 = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, scores.len() as u64);
    }

    #[test]
    fn cgpa_buckets_are_exhaustive_and_non_overlapping() {
        let mut score = 0.0;
        while score <= 10.0 {
            let matches = CGPA_BUCKETS.iter().filter(|b| b.contains(score)).count();
            assert_eq!(matches, 1, "score {score} matched {matches} buckets");
            score += 0.05;
        }
    }

    #[test]
    fn lc_buckets_are_exhaustive_and_non_overlapping() {
        for solved in 0..600 {
            let matches = LC_BUCKETS
                .iter()
                .filter(|b| b.contains(solved as f64))
                .count();
            assert_eq!(matches, 1, "lc {solved} matched {matches} buckets");
        }
    }

    #[test]
    fn boundary_scores_land_in_the_upper_bucket() {
        let counts = bucket_scores(&[9.0, 8.0, 6.0], CGPA_BUCKETS);
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 1);
        assert_eq!(counts[3].count, 1);

        let counts = bucket_scores(&[49.0, 50.0, 200.0], LC_BUCKETS);
        assert_eq!(counts[0].count, 1);
        assert_eq!(counts[1].count, 1);
        assert_eq!(counts[4].count, 1);
    }

    #[test]
    fn cse_scenario_distribution() {
        // Department-filtered CGPAs 9.2 and 7.5 from the two CSE students.
        let counts = bucket_scores(&[9.2, 7.5], CGPA_BUCKETS);
        let by_label: Vec<(&str, u64)> =
            counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(
            by_label,
            vec![
                ("9.0-10.0", 1),
                ("8.0-8.9", 0),
                ("7.0-7.9", 1),
                ("6.0-6.9", 0),
                ("Below 6.0", 0),
            ]
        );
    }
}
