//! # Result Sets
//!
//! Matches with per-match relevance, plus the grouping and JSON
//! rendering the reporting surface consumes.

use serde::{Deserialize, Serialize};
use shared_types::{Hash, Timestamp};
use std::collections::{BTreeMap, BTreeSet};

/// One matching block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    pub sequence: u64,
    /// Hex-encoded content hash.
    pub block_hash: String,
    pub timestamp: Timestamp,
    pub category: Option<String>,
    /// Query terms this block matched.
    pub matched_terms: BTreeSet<String>,
    /// Fraction of query terms matched, in `(0.0, 1.0]`.
    pub relevance: f64,
}

impl SearchMatch {
    pub fn new(
        sequence: u64,
        block_hash: &Hash,
        timestamp: Timestamp,
        category: Option<String>,
        matched_terms: BTreeSet<String>,
        query_term_count: usize,
    ) -> Self {
        let relevance = if query_term_count == 0 {
            1.0
        } else {
            matched_terms.len() as f64 / query_term_count as f64
        };
        Self {
            sequence,
            block_hash: hex::encode(block_hash),
            timestamp,
            category,
            matched_terms,
            relevance,
        }
    }
}

/// The outcome of one bounded query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// Matches in descending relevance, sequence as tiebreak.
    pub matches: Vec<SearchMatch>,
    /// True when the scan stopped at `max_results` with entries left.
    pub truncated: bool,
    /// Indexed entries whose private layer did not open with the
    /// supplied key. Their public terms still participated.
    pub decrypt_failures: u64,
}

impl SearchResultSet {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Sort matches by relevance (descending), then sequence (ascending).
    pub fn rank(&mut self) {
        self.matches.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.sequence.cmp(&b.sequence))
        });
    }

    /// Group matches by category. Uncategorized blocks land under `None`.
    pub fn by_category(&self) -> BTreeMap<Option<String>, Vec<&SearchMatch>> {
        let mut groups: BTreeMap<Option<String>, Vec<&SearchMatch>> = BTreeMap::new();
        for m in &self.matches {
            groups.entry(m.category.clone()).or_default().push(m);
        }
        groups
    }

    /// Group matches into fixed time buckets of `bucket_seconds`, keyed
    /// by bucket start.
    pub fn by_time_bucket(&self, bucket_seconds: u64) -> BTreeMap<Timestamp, Vec<&SearchMatch>> {
        let mut groups: BTreeMap<Timestamp, Vec<&SearchMatch>> = BTreeMap::new();
        let width = bucket_seconds.max(1);
        for m in &self.matches {
            let bucket = m.timestamp - (m.timestamp % width);
            groups.entry(bucket).or_default().push(m);
        }
        groups
    }

    /// Render for the reporting surface.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(sequence: u64, timestamp: Timestamp, category: Option<&str>, matched: &[&str], total: usize) -> SearchMatch {
        SearchMatch::new(
            sequence,
            &[sequence as u8; 32],
            timestamp,
            category.map(String::from),
            matched.iter().map(|s| s.to_string()).collect(),
            total,
        )
    }

    #[test]
    fn test_relevance_is_matched_fraction() {
        let one_of_two = m(0, 100, None, &["2024"], 2);
        assert!((one_of_two.relevance - 0.5).abs() < f64::EPSILON);

        let full = m(1, 100, None, &["2024", "acme-99"], 2);
        assert!((full.relevance - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rank_orders_by_relevance_then_sequence() {
        let mut set = SearchResultSet {
            matches: vec![
                m(5, 100, None, &["2024"], 2),
                m(2, 100, None, &["2024", "acme-99"], 2),
                m(1, 100, None, &["acme-99"], 2),
            ],
            ..Default::default()
        };
        set.rank();
        let order: Vec<u64> = set.matches.iter().map(|m| m.sequence).collect();
        assert_eq!(order, vec![2, 1, 5]);
    }

    #[test]
    fn test_category_grouping() {
        let set = SearchResultSet {
            matches: vec![
                m(0, 100, Some("invoices"), &["2024"], 1),
                m(1, 100, None, &["2024"], 1),
                m(2, 100, Some("invoices"), &["2024"], 1),
            ],
            ..Default::default()
        };
        let groups = set.by_category();
        assert_eq!(groups[&Some("invoices".to_string())].len(), 2);
        assert_eq!(groups[&None].len(), 1);
    }

    #[test]
    fn test_time_buckets_align_to_width() {
        let set = SearchResultSet {
            matches: vec![
                m(0, 1_000, None, &["2024"], 1),
                m(1, 1_599, None, &["2024"], 1),
                m(2, 2_200, None, &["2024"], 1),
            ],
            ..Default::default()
        };
        let groups = set.by_time_bucket(600);
        assert_eq!(groups[&600].len(), 1);
        assert_eq!(groups[&1200].len(), 1);
        assert_eq!(groups[&1800].len(), 1);
    }

    #[test]
    fn test_json_rendering_includes_counts() {
        let set = SearchResultSet {
            matches: vec![m(0, 100, None, &["2024"], 1)],
            truncated: true,
            decrypt_failures: 2,
        };
        let json = set.to_json().unwrap();
        assert!(json.contains("\"truncated\": true"));
        assert!(json.contains("\"decrypt_failures\": 2"));
    }
}
