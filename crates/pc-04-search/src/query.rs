//! # Query Model
//!
//! Search queries and the validation gate they pass before any index or
//! ledger work happens. Rejection here has no side effects.

use pc_01_ledger_store::LedgerError;
use pc_03_metadata_index::IndexError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// How deep a query reaches, in increasing cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchDepth {
    /// Index terms only (public, plus private when a key is supplied).
    KeywordOnly,
    /// Adds a scan of raw on-ledger payload text.
    KeywordAndContent,
    /// Adds resolution and scan of off-chain payloads.
    Exhaustive,
}

/// Tunables for query validation.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Minimum accepted term length, exception classes aside.
    pub min_term_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { min_term_length: 4 }
    }
}

/// One search request. Criteria AND-combine: a block matches only if it
/// satisfies the category, every annotation, and at least one term.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Terms to look for. Validated, then normalized for matching.
    pub terms: Vec<String>,
    /// Exact-match category filter.
    pub category: Option<String>,
    /// Exact-match custom-field filters.
    pub annotations: BTreeMap<String, Vec<u8>>,
    pub depth: SearchDepth,
    /// Hard cap on returned matches. Zero is a caller error, not
    /// "unlimited"; unlimited traversal goes through the batched ledger
    /// walk instead.
    pub max_results: usize,
}

impl SearchQuery {
    /// Keyword query with defaults: keyword-only depth, no filters.
    pub fn keywords(terms: Vec<String>, max_results: usize) -> Self {
        Self {
            terms,
            category: None,
            annotations: BTreeMap::new(),
            depth: SearchDepth::KeywordOnly,
            max_results,
        }
    }

    pub fn with_depth(mut self, depth: SearchDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.annotations.insert(key.into(), value);
        self
    }
}

/// Search failures.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("max_results must be greater than zero")]
    ZeroMaxResults,

    #[error("query has no terms and no filters")]
    EmptyQuery,

    #[error("term '{term}' is shorter than {min} characters and matches no exception class")]
    TermTooShort { term: String, min: usize },

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Validate a raw (pre-normalization) term.
///
/// Terms shorter than `min_length` are rejected unless they fall into an
/// exception class that marks legitimate short technical tokens:
/// purely numeric tokens, all-uppercase acronyms of four letters or
/// more, and year-like tokens. The classes also admit such tokens when
/// `min_length` is configured higher than the default.
///
/// ## Errors
///
/// - `TermTooShort`: below the minimum with no applicable exception
pub fn validate_term(term: &str, config: &SearchConfig) -> Result<(), SearchError> {
    let trimmed = term.trim();
    if trimmed.chars().count() >= config.min_term_length {
        return Ok(());
    }
    if is_purely_numeric(trimmed) || is_acronym(trimmed) || is_year_like(trimmed) {
        return Ok(());
    }
    Err(SearchError::TermTooShort {
        term: trimmed.to_string(),
        min: config.min_term_length,
    })
}

fn is_purely_numeric(term: &str) -> bool {
    !term.is_empty() && term.chars().all(|c| c.is_ascii_digit())
}

fn is_acronym(term: &str) -> bool {
    term.chars().count() >= 4 && term.chars().all(|c| c.is_ascii_uppercase())
}

fn is_year_like(term: &str) -> bool {
    term.chars().count() == 4 && term.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_terms_pass() {
        let config = SearchConfig::default();
        assert!(validate_term("invoice", &config).is_ok());
        assert!(validate_term("acme-99", &config).is_ok());
    }

    #[test]
    fn test_short_prose_terms_are_rejected() {
        let config = SearchConfig::default();
        assert!(matches!(
            validate_term("ab", &config),
            Err(SearchError::TermTooShort { .. })
        ));
        assert!(matches!(
            validate_term("xy", &config),
            Err(SearchError::TermTooShort { .. })
        ));
    }

    #[test]
    fn test_numeric_tokens_are_exempt() {
        let config = SearchConfig::default();
        assert!(validate_term("42", &config).is_ok());
        assert!(validate_term("7", &config).is_ok());
    }

    #[test]
    fn test_exception_classes_survive_a_higher_minimum() {
        let config = SearchConfig { min_term_length: 6 };
        assert!(validate_term("2024", &config).is_ok());
        assert!(validate_term("HTTPS", &config).is_ok());
        assert!(validate_term("500", &config).is_ok());
        assert!(matches!(
            validate_term("brief", &config),
            Err(SearchError::TermTooShort { .. })
        ));
    }

    #[test]
    fn test_mixed_case_short_token_is_not_an_acronym() {
        let config = SearchConfig { min_term_length: 6 };
        assert!(matches!(
            validate_term("Https", &config),
            Err(SearchError::TermTooShort { .. })
        ));
    }
}
