//! # Automatic Term Extraction
//!
//! Pulls searchable tokens out of payload text. Extraction is deliberately
//! selective: plain prose words are not terms (content-depth search covers
//! those); what gets indexed are the token classes that identify records:
//!
//! - purely numeric tokens (`2024`, `1,250.00`)
//! - date-like tokens (`2024-06-01`, `12/31/2024`)
//! - identifier-like tokens mixing letters and digits (`ACME-99`, `inv2024`)
//! - email-like tokens (`billing@acme.example`)
//! - currency-like tokens (`$500`, `1200eur`)
//!
//! All extracted terms come out normalized (lower-cased, trimmed), ready
//! for visibility lookup.

use crate::domain::visibility::normalize_term;
use std::collections::BTreeSet;

/// Extract and normalize all recognizable terms from `text`.
///
/// Commas and semicolons are punctuation only at token edges; inside a
/// token they are part of it, which keeps grouped amounts like
/// `1,250.00` intact.
pub fn extract_terms(text: &str) -> BTreeSet<String> {
    text.split(is_separator)
        .map(|raw| raw.trim_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?')))
        .filter(|token| !token.is_empty())
        .filter(|token| is_term(token))
        .map(normalize_term)
        .collect()
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'')
}

fn is_term(token: &str) -> bool {
    is_numeric(token)
        || is_date_like(token)
        || is_email_like(token)
        || is_currency_like(token)
        || is_identifier_like(token)
}

/// Digits only, allowing thousands/decimal separators.
fn is_numeric(token: &str) -> bool {
    let mut digits = 0usize;
    for c in token.chars() {
        if c.is_ascii_digit() {
            digits += 1;
        } else if !matches!(c, '.' | ',') {
            return false;
        }
    }
    digits > 0
}

/// Digit groups joined by `-` or `/`, at least two separators.
fn is_date_like(token: &str) -> bool {
    let mut separators = 0usize;
    let mut digits = 0usize;
    for c in token.chars() {
        if c.is_ascii_digit() {
            digits += 1;
        } else if matches!(c, '-' | '/') {
            separators += 1;
        } else {
            return false;
        }
    }
    digits >= 4 && separators >= 2
}

/// Local part, `@`, and a dotted domain.
fn is_email_like(token: &str) -> bool {
    match token.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Currency symbol followed by an amount, or an amount with a trailing
/// three-letter code.
fn is_currency_like(token: &str) -> bool {
    if let Some(rest) = token.strip_prefix(['$', '€', '£', '¥']) {
        return is_numeric(rest);
    }
    if token.len() > 3 {
        let (amount, code) = token.split_at(token.len() - 3);
        return code.chars().all(|c| c.is_ascii_alphabetic()) && is_numeric(amount);
    }
    false
}

/// Mixed letters and digits (record identifiers like `ACME-99`).
fn is_identifier_like(token: &str) -> bool {
    let has_letter = token.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = token.chars().any(|c| c.is_ascii_digit());
    let well_formed = token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    has_letter && has_digit && well_formed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(text: &str) -> Vec<String> {
        extract_terms(text).into_iter().collect()
    }

    #[test]
    fn test_invoice_line_extraction() {
        let extracted = terms("invoice 2024 ACME-99 total 500 EUR");
        assert_eq!(extracted, vec!["2024", "500", "acme-99"]);
    }

    #[test]
    fn test_numbers_and_amounts() {
        let extracted = terms("paid 1,250.00 on account 99817");
        assert!(extracted.contains(&"1,250.00".to_string()));
        assert!(extracted.contains(&"99817".to_string()));
        assert!(!extracted.contains(&"paid".to_string()));
    }

    #[test]
    fn test_edge_commas_trim_but_interior_commas_stay() {
        let extracted = terms("totals: 1,250.00, 88, and 2024,");
        assert!(extracted.contains(&"1,250.00".to_string()));
        assert!(extracted.contains(&"88".to_string()));
        assert!(extracted.contains(&"2024".to_string()));
    }

    #[test]
    fn test_dates() {
        let extracted = terms("due 2024-06-01, shipped 12/31/2024");
        assert!(extracted.contains(&"2024-06-01".to_string()));
        assert!(extracted.contains(&"12/31/2024".to_string()));
    }

    #[test]
    fn test_emails() {
        let extracted = terms("contact billing@acme.example today.");
        assert!(extracted.contains(&"billing@acme.example".to_string()));
        assert!(!extracted.contains(&"today".to_string()));
    }

    #[test]
    fn test_currency_tokens() {
        let extracted = terms("charged $500 plus 1200eur surcharge");
        assert!(extracted.contains(&"$500".to_string()));
        assert!(extracted.contains(&"1200eur".to_string()));
        assert!(!extracted.contains(&"surcharge".to_string()));
    }

    #[test]
    fn test_identifiers_need_letters_and_digits() {
        let extracted = terms("order ACME-99 ref inv2024 note well-known");
        assert!(extracted.contains(&"acme-99".to_string()));
        assert!(extracted.contains(&"inv2024".to_string()));
        assert!(!extracted.contains(&"well-known".to_string()));
    }

    #[test]
    fn test_plain_prose_yields_nothing() {
        assert!(extract_terms("the quick brown fox").is_empty());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "invoice 2024 ACME-99 total 500 EUR";
        assert_eq!(extract_terms(text), extract_terms(text));
    }
}
