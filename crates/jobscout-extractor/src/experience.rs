//! Experience extraction.

use std::sync::LazyLock;

use jobscout_core::types::Experience;
use regex::Regex;

use crate::lexicon::FRESHER_KEYWORDS;

static RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)\s*(?:years?|yrs?)\b").unwrap());
static PLUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*\+\s*(?:years?|yrs?)\b").unwrap());
static MINIMUM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:min(?:imum)?|at\s*least)\s*(\d+(?:\.\d+)?)\s*(?:years?|yrs?)\b").unwrap()
});
static SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:years?|yrs?)\b").unwrap());

pub fn extract_experience(text: &str) -> Experience {
    let lower = text.to_lowercase();

    if FRESHER_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Experience {
            raw: Some("fresher".to_string()),
            min_years: Some(0.0),
            max_years: Some(0.0),
            is_fresher: true,
        };
    }

    if let Some(c) = RANGE.captures(text) {
        let min: f64 = c[1].parse().unwrap_or(0.0);
        let max: f64 = c[2].parse().unwrap_or(min);
        return Experience {
            raw: Some(c[0].trim().to_string()),
            min_years: Some(min),
            max_years: Some(max),
            is_fresher: false,
        };
    }

    if let Some(c) = PLUS.captures(text) {
        let min: f64 = c[1].parse().unwrap_or(0.0);
        return Experience {
            raw: Some(c[0].trim().to_string()),
            min_years: Some(min),
            max_years: None,
            is_fresher: false,
        };
    }

    if let Some(c) = MINIMUM.captures(text) {
        let min: f64 = c[1].parse().unwrap_or(0.0);
        return Experience {
            raw: Some(c[0].trim().to_string()),
            min_years: Some(min),
            max_years: None,
            is_fresher: false,
        };
    }

    if let Some(c) = SINGLE.captures(text) {
        let years: f64 = c[1].parse().unwrap_or(0.0);
        return Experience {
            raw: Some(c[0].trim().to_string()),
            min_years: Some(years),
            max_years: Some(years),
            is_fresher: years == 0.0,
        };
    }

    Experience::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresher_keyword_sets_is_fresher() {
        let exp = extract_experience("Fresher welcome to apply");
        assert!(exp.is_fresher);
        assert_eq!(exp.min_years, Some(0.0));
    }

    #[test]
    fn range_parses_min_and_max() {
        let exp = extract_experience("3-5 yrs experience required");
        assert_eq!(exp.min_years, Some(3.0));
        assert_eq!(exp.max_years, Some(5.0));
        assert!(!exp.is_fresher);
    }

    #[test]
    fn plus_pattern_has_no_max() {
        let exp = extract_experience("5+ years experience");
        assert_eq!(exp.min_years, Some(5.0));
        assert_eq!(exp.max_years, None);
    }

    #[test]
    fn no_experience_pattern_returns_default() {
        let exp = extract_experience("Backend Engineer at Acme");
        assert_eq!(exp.min_years, None);
        assert!(!exp.is_fresher);
    }
}
