//! Company name extraction: a six-priority regex chain,
//! each candidate run through a cleaning pass and a validity filter.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::COMPANY_FALSE_POSITIVE_WORDS;

static MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]{2,32})").unwrap());
static IS_HIRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([A-Z][\w&.\- ]{1,40}?)\s+is\s+hiring\b").unwrap());
static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"["']([^"']{2,50})["']"#).unwrap());
static LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:company|organization|organisation)\s*:\s*([^\n,]{2,50})").unwrap());
static JOIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bjoin\s+([A-Z][\w&.\- ]{1,40})\b").unwrap());
static EMBEDDED_URL_OR_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://|@\S+\.\S+|\b\d{10}\b").unwrap());

/// Extract the most likely company name from `text`, or `None`.
pub fn extract_company(text: &str) -> Option<String> {
    let candidates = [
        MENTION.captures(text).map(|c| c[1].replace('_', " ")),
        IS_HIRING.captures(text).map(|c| c[1].to_string()),
        QUOTED.captures(text).map(|c| c[1].to_string()),
        LABELED.captures(text).map(|c| c[1].to_string()),
        JOIN.captures(text).map(|c| c[1].to_string()),
        first_line_heuristic(text),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|c| clean_company_name(&c))
        .find(|c| is_valid_company_name(c))
}

fn first_line_heuristic(text: &str) -> Option<String> {
    let line = text.lines().next()?.trim();
    if line.is_empty() || line.len() > 50 {
        return None;
    }
    let starts_upper = line.chars().next().map(|c| c.is_uppercase()).unwrap_or(false);
    if !starts_upper {
        return None;
    }
    Some(line.to_string())
}

/// Trim whitespace/punctuation, strip a leading "at "/"@", and collapse
/// internal whitespace.
pub fn clean_company_name(raw: &str) -> String {
    let mut s = raw.trim();
    for prefix in ["at ", "At ", "@"] {
        if let Some(stripped) = s.strip_prefix(prefix) {
            s = stripped.trim();
        }
    }
    let collapsed: String = s.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || ".,;:-–—".contains(c))
        .to_string()
}

/// Reject role-generic words, embedded URLs/emails/phones, and names
/// outside the `2..=50` character range.
pub fn is_valid_company_name(name: &str) -> bool {
    let len = name.chars().count();
    if !(2..=50).contains(&len) {
        return false;
    }
    if EMBEDDED_URL_OR_EMAIL.is_match(name) {
        return false;
    }
    let lower = name.to_lowercase();
    if COMPANY_FALSE_POSITIVE_WORDS.contains(lower.as_str()) {
        return false;
    }
    let word_count = lower.split_whitespace().count();
    if word_count == 1 && COMPANY_FALSE_POSITIVE_WORDS.iter().any(|w| *w == lower) {
        return false;
    }
    true
}
