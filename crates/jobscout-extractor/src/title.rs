//! Job title extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::lexicon::ROLE_SUFFIXES;

static LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:role|position|designation)\s*:\s*([^\n,]{2,60})").unwrap());
static HIRING_FOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hiring\s+for\s+([^\n,.]{2,60})").unwrap());

/// Extract a job title from `text`, rejecting any candidate equal to
/// `company` (case-insensitive).
pub fn extract_title(text: &str, company: Option<&str>) -> Option<String> {
    let candidates = [
        LABELED.captures(text).map(|c| c[1].trim().to_string()),
        HIRING_FOR.captures(text).map(|c| c[1].trim().to_string()),
        role_suffix_line(text),
    ];

    candidates.into_iter().flatten().find(|t| {
        let eq_company = company
            .map(|c| c.eq_ignore_ascii_case(t.trim()))
            .unwrap_or(false);
        !t.is_empty() && !eq_company
    })
}

fn role_suffix_line(text: &str) -> Option<String> {
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.len() > 80 {
            continue;
        }
        for suffix in ROLE_SUFFIXES.iter() {
            if let Some(pos) = trimmed.find(suffix) {
                let end = pos + suffix.len();
                let start = title_start(trimmed, pos);
                let candidate = trimmed[start..end].trim();
                if !candidate.is_empty() {
                    return Some(candidate.to_string());
                }
            }
        }
    }
    None
}

/// Walk back from a role-suffix match to the start of its title phrase:
/// up to two preceding capitalized words (e.g. "Senior Backend Engineer").
fn title_start(line: &str, suffix_pos: usize) -> usize {
    let before = &line[..suffix_pos];
    let mut words: Vec<(usize, &str)> = Vec::new();
    for (idx, word) in before.split_whitespace().enumerate() {
        let _ = idx;
        let offset = before.rfind(word).unwrap_or(0);
        words.push((offset, word));
    }
    let take = words.len().min(2);
    words
        .get(words.len().saturating_sub(take))
        .map(|(offset, _)| *offset)
        .unwrap_or(suffix_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_labeled_title() {
        let text = "Role: Backend Engineer\nCompany: Acme";
        assert_eq!(extract_title(text, Some("Acme")).as_deref(), Some("Backend Engineer"));
    }

    #[test]
    fn extracts_role_suffix_line() {
        let text = "We need a Senior Backend Engineer to join our team in Pune.";
        let title = extract_title(text, None).unwrap();
        assert!(title.contains("Engineer"));
    }

    #[test]
    fn rejects_title_equal_to_company() {
        let text = "Role: Acme\nCompany: Acme";
        assert_eq!(extract_title(text, Some("Acme")), None);
    }
}
