//! Multi-job message splitting.
//!
//! Three heuristics are tried in order, first match wins. Each is a pure
//! function of the input text, so splitting the same message twice always
//! yields the same partition.

use std::sync::LazyLock;

use regex::Regex;

static NUMBERED_SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*\d+[.)]\s+").unwrap());

static IS_HIRING_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z][\w&.\- ]{1,40}\s+is\s+hiring\b").unwrap());

static APPLY_HERE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)apply\s+here\s*:").unwrap());

/// Split `text` into job sections. Falls back to the whole text as a
/// single section when no heuristic reaches its trigger count.
pub fn split_into_jobs(text: &str) -> Vec<String> {
    if let Some(sections) = split_at_starts(text, &NUMBERED_SECTION, 2) {
        return sections;
    }
    if let Some(sections) = split_at_starts(text, &IS_HIRING_BLOCK, 2) {
        return sections;
    }
    if let Some(sections) = split_at_ends(text, &APPLY_HERE, 3) {
        return sections;
    }
    vec![text.trim().to_string()]
}

/// Split `text` so each match's start begins a new section. Requires at
/// least `min_matches` occurrences to trigger; returns `None` otherwise.
fn split_at_starts(text: &str, pattern: &Regex, min_matches: usize) -> Option<Vec<String>> {
    let starts: Vec<usize> = pattern.find_iter(text).map(|m| m.start()).collect();
    if starts.len() < min_matches {
        return None;
    }
    let mut sections = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let section = text[start..end].trim();
        if !section.is_empty() {
            sections.push(section.to_string());
        }
    }
    Some(sections)
}

/// Split `text` so each match's end terminates a section. Requires at
/// least `min_matches` occurrences to trigger; returns `None` otherwise.
fn split_at_ends(text: &str, pattern: &Regex, min_matches: usize) -> Option<Vec<String>> {
    let ends: Vec<usize> = pattern.find_iter(text).map(|m| m.end()).collect();
    if ends.len() < min_matches {
        return None;
    }
    let mut sections = Vec::with_capacity(ends.len());
    let mut start = 0usize;
    for &end in &ends {
        let section = text[start..end].trim();
        if !section.is_empty() {
            sections.push(section.to_string());
        }
        start = end;
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        if let Some(last) = sections.last_mut() {
            last.push(' ');
            last.push_str(tail);
        } else {
            sections.push(tail.to_string());
        }
    }
    Some(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_sections_split_on_two_or_more() {
        let text = "1. Backend Engineer at Acme, Bangalore, 3-5 yrs, 18 LPA. Apply: https://acme.co/apply\n2. Data Analyst at Acme, Remote, Fresher. Apply: https://acme.co/apply2";
        let sections = split_into_jobs(text);
        assert_eq!(sections.len(), 2);
        assert!(sections[0].starts_with("1."));
        assert!(sections[1].starts_with("2."));
    }

    #[test]
    fn single_numbered_section_does_not_trigger_split() {
        let text = "1. Backend Engineer at Acme, Bangalore";
        let sections = split_into_jobs(text);
        assert_eq!(sections.len(), 1);
    }

    #[test]
    fn splitting_is_stable_across_repeated_calls() {
        let text = "1. Role A\n2. Role B\n3. Role C";
        assert_eq!(split_into_jobs(text), split_into_jobs(text));
    }

    #[test]
    fn is_hiring_blocks_split_when_no_numbering_present() {
        let text = "Acme Corp is hiring a Backend Engineer in Bangalore. Widgets Inc is hiring a Frontend Developer remotely.";
        let sections = split_into_jobs(text);
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn apply_here_delimiters_split_at_three_or_more() {
        let text = "Role one details. Apply here: link1 Role two details. Apply here: link2 Role three details. Apply here: link3";
        let sections = split_into_jobs(text);
        assert_eq!(sections.len(), 3);
    }
}
