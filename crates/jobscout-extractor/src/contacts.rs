//! Contact and apply-link extraction.

use std::sync::LazyLock;

use jobscout_core::types::ApplyChannel;
use regex::Regex;

const MAX_EMAILS: usize = 5;
const MAX_PHONES: usize = 3;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\+91[\-\s]?)?[6-9]\d{9}\b").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

const APPLY_MARKERS: [&str; 5] = ["apply", "career", "careers", "jobs", "ats"];

pub fn extract_emails(text: &str) -> Vec<String> {
    EMAIL.find_iter(text).take(MAX_EMAILS).map(|m| m.as_str().to_string()).collect()
}

pub fn extract_phones(text: &str) -> Vec<String> {
    PHONE.find_iter(text).take(MAX_PHONES).map(|m| m.as_str().to_string()).collect()
}

/// Prefer a URL adjacent to the word "apply" or containing a career/job/ATS
/// marker; else the first URL supplied out-of-band; else any URL in text.
pub fn extract_apply_url(text: &str, supplied_urls: &[String]) -> Option<String> {
    let lower = text.to_lowercase();
    for m in URL.find_iter(text) {
        let window_start = m.start().saturating_sub(20);
        let window = &lower[window_start..m.start()];
        if window.contains("apply") || APPLY_MARKERS.iter().any(|marker| m.as_str().to_lowercase().contains(marker)) {
            return Some(m.as_str().to_string());
        }
    }
    if let Some(first) = supplied_urls.first() {
        return Some(first.clone());
    }
    URL.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_apply_channel(text: &str, supplied_urls: &[String]) -> ApplyChannel {
    ApplyChannel {
        url: extract_apply_url(text, supplied_urls),
        emails: extract_emails(text),
        phones: extract_phones(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_email_and_phone() {
        let text = "Contact hr@acme.com or call 9876543210 for details";
        assert_eq!(extract_emails(text), vec!["hr@acme.com".to_string()]);
        assert_eq!(extract_phones(text), vec!["9876543210".to_string()]);
    }

    #[test]
    fn prefers_url_adjacent_to_apply() {
        let text = "Details here https://acme.co/about Apply: https://acme.co/apply";
        assert_eq!(extract_apply_url(text, &[]).as_deref(), Some("https://acme.co/apply"));
    }

    #[test]
    fn falls_back_to_supplied_url_list() {
        let text = "No links in the message body";
        let supplied = vec!["https://acme.co/jobs/123".to_string()];
        assert_eq!(extract_apply_url(text, &supplied).as_deref(), Some("https://acme.co/jobs/123"));
    }
}
