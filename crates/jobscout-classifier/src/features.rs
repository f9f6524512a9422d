//! Keyword, pattern, statistical, and structural feature extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lexicon::{
    COMPANY_KEYWORDS, JOB_KEYWORDS, JOB_TITLES, JOB_TYPES, LOCATIONS, NON_JOB_KEYWORDS,
    TECH_SKILLS,
};

static EXPERIENCE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\s*-\s*(\d+)\s*(?:years?|yrs?)\b").unwrap());
static EXPERIENCE_PLUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\+?\s*(?:years?|yrs?)\b").unwrap());
static EXPERIENCE_FRESHER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bfresher\b").unwrap());
static EXPERIENCE_ENTRY_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bentry\s*level\b").unwrap());

static SALARY_LPA_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\s*-\s*(\d+)\s*(?:lpa|lakh|lakhs)\b").unwrap());
static SALARY_LPA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)\s*(?:lpa|lakh|lakhs)\b").unwrap());
static SALARY_CTC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bctc\s*:\s*(\d+)").unwrap());
static SALARY_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bsalary\s*:\s*(\d+)").unwrap());
static SALARY_RUPEE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"₹\s*(\d+(?:,\d+)*)").unwrap());

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:\+91[\-\s]?)?[6-9]\d{9}\b").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

static APPLY_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bapply\s+(?:here|now|link)\b").unwrap());
static EMAIL_RESUME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:send|mail|email)\s+(?:resume|cv)\b").unwrap());

static BULLET_POINTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[•\-*]\s+").unwrap());
static NUMBERED_LIST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\s+").unwrap());
static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:responsibilities|requirements|qualifications|skills|about):").unwrap()
});

const MIN_REASONABLE_WORDS: usize = 20;
const MAX_REASONABLE_WORDS: usize = 500;
const HIGH_CAPITALIZATION_RATIO: f64 = 0.2;

/// The full feature set computed for one message, mirroring the original
/// rule-based classifier's feature dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    pub has_job_keywords: bool,
    pub job_keyword_count: usize,
    pub has_job_title: bool,
    pub job_title_count: usize,
    pub has_tech_skills: bool,
    pub tech_skill_count: usize,
    pub has_location: bool,
    pub location_count: usize,
    pub has_job_type: bool,
    pub job_type_count: usize,
    pub has_company_keywords: bool,
    pub company_keyword_count: usize,
    pub has_non_job_keywords: bool,
    pub non_job_keyword_count: usize,

    pub has_experience_requirement: bool,
    pub has_salary_info: bool,
    pub has_email: bool,
    pub has_phone: bool,
    pub has_url: bool,
    pub has_apply_link: bool,
    pub has_email_resume: bool,
    pub has_contact_info: bool,
    pub has_application_method: bool,

    pub char_count: usize,
    pub word_count: usize,
    pub is_reasonable_length: bool,

    pub has_bullet_points: bool,
    pub has_numbered_list: bool,
    pub has_sections: bool,
    pub is_structured: bool,
    pub capitalization_ratio: f64,
    pub has_high_capitalization: bool,

    pub job_signal_strength: f64,
    pub completeness_score: f64,
}

/// Deduplicate consecutive identical whitespace-separated tokens,
/// case-insensitively.
pub fn dedupe_consecutive_tokens(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for token in text.split_whitespace() {
        if out.last().map(|prev| prev.eq_ignore_ascii_case(token)).unwrap_or(false) {
            continue;
        }
        out.push(token);
    }
    out.join(" ")
}

pub fn extract_features(text: &str) -> FeatureSet {
    let normalized = dedupe_consecutive_tokens(text);
    let lower = normalized.to_lowercase();

    let job_keyword_count = JOB_KEYWORDS.iter().filter(|k| lower.contains(**k)).count();
    let job_title_count = JOB_TITLES.iter().filter(|k| lower.contains(**k)).count();
    let tech_skill_count = TECH_SKILLS.iter().filter(|k| lower.contains(**k)).count();
    let location_count = LOCATIONS.iter().filter(|k| lower.contains(**k)).count();
    let job_type_count = JOB_TYPES.iter().filter(|k| lower.contains(**k)).count();
    let company_keyword_count = COMPANY_KEYWORDS.iter().filter(|k| lower.contains(**k)).count();
    let non_job_keyword_count = NON_JOB_KEYWORDS.iter().filter(|k| lower.contains(**k)).count();

    let has_experience_requirement = EXPERIENCE_RANGE.is_match(&lower)
        || EXPERIENCE_PLUS.is_match(&lower)
        || EXPERIENCE_FRESHER.is_match(&lower)
        || EXPERIENCE_ENTRY_LEVEL.is_match(&lower);

    let has_salary_info = SALARY_LPA_RANGE.is_match(&lower)
        || SALARY_LPA.is_match(&lower)
        || SALARY_CTC.is_match(&lower)
        || SALARY_LABEL.is_match(&lower)
        || SALARY_RUPEE.is_match(&lower);

    let has_email = EMAIL.is_match(text);
    let has_phone = PHONE.is_match(text);
    let has_url = URL.is_match(text);
    let has_apply_link = APPLY_LINK.is_match(&lower);
    let has_email_resume = EMAIL_RESUME.is_match(&lower);

    let char_count = normalized.chars().count();
    let word_count = normalized.split_whitespace().count();
    let is_reasonable_length = (MIN_REASONABLE_WORDS..=MAX_REASONABLE_WORDS).contains(&word_count);

    let has_bullet_points = BULLET_POINTS.is_match(text);
    let has_numbered_list = NUMBERED_LIST.is_match(text);
    let has_sections = SECTION_HEADING.is_match(&text.to_lowercase());
    let is_structured = has_bullet_points || has_numbered_list || has_sections;

    let words: Vec<&str> = text.split_whitespace().collect();
    let capitalized_count = words
        .iter()
        .filter(|w| w.chars().next().map(|c| c.is_uppercase()).unwrap_or(false))
        .count();
    let capitalization_ratio = if words.is_empty() {
        0.0
    } else {
        capitalized_count as f64 / words.len() as f64
    };
    let has_high_capitalization = capitalization_ratio > HIGH_CAPITALIZATION_RATIO;

    let has_contact_info = has_email || has_phone;
    let has_application_method = has_apply_link || has_email_resume || has_email;

    let job_signal_strength =
        job_keyword_count as f64 + job_title_count as f64 + tech_skill_count as f64 * 0.5;

    let completeness_score = [
        job_title_count > 0,
        location_count > 0,
        tech_skill_count > 0,
        has_contact_info,
        has_application_method,
        is_structured,
    ]
    .iter()
    .filter(|b| **b)
    .count() as f64
        / 6.0;

    FeatureSet {
        has_job_keywords: job_keyword_count > 0,
        job_keyword_count,
        has_job_title: job_title_count > 0,
        job_title_count,
        has_tech_skills: tech_skill_count > 0,
        tech_skill_count,
        has_location: location_count > 0,
        location_count,
        has_job_type: job_type_count > 0,
        job_type_count,
        has_company_keywords: company_keyword_count > 0,
        company_keyword_count,
        has_non_job_keywords: non_job_keyword_count > 0,
        non_job_keyword_count,
        has_experience_requirement,
        has_salary_info,
        has_email,
        has_phone,
        has_url,
        has_apply_link,
        has_email_resume,
        has_contact_info,
        has_application_method,
        char_count,
        word_count,
        is_reasonable_length,
        has_bullet_points,
        has_numbered_list,
        has_sections,
        is_structured,
        capitalization_ratio,
        has_high_capitalization,
        job_signal_strength,
        completeness_score,
    }
}

impl FeatureSet {
    /// Flatten to a fixed-order numeric vector for the scorer.
    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            bool_to_f64(self.has_job_keywords),
            self.job_keyword_count as f64,
            bool_to_f64(self.has_job_title),
            self.job_title_count as f64,
            bool_to_f64(self.has_tech_skills),
            self.tech_skill_count as f64,
            bool_to_f64(self.has_location),
            self.location_count as f64,
            bool_to_f64(self.has_job_type),
            self.job_type_count as f64,
            bool_to_f64(self.has_company_keywords),
            self.company_keyword_count as f64,
            bool_to_f64(self.has_non_job_keywords),
            self.non_job_keyword_count as f64,
            bool_to_f64(self.has_experience_requirement),
            bool_to_f64(self.has_salary_info),
            bool_to_f64(self.has_email),
            bool_to_f64(self.has_phone),
            bool_to_f64(self.has_url),
            bool_to_f64(self.has_apply_link),
            bool_to_f64(self.has_email_resume),
            bool_to_f64(self.has_contact_info),
            bool_to_f64(self.has_application_method),
            self.word_count as f64,
            bool_to_f64(self.is_reasonable_length),
            bool_to_f64(self.has_bullet_points),
            bool_to_f64(self.has_numbered_list),
            bool_to_f64(self.has_sections),
            bool_to_f64(self.is_structured),
            self.capitalization_ratio,
            bool_to_f64(self.has_high_capitalization),
            self.job_signal_strength,
            self.completeness_score,
        ]
    }

    pub const VECTOR_LEN: usize = 33;
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_consecutive_identical_tokens() {
        assert_eq!(dedupe_consecutive_tokens("hiring hiring now now now"), "hiring now");
    }

    #[test]
    fn keeps_non_adjacent_repeats() {
        assert_eq!(dedupe_consecutive_tokens("hiring now hiring"), "hiring now hiring");
    }

    #[test]
    fn full_job_posting_has_expected_features() {
        let text = "Acme is hiring a Backend Engineer. Role: Backend Engineer. \
            Requirements: python, sql, 3-5 years experience. Location: Bangalore. \
            Salary: 18 LPA. Apply here: https://acme.co/apply or email hr@acme.com.";
        let features = extract_features(text);
        assert!(features.has_job_keywords);
        assert!(features.has_job_title);
        assert!(features.has_tech_skills);
        assert!(features.has_salary_info);
        assert!(features.has_experience_requirement);
        assert!(features.has_application_method);
        assert_eq!(features.to_vector().len(), FeatureSet::VECTOR_LEN);
    }

    #[test]
    fn non_job_text_has_no_job_signal() {
        let text = "Happy birthday! Wishing you all the best on your special day, congratulations.";
        let features = extract_features(text);
        assert!(features.has_non_job_keywords);
        assert!(!features.has_job_title);
    }
}
