//! Quality and relevance scoring: completeness, skill richness, and
//! specificity feed `quality_score`; the admin-configured
//! `JobScrapingPreferences` feed `relevance_score`.

use jobscout_core::types::{GeographicScope, JobCandidate, JobCategory, Preferences};

const WEIGHT_COMPLETENESS: f64 = 0.5;
const WEIGHT_SKILL_RICHNESS: f64 = 0.2;
const WEIGHT_SPECIFICITY: f64 = 0.3;
const SKILL_RICHNESS_CAP: f64 = 10.0;

const WEIGHT_JOB_TYPE: f64 = 0.15;
const WEIGHT_EXPERIENCE: f64 = 0.2;
const WEIGHT_LOCATION: f64 = 0.15;
const WEIGHT_WORK_MODE: f64 = 0.1;
const WEIGHT_SKILLS: f64 = 0.15;
const WEIGHT_KEYWORDS: f64 = 0.1;
const WEIGHT_SALARY: f64 = 0.1;
const WEIGHT_CONFIDENCE: f64 = 0.05;

/// Result of scoring one `JobCandidate` against the active preferences.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityBreakdown {
    pub extraction_completeness: f64,
    pub quality_score: f64,
    pub relevance_score: f64,
    pub meets_relevance_criteria: bool,
}

/// Stateless scorer; constructed once and shared, like `Classifier`.
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    /// `classifier_confidence` is the upstream `ClassificationResult`'s
    /// confidence — not carried on `JobCandidate` itself, since it belongs
    /// to the message, not the extracted sub-posting.
    pub fn score(&self, candidate: &JobCandidate, classifier_confidence: f64, prefs: &Preferences) -> QualityBreakdown {
        let completeness = extraction_completeness(candidate);
        let quality_score = (WEIGHT_COMPLETENESS * completeness
            + WEIGHT_SKILL_RICHNESS * skill_richness(candidate)
            + WEIGHT_SPECIFICITY * specificity(candidate))
        .clamp(0.0, 1.0);

        let relevance_score = relevance(candidate, classifier_confidence, prefs).clamp(0.0, 1.0);
        let meets_relevance_criteria = relevance_score >= prefs.min_relevance_score
            && !hits_excluded_keyword(candidate, prefs)
            && !hits_excluded_company(candidate, prefs);

        QualityBreakdown {
            extraction_completeness: completeness,
            quality_score,
            relevance_score,
            meets_relevance_criteria,
        }
    }
}

impl Default for QualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fraction of {title, company, location, salary, experience, apply}
/// populated: title, company, location, salary, experience, apply.
fn extraction_completeness(candidate: &JobCandidate) -> f64 {
    let fields = [
        candidate.title.is_some(),
        candidate.company_name.is_some(),
        candidate.location.is_some(),
        candidate.salary_monthly_inr.is_some(),
        candidate.experience.min_years.is_some() || candidate.experience.is_fresher,
        candidate.apply.url.is_some() || !candidate.apply.emails.is_empty(),
    ];
    fields.iter().filter(|f| **f).count() as f64 / fields.len() as f64
}

fn skill_richness(candidate: &JobCandidate) -> f64 {
    (candidate.skills.len() as f64 / SKILL_RICHNESS_CAP).min(1.0)
}

fn specificity(candidate: &JobCandidate) -> f64 {
    let experience_specific = candidate.experience.min_years.is_some() || candidate.experience.is_fresher;
    let salary_specific = candidate.salary_monthly_inr.is_some();
    let hits = experience_specific as u8 + salary_specific as u8;
    hits as f64 / 2.0
}

fn relevance(candidate: &JobCandidate, classifier_confidence: f64, prefs: &Preferences) -> f64 {
    WEIGHT_JOB_TYPE * job_type_fit(candidate, prefs)
        + WEIGHT_EXPERIENCE * experience_fit(candidate, prefs)
        + WEIGHT_LOCATION * location_fit(candidate, prefs)
        + WEIGHT_WORK_MODE * work_mode_fit(candidate, prefs)
        + WEIGHT_SKILLS * skills_fit(candidate, prefs)
        + WEIGHT_KEYWORDS * keyword_fit(candidate, prefs)
        + WEIGHT_SALARY * salary_fit(candidate, prefs)
        + WEIGHT_CONFIDENCE * classifier_confidence
}

fn job_type_fit(candidate: &JobCandidate, prefs: &Preferences) -> f64 {
    if prefs.allowed_job_types.is_empty() {
        return 1.0;
    }
    let category = category_label(candidate.category);
    if prefs.excluded_job_types.iter().any(|t| t.eq_ignore_ascii_case(category)) {
        return 0.0;
    }
    if prefs.allowed_job_types.iter().any(|t| t.eq_ignore_ascii_case(category)) {
        1.0
    } else {
        0.0
    }
}

fn category_label(category: JobCategory) -> &'static str {
    match category {
        JobCategory::Tech => "tech",
        JobCategory::Data => "data",
        JobCategory::Design => "design",
        JobCategory::Marketing => "marketing",
        JobCategory::NonTech => "non_tech",
        JobCategory::Unspecified => "unspecified",
    }
}

fn experience_fit(candidate: &JobCandidate, prefs: &Preferences) -> f64 {
    if candidate.experience.is_fresher {
        return if prefs.accept_unspecified_experience || prefs.min_experience_years.unwrap_or(0.0) <= 0.0 {
            1.0
        } else {
            0.0
        };
    }
    let (Some(min), Some(max)) = (candidate.experience.min_years, candidate.experience.max_years.or(candidate.experience.min_years)) else {
        return if prefs.accept_unspecified_experience { 0.5 } else { 0.0 };
    };
    let pref_min = prefs.min_experience_years.unwrap_or(0.0);
    let pref_max = prefs.max_experience_years.unwrap_or(f64::MAX);
    if max >= pref_min && min <= pref_max {
        1.0
    } else {
        0.0
    }
}

fn location_fit(candidate: &JobCandidate, prefs: &Preferences) -> f64 {
    let Some(location) = &candidate.location else {
        return 0.5;
    };
    match location.geographic_scope {
        GeographicScope::India if prefs.allow_all_india => {
            if prefs.preferred_locations.is_empty() {
                return 1.0;
            }
            let matches_preferred = location
                .cities
                .iter()
                .any(|city| prefs.preferred_locations.iter().any(|p| p.eq_ignore_ascii_case(city)));
            if matches_preferred {
                1.0
            } else {
                0.6
            }
        }
        GeographicScope::India => 0.3,
        GeographicScope::International if prefs.allow_international => 1.0,
        GeographicScope::International => 0.0,
        GeographicScope::Unspecified => 0.5,
    }
}

fn work_mode_fit(candidate: &JobCandidate, prefs: &Preferences) -> f64 {
    if prefs.allowed_work_modes.is_empty() {
        return 1.0;
    }
    let Some(location) = &candidate.location else {
        return 0.5;
    };
    let mode = if location.is_remote {
        "remote"
    } else if location.is_hybrid {
        "hybrid"
    } else if location.is_onsite_only {
        "onsite"
    } else {
        return 0.5;
    };
    if prefs.allowed_work_modes.iter().any(|m| m.eq_ignore_ascii_case(mode)) {
        1.0
    } else {
        0.0
    }
}

fn skills_fit(candidate: &JobCandidate, prefs: &Preferences) -> f64 {
    if prefs.priority_skills.is_empty() && prefs.excluded_skills.is_empty() {
        return 1.0;
    }
    let has_excluded = candidate
        .skills
        .iter()
        .any(|s| prefs.excluded_skills.iter().any(|e| e.eq_ignore_ascii_case(s)));
    if has_excluded {
        return 0.0;
    }
    if prefs.priority_skills.is_empty() {
        return 1.0;
    }
    let hits = candidate
        .skills
        .iter()
        .filter(|s| prefs.priority_skills.iter().any(|p| p.eq_ignore_ascii_case(s)))
        .count();
    if hits == 0 {
        0.3
    } else {
        (hits as f64 / prefs.priority_skills.len() as f64).min(1.0)
    }
}

fn keyword_fit(candidate: &JobCandidate, prefs: &Preferences) -> f64 {
    if prefs.required_keywords.is_empty() {
        return 1.0;
    }
    let text = candidate.source_text.to_lowercase();
    let hits = prefs.required_keywords.iter().filter(|k| text.contains(&k.to_lowercase())).count();
    if hits == 0 {
        0.0
    } else {
        (hits as f64 / prefs.required_keywords.len() as f64).min(1.0)
    }
}

fn salary_fit(candidate: &JobCandidate, prefs: &Preferences) -> f64 {
    if !prefs.filter_by_salary {
        return 1.0;
    }
    let Some(monthly) = candidate.salary_monthly_inr else {
        return 0.5;
    };
    let annual_lpa = (monthly as f64 * 12.0) / 100_000.0;
    let min = prefs.min_salary_lpa.unwrap_or(0.0);
    let max = prefs.max_salary_lpa.unwrap_or(f64::MAX);
    if annual_lpa >= min && annual_lpa <= max {
        1.0
    } else {
        0.0
    }
}

fn hits_excluded_keyword(candidate: &JobCandidate, prefs: &Preferences) -> bool {
    if prefs.excluded_keywords.is_empty() {
        return false;
    }
    let text = candidate.source_text.to_lowercase();
    prefs.excluded_keywords.iter().any(|k| text.contains(&k.to_lowercase()))
}

fn hits_excluded_company(candidate: &JobCandidate, prefs: &Preferences) -> bool {
    let Some(company) = &candidate.company_name else {
        return false;
    };
    prefs.excluded_companies.iter().any(|c| c.eq_ignore_ascii_case(company))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::types::{ApplyChannel, Experience, LocationBlock};
    use std::collections::HashSet;

    fn sample_candidate() -> JobCandidate {
        JobCandidate {
            title: Some("Backend Engineer".into()),
            company_name: Some("Acme".into()),
            location: Some(LocationBlock {
                raw: "Bangalore".into(),
                cities: vec!["bangalore".into()],
                is_remote: false,
                is_hybrid: false,
                is_onsite_only: true,
                geographic_scope: GeographicScope::India,
            }),
            experience: Experience { raw: Some("3-5 years".into()), min_years: Some(3.0), max_years: Some(5.0), is_fresher: false },
            salary_monthly_inr: Some(150_000),
            skills: HashSet::from(["python".to_string(), "django".to_string()]),
            category: JobCategory::Tech,
            apply: ApplyChannel { url: Some("https://acme.co/apply".into()), emails: vec![], phones: vec![] },
            quality_score: 0.0,
            relevance_score: 0.0,
            extraction_confidence: 0.9,
            content_hash: String::new(),
            source_text: "We are hiring a backend engineer at Acme, Bangalore.".into(),
        }
    }

    #[test]
    fn fully_populated_candidate_has_full_completeness() {
        let scorer = QualityScorer::new();
        let breakdown = scorer.score(&sample_candidate(), 0.9, &Preferences::default());
        assert_eq!(breakdown.extraction_completeness, 1.0);
        assert!(breakdown.quality_score > 0.7);
    }

    #[test]
    fn excluded_keyword_blocks_relevance_regardless_of_score() {
        let mut prefs = Preferences::default();
        prefs.excluded_keywords.push("internship".to_string());
        let mut candidate = sample_candidate();
        candidate.source_text.push_str(" This is an internship.");
        let scorer = QualityScorer::new();
        let breakdown = scorer.score(&candidate, 0.9, &prefs);
        assert!(!breakdown.meets_relevance_criteria);
    }

    #[test]
    fn excluded_company_blocks_relevance() {
        let mut prefs = Preferences::default();
        prefs.excluded_companies.push("acme".to_string());
        let scorer = QualityScorer::new();
        let breakdown = scorer.score(&sample_candidate(), 0.9, &prefs);
        assert!(!breakdown.meets_relevance_criteria);
    }

    #[test]
    fn international_onsite_scores_zero_location_fit_without_allow_international() {
        let mut candidate = sample_candidate();
        candidate.location.as_mut().unwrap().geographic_scope = GeographicScope::International;
        candidate.location.as_mut().unwrap().is_onsite_only = true;
        let scorer = QualityScorer::new();
        let breakdown = scorer.score(&candidate, 0.9, &Preferences::default());
        assert!(breakdown.relevance_score < 0.6);
    }

    #[test]
    fn required_keyword_present_keeps_full_keyword_fit() {
        let mut prefs = Preferences::default();
        prefs.required_keywords.push("backend".to_string());
        let scorer = QualityScorer::new();
        let with_keyword = scorer.score(&sample_candidate(), 0.9, &prefs);

        prefs.required_keywords = vec!["blockchain".to_string()];
        let without_keyword = scorer.score(&sample_candidate(), 0.9, &prefs);
        assert!(with_keyword.relevance_score > without_keyword.relevance_score);
    }
}
