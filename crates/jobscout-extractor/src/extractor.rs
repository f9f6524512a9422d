//! Orchestrates the per-message extraction pipeline.

use jobscout_core::types::JobCandidate;

use crate::category::classify_category;
use crate::company::extract_company;
use crate::contacts::extract_apply_channel;
use crate::experience::extract_experience;
use crate::location::{extract_location, fails_onsite_international_gate};
use crate::salary::extract_salary;
use crate::skills::extract_skills;
use crate::split::split_into_jobs;
use crate::title::extract_title;

/// Minimum confidence a candidate must reach to survive extraction.
const MIN_CONFIDENCE: f64 = 0.3;

const WEIGHT_COMPANY: f64 = 0.3;
const WEIGHT_TITLE: f64 = 0.3;
const WEIGHT_LOCATION: f64 = 0.1;
const WEIGHT_SALARY: f64 = 0.1;
const WEIGHT_APPLY: f64 = 0.1;
const WEIGHT_EXPERIENCE: f64 = 0.05;
const WEIGHT_EMAIL: f64 = 0.05;

/// Splits a raw message into job sections and extracts a `JobCandidate`
/// per section, dropping any candidate below [`MIN_CONFIDENCE`].
///
/// `content_hash` is left empty; populating it is the deduper's job.
pub fn extract(text: &str, urls: &[String]) -> Vec<JobCandidate> {
    split_into_jobs(text)
        .into_iter()
        .filter_map(|section| extract_one(&section, urls))
        .collect()
}

fn extract_one(section: &str, urls: &[String]) -> Option<JobCandidate> {
    let company_name = extract_company(section);
    let title = extract_title(section, company_name.as_deref());
    let location = extract_location(section);

    if let Some(loc) = &location {
        if fails_onsite_international_gate(loc) {
            tracing::debug!("rejecting candidate: onsite-only international posting");
            return None;
        }
    }

    let salary_monthly_inr = extract_salary(section);
    let experience = extract_experience(section);
    let skills = extract_skills(section);
    let category = classify_category(section);
    let apply = extract_apply_channel(section, urls);

    let confidence = score_confidence(
        company_name.is_some(),
        title.is_some(),
        location.is_some(),
        salary_monthly_inr.is_some(),
        apply.url.is_some(),
        experience.min_years.is_some() || experience.is_fresher,
        !apply.emails.is_empty(),
    );

    if confidence < MIN_CONFIDENCE {
        tracing::debug!(confidence, "rejecting candidate: confidence below threshold");
        return None;
    }

    Some(JobCandidate {
        title,
        company_name,
        location,
        experience,
        salary_monthly_inr,
        skills,
        category,
        apply,
        quality_score: 0.0,
        relevance_score: 0.0,
        extraction_confidence: confidence,
        content_hash: String::new(),
        source_text: section.to_string(),
    })
}

#[allow(clippy::too_many_arguments)]
fn score_confidence(
    has_company: bool,
    has_title: bool,
    has_location: bool,
    has_salary: bool,
    has_apply: bool,
    has_experience: bool,
    has_email: bool,
) -> f64 {
    let mut score = 0.0;
    if has_company {
        score += WEIGHT_COMPANY;
    }
    if has_title {
        score += WEIGHT_TITLE;
    }
    if has_location {
        score += WEIGHT_LOCATION;
    }
    if has_salary {
        score += WEIGHT_SALARY;
    }
    if has_apply {
        score += WEIGHT_APPLY;
    }
    if has_experience {
        score += WEIGHT_EXPERIENCE;
    }
    if has_email {
        score += WEIGHT_EMAIL;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobscout_core::types::GeographicScope;

    #[test]
    fn multi_job_split_produces_two_candidates() {
        let text = "1. Role: Backend Engineer\nCompany: Acme\nLocation: Bangalore\n\
                    Experience: 3-5 yrs\nSalary: 18 LPA\nApply: https://acme.co/apply\n\
                    2. Role: Data Analyst\nCompany: Acme\nLocation: Remote\n\
                    Experience: Fresher\nApply: https://acme.co/apply2";
        let candidates = extract(text, &[]);
        assert_eq!(candidates.len(), 2);

        let first = &candidates[0];
        assert_eq!(first.title.as_deref(), Some("Backend Engineer"));
        assert_eq!(first.company_name.as_deref(), Some("Acme"));
        assert_eq!(first.salary_monthly_inr, Some(150_000));

        let second = &candidates[1];
        assert_eq!(second.title.as_deref(), Some("Data Analyst"));
        assert!(second.experience.is_fresher);
    }

    #[test]
    fn onsite_international_is_rejected() {
        let text = "Role: Backend Engineer\nCompany: Acme\n\
                    Location: Costa Mesa, California. Onsite only, no remote.\n\
                    Apply: https://acme.co/apply";
        let candidates = extract(text, &[]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn low_confidence_section_is_dropped() {
        let candidates = extract("Please reach out for more information.", &[]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn india_location_is_preserved_when_gate_does_not_apply() {
        let text = "Role: Backend Engineer\nCompany: Acme\nLocation: Bangalore\n\
                    Experience: 3-5 yrs\nSalary: 18 LPA\nApply: https://acme.co/apply";
        let candidates = extract(text, &[]);
        assert_eq!(candidates.len(), 1);
        let loc = candidates[0].location.as_ref().unwrap();
        assert_eq!(loc.geographic_scope, GeographicScope::India);
    }
}
