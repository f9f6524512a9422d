//! Job category classification: weighted keyword scoring.

use jobscout_core::types::JobCategory;

use crate::lexicon::CATEGORY_KEYWORDS;

const PRIMARY_WEIGHT: u32 = 3;
const SECONDARY_WEIGHT: u32 = 1;
const DATA_TIE_BREAK_THRESHOLD: u32 = 5;

pub fn classify_category(text: &str) -> JobCategory {
    let lower = text.to_lowercase();

    let scores: Vec<(&str, u32)> = CATEGORY_KEYWORDS
        .iter()
        .map(|(name, primary, secondary)| {
            let score = primary.iter().filter(|k| lower.contains(**k)).count() as u32 * PRIMARY_WEIGHT
                + secondary.iter().filter(|k| lower.contains(**k)).count() as u32 * SECONDARY_WEIGHT;
            (*name, score)
        })
        .collect();

    let max_score = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    if max_score == 0 {
        return JobCategory::Unspecified;
    }

    let data_score = scores.iter().find(|(n, _)| *n == "data").map(|(_, s)| *s).unwrap_or(0);
    if data_score == max_score && data_score >= DATA_TIE_BREAK_THRESHOLD {
        return JobCategory::Data;
    }

    let winner = scores
        .iter()
        .find(|(_, s)| *s == max_score)
        .map(|(n, _)| *n)
        .unwrap_or("unspecified");

    match winner {
        "tech" => JobCategory::Tech,
        "data" => JobCategory::Data,
        "design" => JobCategory::Design,
        "marketing" => JobCategory::Marketing,
        "non_tech" => JobCategory::NonTech,
        _ => JobCategory::Unspecified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_tech_role() {
        let cat = classify_category("Hiring a Software Engineer, full stack, backend experience required");
        assert_eq!(cat, JobCategory::Tech);
    }

    #[test]
    fn classifies_design_role() {
        let cat = classify_category("UX Designer needed, strong Figma and visual design skills");
        assert_eq!(cat, JobCategory::Design);
    }

    #[test]
    fn no_keywords_is_unspecified() {
        assert_eq!(classify_category("Please reach out for details"), JobCategory::Unspecified);
    }

    #[test]
    fn data_wins_tie_at_or_above_five() {
        // data: "data scientist" (3) + "data" (1, secondary, matches twice but only counted once per keyword occurrence of distinct keyword) ...
        // Construct text with equal tech/data scores >=5 to exercise the tie-break.
        let text = "Software Engineer role involving data scientist work, data analytics, sql, statistics, data";
        let cat = classify_category(text);
        assert_eq!(cat, JobCategory::Data);
    }
}
