//! Skill extraction: lexicon intersection capped at 10.

use std::collections::HashSet;

use crate::lexicon::SKILLS_LEXICON;

const MAX_SKILLS: usize = 10;

pub fn extract_skills(text: &str) -> HashSet<String> {
    let lower = text.to_lowercase();
    SKILLS_LEXICON
        .iter()
        .filter(|skill| lower.contains(**skill))
        .take(MAX_SKILLS)
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_skills_present_in_text() {
        let skills = extract_skills("Looking for a Python developer with React and AWS experience");
        assert!(skills.contains("python"));
        assert!(skills.contains("react"));
        assert!(skills.contains("aws"));
    }

    #[test]
    fn caps_at_ten_matches() {
        let lexicon_sample = SKILLS_LEXICON.iter().take(MAX_SKILLS + 5).cloned().collect::<Vec<_>>().join(" ");
        let skills = extract_skills(&lexicon_sample);
        assert!(skills.len() <= MAX_SKILLS);
    }
}
