//! Location extraction: raw string plus structured flags.

use std::sync::LazyLock;

use jobscout_core::types::{GeographicScope, LocationBlock};
use regex::Regex;

use crate::lexicon::{
    HYBRID_KEYWORDS, INDIA_CITIES, INTERNATIONAL_KEYWORDS, ONSITE_ONLY_KEYWORDS,
    REMOTE_KEYWORDS, REMOTE_NEGATION_PHRASES,
};

static LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)location\s*:\s*([^\n]{2,80})").unwrap());

pub fn extract_location(text: &str) -> Option<LocationBlock> {
    let lower = text.to_lowercase();

    let cities: Vec<String> = INDIA_CITIES
        .iter()
        .filter(|city| lower.contains(*city))
        .map(|c| c.to_string())
        .collect();

    let has_remote_negation = REMOTE_NEGATION_PHRASES.iter().any(|p| lower.contains(p));
    let has_remote_keyword = REMOTE_KEYWORDS.iter().any(|k| lower.contains(k));
    let is_remote = has_remote_keyword && !has_remote_negation;

    let is_hybrid = HYBRID_KEYWORDS.iter().any(|k| lower.contains(k));

    let mut is_onsite_only = ONSITE_ONLY_KEYWORDS.iter().any(|k| lower.contains(k));
    if is_remote || is_hybrid {
        is_onsite_only = false;
    }

    let has_international_keyword = INTERNATIONAL_KEYWORDS.iter().any(|k| lower.contains(k));
    let geographic_scope = if !cities.is_empty() {
        GeographicScope::India
    } else if has_international_keyword {
        GeographicScope::International
    } else {
        GeographicScope::Unspecified
    };

    let raw = LABELED
        .captures(text)
        .map(|c| c[1].trim().to_string())
        .or_else(|| cities.first().cloned())
        .or_else(|| {
            INTERNATIONAL_KEYWORDS
                .iter()
                .find(|k| lower.contains(**k))
                .map(|k| k.to_string())
        });

    let raw = raw?;

    Some(LocationBlock {
        raw,
        cities,
        is_remote,
        is_hybrid,
        is_onsite_only,
        geographic_scope,
    })
}

/// The firm business rule: an international, onsite-only,
/// non-remote, non-hybrid posting must never be accepted.
pub fn fails_onsite_international_gate(location: &LocationBlock) -> bool {
    location.geographic_scope == GeographicScope::International
        && location.is_onsite_only
        && !location.is_remote
        && !location.is_hybrid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn india_city_resolves_scope_to_india() {
        let loc = extract_location("Backend Engineer role in Bangalore, 3-5 yrs").unwrap();
        assert_eq!(loc.geographic_scope, GeographicScope::India);
        assert!(loc.cities.contains(&"bangalore".to_string()));
    }

    #[test]
    fn international_onsite_only_fails_the_gate() {
        let loc = extract_location("Office based in Costa Mesa, California. Onsite only, no remote.").unwrap();
        assert_eq!(loc.geographic_scope, GeographicScope::International);
        assert!(loc.is_onsite_only);
        assert!(!loc.is_remote);
        assert!(fails_onsite_international_gate(&loc));
    }

    #[test]
    fn remote_overrides_onsite_only_flag() {
        let loc = extract_location("Fully remote role, onsite only not required").unwrap();
        assert!(loc.is_remote);
        assert!(!loc.is_onsite_only);
    }

    #[test]
    fn remote_negation_suppresses_remote_flag() {
        let loc = extract_location("Bangalore office. No remote work available.").unwrap();
        assert!(!loc.is_remote);
    }
}
