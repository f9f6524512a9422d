//! Salary extraction, normalized to a monthly INR integer.
//!
//! Cascade order, first match wins: LPA range, single LPA, "upto N LPA",
//! monthly-k range, single monthly-k, rupee range, single rupee. LPA
//! values convert via `annual = lpa * 100000; monthly = annual / 12`.

use std::sync::LazyLock;

use regex::Regex;

static LPA_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)\s*lpa").unwrap());
static LPA_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*lpa").unwrap());
static UPTO_LPA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)upto\s+(\d+(?:\.\d+)?)\s*lpa").unwrap());
static MONTHLY_K_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*k\s*-\s*(\d+)\s*k\b").unwrap());
static MONTHLY_K_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*k\b").unwrap());
static RUPEE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:rs\.?|inr|₹)?\s*(\d{4,6})\s*-\s*(\d{4,6})\s*(?:per\s*month|/\s*month|pm)\b").unwrap()
});
static RUPEE_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:rs\.?|inr|₹)\s*(\d{4,6})\b|(\d{4,6})\s*(?:per\s*month|/\s*month|pm)\b").unwrap()
});

fn lpa_to_monthly(lpa: f64) -> i64 {
    let annual = (lpa * 100_000.0) as i64;
    annual / 12
}

/// Returns a monthly INR integer, or `None` if no pattern matches or the
/// matched value falls outside its cascade step's validity bounds.
pub fn extract_salary(text: &str) -> Option<i64> {
    if let Some(c) = LPA_RANGE.captures(text) {
        let lo: f64 = c[1].parse().ok()?;
        let hi: f64 = c[2].parse().ok()?;
        return Some(lpa_to_monthly((lo + hi) / 2.0));
    }
    if let Some(c) = UPTO_LPA.captures(text) {
        let lpa: f64 = c[1].parse().ok()?;
        return Some(lpa_to_monthly(lpa));
    }
    if let Some(c) = LPA_SINGLE.captures(text) {
        let lpa: f64 = c[1].parse().ok()?;
        return Some(lpa_to_monthly(lpa));
    }
    if let Some(c) = MONTHLY_K_RANGE.captures(text) {
        let lo: i64 = c[1].parse().ok()?;
        let hi: i64 = c[2].parse().ok()?;
        let avg = (lo + hi) / 2;
        if (5..=99).contains(&avg) {
            return Some(avg * 1000);
        }
        return None;
    }
    if let Some(c) = MONTHLY_K_SINGLE.captures(text) {
        let k: i64 = c[1].parse().ok()?;
        if (5..=99).contains(&k) {
            return Some(k * 1000);
        }
        return None;
    }
    if let Some(c) = RUPEE_RANGE.captures(text) {
        let lo: i64 = c[1].parse().ok()?;
        let hi: i64 = c[2].parse().ok()?;
        let avg = (lo + hi) / 2;
        if (10_000..=199_999).contains(&avg) {
            return Some(avg);
        }
        return None;
    }
    if let Some(c) = RUPEE_SINGLE.captures(text) {
        let value: i64 = c.get(1).or_else(|| c.get(2))?.as_str().parse().ok()?;
        if (10_000..=199_999).contains(&value) {
            return Some(value);
        }
        return None;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_lpa_converts_to_monthly_inr() {
        assert_eq!(extract_salary("18 LPA package"), Some(150_000));
    }

    #[test]
    fn lpa_range_averages_before_converting() {
        // (12 + 18) / 2 = 15 LPA -> 1,500,000 / 12 = 125,000
        assert_eq!(extract_salary("12-18 LPA"), Some(125_000));
    }

    #[test]
    fn monthly_k_single_is_bounds_checked() {
        assert_eq!(extract_salary("25k per month salary"), Some(25_000));
        assert_eq!(extract_salary("150k monthly"), None);
    }

    #[test]
    fn no_salary_pattern_returns_none() {
        assert_eq!(extract_salary("Backend Engineer at Acme, Bangalore"), None);
    }
}
