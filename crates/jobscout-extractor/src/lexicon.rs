//! Static keyword sets used across the extraction pipeline, carried over
//! verbatim from the rule-based extractor this crate replaces. Built once
//! at first use; no `phf` — these sets are small enough that a plain
//! `HashSet` built via `LazyLock` is simpler and the workspace has no
//! compile-time-map dependency anywhere else.

use std::collections::HashSet;
use std::sync::LazyLock;

pub static INDIA_CITIES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "mumbai", "delhi", "new delhi", "bangalore", "bengaluru", "hyderabad", "chennai", "pune",
        "kolkata", "ahmedabad", "gurgaon", "gurugram", "noida", "jaipur", "chandigarh", "indore",
        "kochi", "cochin", "coimbatore", "nagpur", "lucknow", "surat", "visakhapatnam", "vizag",
        "bhopal", "patna", "vadodara", "ludhiana", "agra", "nashik", "faridabad", "meerut",
        "rajkot", "varanasi", "amritsar", "navi mumbai", "thane", "mysore", "mysuru", "guwahati",
        "dehradun", "ranchi", "raipur", "trivandrum", "thiruvananthapuram", "bhubaneswar",
        "gandhinagar", "gwalior", "jodhpur", "jalandhar", "madurai", "nashik",
    ]
    .into_iter()
    .collect()
});

pub static INTERNATIONAL_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "usa", "u.s.a", "united states", "us ", "uk", "united kingdom", "canada", "australia",
        "singapore", "dubai", "uae", "united arab emirates", "germany", "london", "new york",
        "california", "texas", "toronto", "sydney", "melbourne", "berlin", "europe", "england",
        "costa mesa", "san francisco", "seattle", "chicago", "boston", "vancouver", "dublin",
        "amsterdam", "paris", "tokyo", "singapore city", "auckland", "new zealand",
    ]
    .into_iter()
    .collect()
});

pub static ONSITE_ONLY_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "onsite only",
        "on-site only",
        "on site only",
        "in-office only",
        "in office only",
        "work from office only",
        "wfo only",
        "no remote work",
    ]
    .into_iter()
    .collect()
});

pub static REMOTE_NEGATION_PHRASES: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["no remote", "not remote", "remote not available"].into_iter().collect());

pub static REMOTE_KEYWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["remote", "work from home", "wfh"].into_iter().collect());

pub static HYBRID_KEYWORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["hybrid", "partially remote", "hybrid model"].into_iter().collect());

pub static SKILLS_LEXICON: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "python", "java", "javascript", "typescript", "react", "angular", "vue", "node",
        "node.js", "django", "flask", "spring", "sql", "mysql", "postgresql", "mongodb", "aws",
        "azure", "gcp", "docker", "kubernetes", "git", "html", "css", "c++", "c#", "php", "ruby",
        "swift", "kotlin", "golang", "go", "scala", "rust", "machine learning", "data science",
        "tensorflow", "pytorch", "excel", "tableau", "power bi", "salesforce", "sap", "figma",
        "photoshop", "illustrator", "seo", "digital marketing", "content writing",
    ]
    .into_iter()
    .collect()
});

pub static COMPANY_FALSE_POSITIVE_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "hiring", "jobs", "job", "urgent", "immediate", "opening", "openings", "vacancy",
        "vacancies", "required", "wanted", "apply", "position", "role", "company", "team",
        "group", "we", "we're", "we are",
    ]
    .into_iter()
    .collect()
});

pub static ROLE_SUFFIXES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    vec![
        "Engineer",
        "Developer",
        "Manager",
        "Analyst",
        "Designer",
        "Architect",
        "Lead",
        "Intern",
        "Specialist",
        "Consultant",
    ]
});

pub static FRESHER_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ["fresher", "freshers", "0 years", "no experience", "entry level", "entry-level"]
        .into_iter()
        .collect()
});

/// `(category, primary keywords, secondary keywords)`, weight 3/1.
pub static CATEGORY_KEYWORDS: LazyLock<Vec<(&'static str, Vec<&'static str>, Vec<&'static str>)>> =
    LazyLock::new(|| {
        vec![
            (
                "tech",
                vec![
                    "software engineer",
                    "developer",
                    "programmer",
                    "full stack",
                    "backend",
                    "frontend",
                    "devops",
                    "qa engineer",
                    "sde",
                    "swe",
                    "tech lead",
                    "mobile developer",
                    "android developer",
                    "ios developer",
                ],
                vec!["engineer", "technical", "coding", "programming", "agile", "scrum"],
            ),
            (
                "data",
                vec![
                    "data scientist",
                    "data analyst",
                    "data engineer",
                    "machine learning engineer",
                    "business intelligence",
                    "data science",
                ],
                vec!["analytics", "sql", "statistics", "data"],
            ),
            (
                "design",
                vec![
                    "ui designer",
                    "ux designer",
                    "graphic designer",
                    "product designer",
                    "visual designer",
                ],
                vec!["design", "figma", "photoshop", "creative"],
            ),
            (
                "marketing",
                vec![
                    "digital marketing",
                    "marketing manager",
                    "seo specialist",
                    "content marketing",
                    "social media marketing",
                ],
                vec!["marketing", "seo", "branding", "campaign"],
            ),
            (
                "non_tech",
                vec![
                    "sales executive",
                    "hr executive",
                    "operations manager",
                    "customer support",
                    "accountant",
                    "finance manager",
                    "admin executive",
                ],
                vec!["sales", "hr", "operations", "support", "finance", "admin"],
            ),
        ]
    });
