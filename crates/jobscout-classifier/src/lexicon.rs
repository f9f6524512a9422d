//! Static keyword sets for keyword-based feature extraction, carried over
//! from the rule-based classifier this crate replaces.

use std::collections::HashSet;
use std::sync::LazyLock;

pub static JOB_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "hiring", "job", "position", "role", "opening", "opportunity", "career", "vacancy",
        "recruitment", "apply", "candidate", "join", "team", "looking for", "seeking",
        "required", "experience", "skills", "salary", "ctc", "package", "compensation",
        "benefits", "interview", "resume", "cv", "application", "requirements",
        "responsibilities", "qualifications", "eligibility",
    ]
    .into_iter()
    .collect()
});

pub static JOB_TITLES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "developer", "engineer", "programmer", "analyst", "manager", "consultant", "designer",
        "architect", "lead", "senior", "junior", "intern", "trainee", "associate", "specialist",
        "coordinator", "executive", "officer", "director", "head", "data scientist",
        "software engineer", "web developer", "full stack", "backend", "frontend", "devops",
        "qa", "tester", "product manager", "business analyst", "hr",
    ]
    .into_iter()
    .collect()
});

pub static TECH_SKILLS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "python", "java", "javascript", "react", "angular", "vue", "node", "django", "flask",
        "spring", "aws", "azure", "gcp", "docker", "kubernetes", "sql", "mongodb", "postgresql",
        "machine learning", "ml", "ai", "data science", "analytics", "tensorflow", "pytorch",
        "scikit-learn", "pandas", "numpy", "rest api", "microservices", "agile", "scrum", "git",
        "linux", "shell scripting", "ci/cd", "jenkins", "testing",
    ]
    .into_iter()
    .collect()
});

pub static LOCATIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "bangalore", "bengaluru", "mumbai", "delhi", "hyderabad", "pune", "chennai", "kolkata",
        "gurgaon", "noida", "remote", "work from home", "wfh", "hybrid", "onsite", "india",
        "usa", "uk", "singapore", "dubai",
    ]
    .into_iter()
    .collect()
});

pub static JOB_TYPES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "full time", "full-time", "fulltime", "part time", "part-time", "contract", "freelance",
        "internship", "permanent", "temporary",
    ]
    .into_iter()
    .collect()
});

pub static COMPANY_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "company", "organization", "firm", "startup", "corporation", "pvt ltd",
        "private limited", "inc", "llc", "technologies", "solutions", "services", "systems",
        "software", "consulting",
    ]
    .into_iter()
    .collect()
});

pub static NON_JOB_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "meme", "joke", "funny", "lol", "lmao", "haha", "breaking news", "update",
        "announcement", "event", "webinar", "workshop", "course", "training", "certification",
        "exam", "result", "admit card", "syllabus", "birthday", "congratulations", "wishes",
        "greetings", "sale", "discount", "offer", "deal", "price",
    ]
    .into_iter()
    .collect()
});
