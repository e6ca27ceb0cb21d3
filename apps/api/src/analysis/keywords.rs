//! Keyword heuristic: scans a fixed list of tracked terms against a job
//! description and a resume. Pure, deterministic, no LLM call.
//!
//! `relevant` = tracked terms found in the JD, `matched` = relevant terms
//! also found in the resume, `missing` = the rest. Output order follows
//! `TRACKED_KEYWORDS`, so identical input always yields identical sets.

use serde::{Deserialize, Serialize};

/// Terms the heuristic looks for, lowercase.
pub const TRACKED_KEYWORDS: &[&str] = &[
    // languages
    "javascript",
    "typescript",
    "python",
    "java",
    "kotlin",
    "swift",
    "golang",
    "rust",
    "c++",
    "c#",
    "ruby",
    "php",
    "scala",
    "sql",
    "html",
    "css",
    // frameworks and runtimes
    "react",
    "angular",
    "vue",
    "next.js",
    "node.js",
    "express",
    "django",
    "flask",
    "spring",
    ".net",
    "rails",
    "graphql",
    "rest",
    // cloud and infrastructure
    "aws",
    "azure",
    "gcp",
    "docker",
    "kubernetes",
    "terraform",
    "linux",
    "ci/cd",
    "microservices",
    "serverless",
    // data
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "kafka",
    "spark",
    "machine learning",
    "data analysis",
    "tableau",
    "excel",
    // practices
    "agile",
    "scrum",
    "git",
    "testing",
    "devops",
    "security",
    "api",
    "system design",
    "product management",
    "project management",
    // soft skills
    "leadership",
    "communication",
    "collaboration",
    "problem solving",
    "mentoring",
    "stakeholder management",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReport {
    pub relevant: Vec<String>,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    /// round(matched / relevant × 100); 0 when nothing in the JD is tracked.
    pub score: u32,
}

/// Matches the tracked keyword list against a resume and a job description.
pub fn match_keywords(resume_text: &str, job_description: &str) -> KeywordReport {
    let resume_lower = resume_text.to_lowercase();
    let relevant = tracked_terms_in(job_description);

    let (matched, missing): (Vec<&str>, Vec<&str>) = relevant
        .iter()
        .copied()
        .partition(|term| contains_term(&resume_lower, term));

    let score = if relevant.is_empty() {
        0
    } else {
        ((matched.len() as f64 / relevant.len() as f64) * 100.0).round() as u32
    };

    KeywordReport {
        relevant: relevant.iter().map(|s| s.to_string()).collect(),
        matched: matched.iter().map(|s| s.to_string()).collect(),
        missing: missing.iter().map(|s| s.to_string()).collect(),
        score,
    }
}

/// Tracked terms that occur in `text`, in list order.
pub fn tracked_terms_in(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    TRACKED_KEYWORDS
        .iter()
        .copied()
        .filter(|term| contains_term(&lower, term))
        .collect()
}

/// Whole-term containment: the characters on either side of a hit must not
/// be alphanumeric, so `java` does not hit inside `javascript`.
/// Both arguments are expected lowercase.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, hit)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + hit.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JD: &str = "We are hiring a Senior Backend Engineer. Required: Rust, PostgreSQL, \
        Docker and Kubernetes. Experience with AWS and CI/CD is a plus. Strong communication skills.";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matched_and_missing_partition_relevant() {
        let resume = "Built Rust services on AWS, deployed with Docker. Great communication.";
        let report = match_keywords(resume, JD);

        assert_eq!(
            report.relevant,
            strings(&["rust", "aws", "docker", "kubernetes", "ci/cd", "postgresql", "communication"])
        );
        assert_eq!(
            report.matched,
            strings(&["rust", "aws", "docker", "communication"])
        );
        assert_eq!(report.missing, strings(&["kubernetes", "ci/cd", "postgresql"]));
        assert_eq!(report.score, 57);
    }

    #[test]
    fn test_output_follows_list_order() {
        let report = match_keywords("", JD);
        let positions: Vec<usize> = report
            .relevant
            .iter()
            .map(|k| TRACKED_KEYWORDS.iter().position(|t| t == k).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_identical_input_yields_identical_report() {
        let resume = "Rust, Docker, Kubernetes";
        assert_eq!(match_keywords(resume, JD), match_keywords(resume, JD));
    }

    #[test]
    fn test_score_is_ratio_of_matched() {
        let report = match_keywords("rust docker", "rust docker kubernetes python");
        assert_eq!(report.relevant.len(), 4);
        assert_eq!(report.matched.len(), 2);
        assert_eq!(report.score, 50);
    }

    #[test]
    fn test_empty_jd_scores_zero() {
        let report = match_keywords("Rust expert", "");
        assert!(report.relevant.is_empty());
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_java_does_not_match_javascript() {
        assert!(!contains_term("senior javascript developer", "java"));
        assert!(contains_term("java and javascript", "java"));
    }

    #[test]
    fn test_symbol_terms_match() {
        assert!(contains_term("experience with c++ and node.js", "c++"));
        assert!(contains_term("experience with c++ and node.js", "node.js"));
        assert!(contains_term("pipelines (ci/cd)", "ci/cd"));
    }

    #[test]
    fn test_case_insensitive_via_match_keywords() {
        let report = match_keywords("KUBERNETES", "kubernetes");
        assert_eq!(report.matched, vec!["kubernetes".to_string()]);
    }

    #[test]
    fn test_rest_not_matched_inside_words() {
        assert!(!contains_term("interested in forestry", "rest"));
        assert!(contains_term("designed rest apis", "rest"));
    }
}
