//! Bullet feedback: flags experience highlights that state activity without
//! a measurable outcome.

use serde::{Deserialize, Serialize};

use crate::resumes::content::ResumeContent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletFeedback {
    pub company: String,
    pub bullet: String,
    pub reason: String,
    pub suggestion: String,
}

const VAGUE_VERBS: &[&str] = &[
    "improved",
    "enhanced",
    "helped",
    "worked on",
    "assisted",
    "supported",
    "participated",
    "involved",
    "responsible for",
];

const VAGUE_SCALE_WORDS: &[&str] = &[
    "significant",
    "major",
    "large",
    "huge",
    "massive",
    "substantial",
    "considerable",
    "many",
    "numerous",
    "various",
    "several",
];

/// A bullet counts as quantified if it carries any number, percentage,
/// currency or an `~N` estimate.
pub fn is_quantified(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        || text.contains('%')
        || text.contains('$')
        || text.contains('€')
        || text.contains('£')
        || text.contains('₹')
}

/// Reviews a single highlight. `None` means it reads fine.
pub fn review_bullet(text: &str) -> Option<(String, String)> {
    if is_quantified(text) {
        return None;
    }
    let lower = text.to_lowercase();

    if let Some(verb) = VAGUE_VERBS.iter().find(|v| lower.contains(**v)) {
        return Some((
            format!("Uses vague verb '{verb}' without a measurable result"),
            format!("Replace '{verb}' with a concrete action and add the outcome: by how much, how many, how fast?"),
        ));
    }
    if let Some(word) = VAGUE_SCALE_WORDS.iter().find(|w| lower.contains(**w)) {
        return Some((
            format!("Uses vague scale word '{word}' instead of a number"),
            format!("Replace '{word}' with a specific figure, e.g. '5x', '40%', '3 weeks'"),
        ));
    }
    Some((
        "No quantified outcome found".to_string(),
        "Add a metric: a number, percentage, amount of money or time saved".to_string(),
    ))
}

/// Reviews every experience highlight in a resume.
pub fn review_content(content: &ResumeContent) -> Vec<BulletFeedback> {
    content
        .experience
        .iter()
        .flat_map(|exp| {
            exp.highlights.iter().filter_map(move |bullet| {
                review_bullet(bullet).map(|(reason, suggestion)| BulletFeedback {
                    company: exp.company.clone(),
                    bullet: bullet.clone(),
                    reason,
                    suggestion,
                })
            })
        })
        .collect()
}
