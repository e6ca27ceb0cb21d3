//! Candidate matching: pluggable, trait-based scorer that measures a
//! candidate's resume text against a recruiter's job requirements.
//!
//! `KeywordCandidateMatcher` is pure and deterministic. `LlmCandidateMatcher`
//! asks the hosted model and degrades to the keyword matcher per candidate.
//! `AppState` holds an `Arc<dyn CandidateMatcher>`, chosen at startup.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::analysis::keywords::{contains_term, tracked_terms_in};
use crate::analysis::prompts::{MATCH_PROMPT_TEMPLATE, MATCH_ROLE, MAX_PROMPT_INPUT_CHARS};
use crate::analysis::sanitize::{clamp_score, list_field, truncate_chars, MAX_SUMMARY_CHARS};
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;

/// One candidate's result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub candidate: String, // uploaded file name
    pub score: u8,         // 0 – 100
    pub matched_requirements: Vec<String>,
    pub missing_requirements: Vec<String>,
    pub summary: String,
    pub matcher_backend: String, // "keyword" | "llm"
}

/// Implement this to swap backends without touching the handler.
#[async_trait]
pub trait CandidateMatcher: Send + Sync {
    async fn score(&self, candidate: &str, resume_text: &str, requirements: &str) -> CandidateMatch;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordCandidateMatcher
// ────────────────────────────────────────────────────────────────────────────

pub struct KeywordCandidateMatcher;

#[async_trait]
impl CandidateMatcher for KeywordCandidateMatcher {
    async fn score(&self, candidate: &str, resume_text: &str, requirements: &str) -> CandidateMatch {
        keyword_match(candidate, resume_text, requirements)
    }
}

fn keyword_match(candidate: &str, resume_text: &str, requirements: &str) -> CandidateMatch {
    let resume_lower = resume_text.to_lowercase();
    let terms = tracked_terms_in(requirements);

    let (matched, missing): (Vec<&str>, Vec<&str>) = terms
        .iter()
        .copied()
        .partition(|term| contains_term(&resume_lower, term));

    let score = if terms.is_empty() {
        0
    } else {
        ((matched.len() as f64 / terms.len() as f64) * 100.0).round() as u8
    };
    let summary = if terms.is_empty() {
        "No tracked skills found in the requirements; keyword screening is not meaningful."
            .to_string()
    } else {
        format!(
            "Covers {} of {} tracked requirement keywords.",
            matched.len(),
            terms.len()
        )
    };

    CandidateMatch {
        candidate: candidate.to_string(),
        score,
        matched_requirements: matched.into_iter().map(String::from).collect(),
        missing_requirements: missing.into_iter().map(String::from).collect(),
        summary,
        matcher_backend: "keyword".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmCandidateMatcher
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmCandidateMatcher(pub LlmClient);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCandidateMatch {
    score: Value,
    matched_requirements: Value,
    missing_requirements: Value,
    summary: Value,
}

#[async_trait]
impl CandidateMatcher for LlmCandidateMatcher {
    async fn score(&self, candidate: &str, resume_text: &str, requirements: &str) -> CandidateMatch {
        let prompt = fill_template(
            MATCH_PROMPT_TEMPLATE,
            &[
                ("requirements", truncate_chars(requirements, MAX_PROMPT_INPUT_CHARS).as_str()),
                ("resume_text", truncate_chars(resume_text, MAX_PROMPT_INPUT_CHARS).as_str()),
            ],
        );

        match self
            .0
            .call_json::<RawCandidateMatch>(&prompt, &json_system(MATCH_ROLE))
            .await
        {
            Ok(raw) => from_raw(candidate, raw),
            Err(e) => {
                warn!("Candidate match for '{candidate}' fell back to keywords: {e}");
                keyword_match(candidate, resume_text, requirements)
            }
        }
    }
}

fn from_raw(candidate: &str, raw: RawCandidateMatch) -> CandidateMatch {
    CandidateMatch {
        candidate: candidate.to_string(),
        score: clamp_score(&raw.score),
        matched_requirements: list_field(&raw.matched_requirements),
        missing_requirements: list_field(&raw.missing_requirements),
        summary: raw
            .summary
            .as_str()
            .map(|s| truncate_chars(s, MAX_SUMMARY_CHARS))
            .unwrap_or_default(),
        matcher_backend: "llm".to_string(),
    }
}

/// Orders candidates by score, highest first; ties by name for stable output.
pub fn rank_candidates(mut matches: Vec<CandidateMatch>) -> Vec<CandidateMatch> {
    matches.sort_by(|a, b| match b.score.cmp(&a.score) {
        Ordering::Equal => a.candidate.cmp(&b.candidate),
        other => other,
    });
    matches
}
