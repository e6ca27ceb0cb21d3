//! ATS analysis: the hosted model estimates how a resume fares against a JD.
//! Scores are clamped and lists truncated on receipt; any failure degrades to
//! a keyword-derived fallback instead of an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::analysis::keywords::match_keywords;
use crate::analysis::prompts::{ATS_PROMPT_TEMPLATE, ATS_ROLE, MAX_PROMPT_INPUT_CHARS};
use crate::analysis::sanitize::{
    clamp_score, list_field, truncate_chars, MAX_LIST_ITEMS, MAX_SUMMARY_CHARS,
};
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;

const FALLBACK_SECTION_SCORE: u8 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsAnalysis {
    pub ats_score: u8,
    pub keyword_match_score: u8,
    pub formatting_score: u8,
    pub content_score: u8,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub summary: String,
    /// True when the model call failed and scores come from the keyword heuristic.
    pub is_fallback: bool,
}

/// What the model returns, before any trust is applied.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAtsAnalysis {
    ats_score: Value,
    keyword_match_score: Value,
    formatting_score: Value,
    content_score: Value,
    matched_keywords: Value,
    missing_keywords: Value,
    strengths: Value,
    improvements: Value,
    summary: Value,
}

impl From<RawAtsAnalysis> for AtsAnalysis {
    fn from(raw: RawAtsAnalysis) -> Self {
        AtsAnalysis {
            ats_score: clamp_score(&raw.ats_score),
            keyword_match_score: clamp_score(&raw.keyword_match_score),
            formatting_score: clamp_score(&raw.formatting_score),
            content_score: clamp_score(&raw.content_score),
            matched_keywords: list_field(&raw.matched_keywords),
            missing_keywords: list_field(&raw.missing_keywords),
            strengths: list_field(&raw.strengths),
            improvements: list_field(&raw.improvements),
            summary: raw
                .summary
                .as_str()
                .map(|s| truncate_chars(s, MAX_SUMMARY_CHARS))
                .unwrap_or_default(),
            is_fallback: false,
        }
    }
}

/// Runs the ATS analysis. Never fails: model errors yield `fallback_analysis`.
pub async fn analyze_resume(llm: &LlmClient, resume_text: &str, job_description: &str) -> AtsAnalysis {
    let prompt = build_ats_prompt(resume_text, job_description);
    match llm
        .call_json::<RawAtsAnalysis>(&prompt, &json_system(ATS_ROLE))
        .await
    {
        Ok(raw) => AtsAnalysis::from(raw),
        Err(e) => {
            warn!("ATS analysis fell back to keyword heuristic: {e}");
            fallback_analysis(resume_text, job_description)
        }
    }
}

fn build_ats_prompt(resume_text: &str, job_description: &str) -> String {
    let job_description = if job_description.trim().is_empty() {
        "(none provided: assess general ATS readiness)"
    } else {
        job_description
    };
    fill_template(
        ATS_PROMPT_TEMPLATE,
        &[
            ("resume_text", truncate_chars(resume_text, MAX_PROMPT_INPUT_CHARS).as_str()),
            ("job_description", truncate_chars(job_description, MAX_PROMPT_INPUT_CHARS).as_str()),
        ],
    )
}

/// Default object returned when the model is unavailable.
pub fn fallback_analysis(resume_text: &str, job_description: &str) -> AtsAnalysis {
    let report = match_keywords(resume_text, job_description);
    let keyword_score = report.score.min(100) as u8;

    let mut improvements: Vec<String> = report
        .missing
        .iter()
        .take(MAX_LIST_ITEMS)
        .map(|kw| format!("Add evidence of '{kw}' if you have it"))
        .collect();
    if improvements.is_empty() {
        improvements.push("Run the analysis again later for detailed feedback".to_string());
    }

    AtsAnalysis {
        ats_score: keyword_score,
        keyword_match_score: keyword_score,
        formatting_score: FALLBACK_SECTION_SCORE,
        content_score: FALLBACK_SECTION_SCORE,
        matched_keywords: report.matched.into_iter().take(MAX_LIST_ITEMS).collect(),
        missing_keywords: report.missing.into_iter().take(MAX_LIST_ITEMS).collect(),
        strengths: vec![],
        improvements,
        summary: "Detailed analysis is temporarily unavailable; scores are estimated from keyword coverage.".to_string(),
        is_fallback: true,
    }
}
