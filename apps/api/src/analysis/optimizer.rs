//! Optimize: the model tailors an existing resume to a job description.
//!
//! Identity fields always come from the original: the model may rephrase
//! highlights, skills, summary and project descriptions, never who, where or when.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::prompts::{MAX_PROMPT_INPUT_CHARS, OPTIMIZE_PROMPT_TEMPLATE, OPTIMIZE_ROLE};
use crate::analysis::sanitize::{list_field, truncate_chars};
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::resumes::content::ResumeContent;

#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    pub content: ResumeContent,
    pub changes: Vec<String>,
    pub added_keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOptimization {
    content: Option<ResumeContent>,
    changes: Value,
    added_keywords: Value,
}

pub async fn optimize_content(
    llm: &LlmClient,
    original: &ResumeContent,
    job_description: &str,
) -> Result<OptimizationResult, AppError> {
    let content_json = serde_json::to_string_pretty(original)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize resume: {e}")))?;
    let prompt = fill_template(
        OPTIMIZE_PROMPT_TEMPLATE,
        &[
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("content_json", content_json.as_str()),
            (
                "job_description",
                truncate_chars(job_description, MAX_PROMPT_INPUT_CHARS).as_str(),
            ),
        ],
    );

    let raw = llm
        .call_json::<RawOptimization>(&prompt, &json_system(OPTIMIZE_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Resume optimization failed: {e}")))?;

    finalize_optimization(original, raw)
}

fn finalize_optimization(
    original: &ResumeContent,
    raw: RawOptimization,
) -> Result<OptimizationResult, AppError> {
    let proposed = raw
        .content
        .ok_or_else(|| AppError::Llm("Optimization response had no content".to_string()))?;

    let mut content = merge_rewrites(original, proposed);
    content.normalize();
    content.validate()?;

    Ok(OptimizationResult {
        content,
        changes: list_field(&raw.changes),
        added_keywords: list_field(&raw.added_keywords),
    })
}

/// Starts from the original and takes only the rewritable fields from the
/// proposal, matching entries by position.
fn merge_rewrites(original: &ResumeContent, proposed: ResumeContent) -> ResumeContent {
    let mut merged = original.clone();

    if let Some(summary) = proposed.personal_info.summary.filter(|s| !s.trim().is_empty()) {
        merged.personal_info.summary = Some(summary);
    }

    for (entry, rewrite) in merged.experience.iter_mut().zip(proposed.experience) {
        if rewrite.highlights.iter().any(|h| !h.trim().is_empty()) {
            entry.highlights = rewrite.highlights;
        }
    }

    for (project, rewrite) in merged.projects.iter_mut().zip(proposed.projects) {
        if !rewrite.description.trim().is_empty() {
            project.description = rewrite.description;
        }
        if !rewrite.technologies.is_empty() {
            project.technologies = rewrite.technologies;
        }
    }

    if !proposed.skills.is_empty() {
        merged.skills = proposed.skills;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resumes::content::fixtures::sample_content;
    use serde_json::json;

    fn raw_with(content: ResumeContent) -> RawOptimization {
        RawOptimization {
            content: Some(content),
            changes: json!(["Reworded summary"]),
            added_keywords: json!(["kubernetes"]),
        }
    }

    #[test]
    fn test_identity_fields_are_restored() {
        let original = sample_content();
        let mut proposed = original.clone();
        proposed.personal_info.email = "attacker@example.com".into();
        proposed.personal_info.full_name = "Someone Else".into();
        proposed.experience[0].company = "Bigger Co".into();
        proposed.experience[0].position = "CTO".into();
        proposed.education[0].degree = "PhD".into();

        let result = finalize_optimization(&original, raw_with(proposed)).unwrap();
        assert_eq!(result.content.personal_info.email, "ada@example.com");
        assert_eq!(result.content.personal_info.full_name, "Ada Lovelace");
        assert_eq!(result.content.experience[0].company, "Analytical Engines Ltd");
        assert_eq!(result.content.experience[0].position, "Senior Software Engineer");
        assert_eq!(result.content.education[0].degree, "BSc");
    }

    #[test]
    fn test_rewritable_fields_are_taken() {
        let original = sample_content();
        let mut proposed = original.clone();
        proposed.personal_info.summary = Some("Rust backend engineer shipping Kubernetes services.".into());
        proposed.experience[0].highlights = vec!["Led migration to Kubernetes, cutting deploy time 60%".into()];
        proposed.skills = vec!["Rust".into(), "Kubernetes".into()];

        let result = finalize_optimization(&original, raw_with(proposed)).unwrap();
        assert!(result.content.personal_info.summary.unwrap().contains("Kubernetes"));
        assert_eq!(result.content.experience[0].highlights.len(), 1);
        assert_eq!(result.content.skills, vec!["Rust", "Kubernetes"]);
        assert_eq!(result.changes, vec!["Reworded summary"]);
        assert_eq!(result.added_keywords, vec!["kubernetes"]);
    }

    #[test]
    fn test_dropped_entries_keep_originals() {
        let original = sample_content();
        let mut proposed = original.clone();
        proposed.experience.clear();
        proposed.skills.clear();

        let result = finalize_optimization(&original, raw_with(proposed)).unwrap();
        assert_eq!(result.content.experience, original.experience);
        assert_eq!(result.content.skills, original.skills);
    }

    #[test]
    fn test_missing_content_is_llm_error() {
        let raw = RawOptimization::default();
        assert!(matches!(
            finalize_optimization(&sample_content(), raw),
            Err(AppError::Llm(_))
        ));
    }

    #[test]
    fn test_null_fields_in_proposal_keep_originals() {
        let original = sample_content();
        let raw: RawOptimization = serde_json::from_value(json!({
            "content": {
                "personal_info": {"full_name": null, "email": null, "summary": null},
                "experience": [{"company": null, "position": null, "highlights": null, "current": null}],
                "education": [{"institution": "University of London", "degree": null, "gpa": 3.9}],
                "skills": null,
                "projects": [{"name": null, "description": null, "technologies": null}]
            },
            "changes": null,
            "added_keywords": ["rust"]
        }))
        .unwrap();

        let result = finalize_optimization(&original, raw).unwrap();
        assert_eq!(result.content.personal_info, original.personal_info);
        assert_eq!(result.content.experience, original.experience);
        assert_eq!(result.content.skills, original.skills);
        assert_eq!(result.content.projects, original.projects);
        assert!(result.changes.is_empty());
    }
}
