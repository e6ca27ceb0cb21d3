//! Generate: the model drafts resume sections from a free-text background.
//! Contact details come from the request, never from the model.

use serde::Deserialize;

use crate::analysis::prompts::{GENERATE_PROMPT_TEMPLATE, GENERATE_ROLE, MAX_PROMPT_INPUT_CHARS};
use crate::analysis::sanitize::truncate_chars;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::resumes::content::{
    null_as_default, optional_text, text_list, EducationEntry, ExperienceEntry, PersonalInfo,
    ProjectEntry, ResumeContent,
};

const MIN_BACKGROUND_WORDS: usize = 10;

/// Request body for `POST /api/v1/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub title: String,
    pub personal_info: PersonalInfo,
    pub background: String,
    pub target_job_title: String,
    pub target_company: Option<String>,
    pub job_description: Option<String>,
}

impl GenerateRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.target_job_title.trim().is_empty() {
            return Err(AppError::Validation("target_job_title is required".to_string()));
        }
        if self.background.split_whitespace().count() < MIN_BACKGROUND_WORDS {
            return Err(AppError::Validation(format!(
                "background must describe your experience in at least {MIN_BACKGROUND_WORDS} words"
            )));
        }
        Ok(())
    }

    fn target(&self) -> String {
        match self.target_company.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(company) => format!("{} at {}", self.target_job_title.trim(), company),
            None => self.target_job_title.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDraft {
    #[serde(deserialize_with = "optional_text")]
    summary: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    experience: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "null_as_default")]
    education: Vec<EducationEntry>,
    #[serde(deserialize_with = "text_list")]
    skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    projects: Vec<ProjectEntry>,
}

pub async fn draft_content(llm: &LlmClient, request: &GenerateRequest) -> Result<ResumeContent, AppError> {
    let target = request.target();
    let background = truncate_chars(&request.background, MAX_PROMPT_INPUT_CHARS);
    let job_description = truncate_chars(
        request.job_description.as_deref().unwrap_or_default(),
        MAX_PROMPT_INPUT_CHARS,
    );
    let prompt = fill_template(
        GENERATE_PROMPT_TEMPLATE,
        &[
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("target", target.as_str()),
            ("background", background.as_str()),
            ("job_description", job_description.as_str()),
        ],
    );

    let raw = llm
        .call_json::<RawDraft>(&prompt, &json_system(GENERATE_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Resume generation failed: {e}")))?;

    assemble_draft(request.personal_info.clone(), raw)
}

fn assemble_draft(mut personal_info: PersonalInfo, raw: RawDraft) -> Result<ResumeContent, AppError> {
    if personal_info.summary.as_deref().map_or(true, |s| s.trim().is_empty()) {
        personal_info.summary = raw.summary;
    }

    let mut content = ResumeContent {
        personal_info,
        experience: raw.experience,
        education: raw.education,
        skills: raw.skills,
        projects: raw.projects,
    };
    content.retain_complete_entries();
    content.normalize();
    content.validate()?;
    Ok(content)
}
