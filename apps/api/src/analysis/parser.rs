//! Structures raw resume text (from an upload) into `ResumeContent`.

use crate::analysis::prompts::{MAX_PROMPT_INPUT_CHARS, PARSE_PROMPT_TEMPLATE, PARSE_ROLE};
use crate::analysis::sanitize::truncate_chars;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, json_system};
use crate::llm_client::LlmClient;
use crate::resumes::content::ResumeContent;

pub async fn structure_resume_text(llm: &LlmClient, resume_text: &str) -> Result<ResumeContent, AppError> {
    let prompt = fill_template(
        PARSE_PROMPT_TEMPLATE,
        &[("resume_text", truncate_chars(resume_text, MAX_PROMPT_INPUT_CHARS).as_str())],
    );
    let parsed = llm
        .call_json::<ResumeContent>(&prompt, &json_system(PARSE_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Resume parsing failed: {e}")))?;

    finalize_parsed(parsed)
}

fn finalize_parsed(mut content: ResumeContent) -> Result<ResumeContent, AppError> {
    content.retain_complete_entries();
    content.normalize();
    if content.personal_info.full_name.is_empty() || !content.personal_info.email.contains('@') {
        return Err(AppError::UnprocessableEntity(
            "Could not find a name and email address in the uploaded resume".to_string(),
        ));
    }
    content.validate()?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_resume_is_cleaned() {
        let content: ResumeContent = serde_json::from_str(
            r#"{
                "personal_info": {"full_name": " Alan Turing ", "email": "alan@example.com", "phone": ""},
                "experience": [{"company": "Bletchley Park", "position": "Cryptanalyst", "highlights": ["Broke Enigma", ""]}],
                "education": [{"institution": "", "degree": "PhD"}]
            }"#,
        )
        .unwrap();
        let content = finalize_parsed(content).unwrap();
        assert_eq!(content.personal_info.full_name, "Alan Turing");
        assert_eq!(content.personal_info.phone, None);
        assert_eq!(content.experience[0].highlights, vec!["Broke Enigma"]);
        assert!(content.education.is_empty());
    }

    #[test]
    fn test_missing_contact_is_unprocessable() {
        let content: ResumeContent =
            serde_json::from_str(r#"{"personal_info": {"full_name": "Anonymous"}}"#).unwrap();
        assert!(matches!(
            finalize_parsed(content),
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[test]
    fn test_null_scalars_from_model_are_accepted() {
        let content: ResumeContent = serde_json::from_str(
            r#"{
                "personal_info": {"full_name": "Alan Turing", "email": "alan@example.com", "phone": null, "linkedin": null},
                "experience": [{"company": "NPL", "position": "Scientist", "start_date": 1945, "end_date": null, "current": null, "highlights": null}],
                "education": [{"institution": "King's College", "degree": null, "field": null, "gpa": 4}],
                "skills": ["Mathematics", null],
                "projects": [{"name": "ACE", "description": null, "technologies": null, "link": null}]
            }"#,
        )
        .unwrap();
        let content = finalize_parsed(content).unwrap();
        assert_eq!(content.experience[0].start_date.as_deref(), Some("1945"));
        assert!(!content.experience[0].current);
        assert_eq!(content.education[0].degree, "");
        assert_eq!(content.education[0].gpa.as_deref(), Some("4"));
        assert_eq!(content.skills, vec!["Mathematics"]);
        assert_eq!(content.projects[0].name, "ACE");
    }
}
