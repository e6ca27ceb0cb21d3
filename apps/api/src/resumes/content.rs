//! Structured resume content: the plain-old-data record every feature reads
//! and writes (CRUD, LLM prompts, exports, templates).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::AppError;

pub const MAX_TITLE_CHARS: usize = 200;
const MAX_SECTION_ITEMS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    #[serde(deserialize_with = "text")]
    pub full_name: String,
    #[serde(deserialize_with = "text")]
    pub email: String,
    #[serde(deserialize_with = "optional_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub linkedin: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub website: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    #[serde(deserialize_with = "text")]
    pub company: String,
    #[serde(deserialize_with = "text")]
    pub position: String,
    #[serde(deserialize_with = "optional_text")]
    pub location: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub current: bool,
    #[serde(deserialize_with = "text_list")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    #[serde(deserialize_with = "text")]
    pub institution: String,
    #[serde(deserialize_with = "text")]
    pub degree: String,
    #[serde(deserialize_with = "optional_text")]
    pub field: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "optional_text")]
    pub gpa: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectEntry {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "text")]
    pub description: String,
    #[serde(deserialize_with = "text_list")]
    pub technologies: Vec<String>,
    #[serde(deserialize_with = "optional_text")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeContent {
    #[serde(deserialize_with = "null_as_default")]
    pub personal_info: PersonalInfo,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(deserialize_with = "text_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectEntry>,
}

impl ResumeContent {
    /// Checks the minimum shape a resume needs before it is persisted.
    pub fn validate(&self) -> Result<(), AppError> {
        let info = &self.personal_info;
        if info.full_name.trim().is_empty() {
            return Err(AppError::Validation(
                "personal_info.full_name is required".to_string(),
            ));
        }
        if !info.email.contains('@') {
            return Err(AppError::Validation(
                "personal_info.email must be a valid email address".to_string(),
            ));
        }

        for (i, exp) in self.experience.iter().enumerate() {
            if exp.company.trim().is_empty() || exp.position.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "experience[{i}] needs both company and position"
                )));
            }
        }
        for (i, edu) in self.education.iter().enumerate() {
            if edu.institution.trim().is_empty() {
                return Err(AppError::Validation(format!(
                    "education[{i}].institution is required"
                )));
            }
        }

        let oversized = [
            ("experience", self.experience.len()),
            ("education", self.education.len()),
            ("skills", self.skills.len()),
            ("projects", self.projects.len()),
        ]
        .into_iter()
        .find(|(_, len)| *len > MAX_SECTION_ITEMS);
        if let Some((section, len)) = oversized {
            return Err(AppError::Validation(format!(
                "{section} has {len} items; at most {MAX_SECTION_ITEMS} are allowed"
            )));
        }

        Ok(())
    }

    /// Trims whitespace and drops empty list items in place.
    pub fn normalize(&mut self) {
        let info = &mut self.personal_info;
        info.full_name = info.full_name.trim().to_string();
        info.email = info.email.trim().to_string();
        for field in [
            &mut info.phone,
            &mut info.location,
            &mut info.linkedin,
            &mut info.website,
            &mut info.summary,
        ] {
            normalize_optional(field);
        }

        for exp in &mut self.experience {
            exp.company = exp.company.trim().to_string();
            exp.position = exp.position.trim().to_string();
            normalize_list(&mut exp.highlights);
            if exp.current {
                exp.end_date = None;
            }
        }
        for edu in &mut self.education {
            edu.institution = edu.institution.trim().to_string();
            edu.degree = edu.degree.trim().to_string();
        }
        normalize_list(&mut self.skills);
        let mut seen = std::collections::HashSet::new();
        self.skills.retain(|s| seen.insert(s.to_lowercase()));
        for project in &mut self.projects {
            project.name = project.name.trim().to_string();
            project.description = project.description.trim().to_string();
            normalize_list(&mut project.technologies);
        }
        self.projects.retain(|p| !p.name.is_empty());
    }

    /// Drops experience/education entries missing the fields `validate`
    /// requires. Used on model output, where partial entries are common.
    pub fn retain_complete_entries(&mut self) {
        self.experience
            .retain(|e| !e.company.trim().is_empty() && !e.position.trim().is_empty());
        self.education.retain(|e| !e.institution.trim().is_empty());
    }

    /// Flattens the resume into text for keyword matching and LLM prompts.
    pub fn to_plain_text(&self) -> String {
        let mut out = Vec::new();
        let info = &self.personal_info;
        out.push(info.full_name.clone());
        if let Some(summary) = &info.summary {
            out.push(summary.clone());
        }
        for exp in &self.experience {
            out.push(format!("{} at {}", exp.position, exp.company));
            out.extend(exp.highlights.iter().cloned());
        }
        for edu in &self.education {
            let mut line = format!("{} {}", edu.degree, edu.institution);
            if let Some(field) = &edu.field {
                line.push(' ');
                line.push_str(field);
            }
            out.push(line);
        }
        if !self.skills.is_empty() {
            out.push(self.skills.join(", "));
        }
        for project in &self.projects {
            out.push(format!("{}: {}", project.name, project.description));
            if !project.technologies.is_empty() {
                out.push(project.technologies.join(", "));
            }
        }
        out.retain(|line| !line.trim().is_empty());
        out.join("\n")
    }
}

/// Validates a resume/template title.
pub fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

/// Trims an optional request field; blank becomes `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn normalize_optional(field: &mut Option<String>) {
    *field = non_empty(field.take());
}

fn normalize_list(items: &mut Vec<String>) {
    for item in items.iter_mut() {
        *item = item.trim().to_string();
    }
    items.retain(|s| !s.is_empty());
}

// Model output uses `null` for unknown fields and sometimes emits numbers
// (GPA, graduation year) where text is expected.

fn scalar_text<E: serde::de::Error>(value: Option<Value>) -> Result<Option<String>, E> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(E::custom(format!("expected text, found {other}"))),
    }
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Option::<Value>::deserialize(deserializer)?)
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

pub fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if let Some(text) = scalar_text::<D::Error>(Some(item))? {
            out.push(text);
        }
    }
    Ok(out)
}

pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn sample_content() -> ResumeContent {
        ResumeContent {
            personal_info: PersonalInfo {
                full_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: Some("+44 20 0000 0000".to_string()),
                location: Some("London".to_string()),
                linkedin: None,
                website: None,
                summary: Some("Backend engineer focused on Rust and PostgreSQL services.".to_string()),
            },
            experience: vec![ExperienceEntry {
                company: "Analytical Engines Ltd".to_string(),
                position: "Senior Software Engineer".to_string(),
                location: Some("Remote".to_string()),
                start_date: Some("2020-01".to_string()),
                end_date: None,
                current: true,
                highlights: vec![
                    "Cut API p99 latency by 40% by moving hot paths to Rust".to_string(),
                    "Worked on the Docker based deployment pipeline".to_string(),
                ],
            }],
            education: vec![EducationEntry {
                institution: "University of London".to_string(),
                degree: "BSc".to_string(),
                field: Some("Mathematics".to_string()),
                start_date: None,
                end_date: Some("2015".to_string()),
                gpa: None,
            }],
            skills: vec!["Rust".to_string(), "SQL".to_string(), "AWS".to_string()],
            projects: vec![ProjectEntry {
                name: "Difference Engine".to_string(),
                description: "Tabulates polynomials".to_string(),
                technologies: vec!["Rust".to_string()],
                link: None,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_content;
    use super::*;

    #[test]
    fn test_sample_content_is_valid() {
        assert!(sample_content().validate().is_ok());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let mut content = sample_content();
        content.personal_info.full_name = "   ".to_string();
        assert!(matches!(content.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        let mut content = sample_content();
        content.personal_info.email = "ada.example.com".to_string();
        assert!(content.validate().is_err());
    }

    #[test]
    fn test_experience_requires_company_and_position() {
        let mut content = sample_content();
        content.experience[0].position.clear();
        let err = content.validate().unwrap_err();
        assert!(err.to_string().contains("experience[0]"));
    }

    #[test]
    fn test_normalize_trims_and_dedups_skills() {
        let mut content = sample_content();
        content.skills = vec![" Rust ".into(), "rust".into(), "".into(), "Go".into()];
        content.personal_info.phone = Some("  ".into());
        content.normalize();
        assert_eq!(content.skills, vec!["Rust".to_string(), "Go".to_string()]);
        assert_eq!(content.personal_info.phone, None);
    }

    #[test]
    fn test_normalize_clears_end_date_for_current_role() {
        let mut content = sample_content();
        content.experience[0].end_date = Some("2024-01".into());
        content.normalize();
        assert_eq!(content.experience[0].end_date, None);
    }

    #[test]
    fn test_plain_text_includes_every_section() {
        let text = sample_content().to_plain_text();
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("Senior Software Engineer at Analytical Engines Ltd"));
        assert!(text.contains("Rust, SQL, AWS"));
        assert!(text.contains("Difference Engine"));
        assert!(text.contains("Mathematics"));
    }

    #[test]
    fn test_partial_json_deserializes_with_defaults() {
        let content: ResumeContent = serde_json::from_str(
            r#"{"personal_info": {"full_name": "Grace", "email": "g@x.io"}}"#,
        )
        .unwrap();
        assert!(content.experience.is_empty());
        assert!(content.validate().is_ok());
    }

    #[test]
    fn test_null_and_numeric_fields_are_tolerated() {
        let content: ResumeContent = serde_json::from_str(
            r#"{
                "personal_info": {"full_name": "Grace", "email": "g@x.io", "phone": null, "summary": null},
                "experience": [{"company": "Navy", "position": "Officer", "current": null, "highlights": null, "end_date": 1986}],
                "education": [{"institution": "Yale", "degree": null, "gpa": 3.8, "end_date": 1934}],
                "skills": ["COBOL", null, 42],
                "projects": [{"name": "FLOW-MATIC", "description": null, "technologies": null}]
            }"#,
        )
        .unwrap();
        let exp = &content.experience[0];
        assert!(!exp.current);
        assert!(exp.highlights.is_empty());
        assert_eq!(exp.end_date.as_deref(), Some("1986"));
        let edu = &content.education[0];
        assert_eq!(edu.degree, "");
        assert_eq!(edu.gpa.as_deref(), Some("3.8"));
        assert_eq!(content.skills, vec!["COBOL".to_string(), "42".to_string()]);
        assert_eq!(content.projects[0].description, "");
        assert!(content.validate().is_ok());
    }

    #[test]
    fn test_null_sections_become_empty() {
        let content: ResumeContent = serde_json::from_str(
            r#"{"personal_info": null, "experience": null, "skills": null}"#,
        )
        .unwrap();
        assert_eq!(content, ResumeContent::default());
    }

    #[test]
    fn test_nested_objects_are_not_text() {
        let result = serde_json::from_str::<PersonalInfo>(r#"{"full_name": {"first": "Ada"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_content_round_trips() {
        let content = sample_content();
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(serde_json::from_value::<ResumeContent>(value).unwrap(), content);
    }

    #[test]
    fn test_retain_complete_entries_drops_partials() {
        let mut content = sample_content();
        content.experience.push(ExperienceEntry {
            company: "".into(),
            position: "Intern".into(),
            ..Default::default()
        });
        content.education.push(EducationEntry::default());
        content.retain_complete_entries();
        assert_eq!(content.experience.len(), 1);
        assert_eq!(content.education.len(), 1);
        assert!(content.validate().is_ok());
    }

    #[test]
    fn test_title_validation() {
        assert_eq!(validate_title("  Backend CV ").unwrap(), "Backend CV");
        assert!(validate_title("").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_CHARS + 1)).is_err());
    }
}
