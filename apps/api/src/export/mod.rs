//! Export: renders `ResumeContent` to PDF, Word-compatible HTML (`.docx`)
//! or plain text. Each renderer walks the sections in the same order.

pub mod docx;
pub mod handlers;
pub mod metrics;
pub mod pdf;
pub mod text;

use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::resumes::content::{EducationEntry, ExperienceEntry, ResumeContent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Docx,
    Txt,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Txt => "txt",
        }
    }
}

/// `?format=` on download routes; PDF when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

pub fn render(content: &ResumeContent, title: &str, format: ExportFormat) -> Result<Vec<u8>, AppError> {
    match format {
        ExportFormat::Pdf => pdf::render_pdf(content, title),
        ExportFormat::Docx => Ok(docx::render_docx(content, title).into_bytes()),
        ExportFormat::Txt => Ok(text::render_text(content).into_bytes()),
    }
}

/// Builds the attachment response for a rendered document.
pub fn attachment(bytes: Vec<u8>, title: &str, format: ExportFormat) -> Response {
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}.{}\"",
                    filename_slug(title),
                    format.extension()
                ),
            ),
        ],
        Body::from(bytes),
    )
        .into_response()
}

/// ASCII alphanumerics joined by single dashes, lowercase; `resume` if
/// nothing usable is left.
pub fn filename_slug(title: &str) -> String {
    let slug = title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_ascii_lowercase();
    let slug: String = slug.chars().take(80).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "resume".to_string()
    } else {
        slug.to_string()
    }
}

/// The contact items shown under the name, in display order.
pub(crate) fn contact_items(content: &ResumeContent) -> Vec<&str> {
    let info = &content.personal_info;
    let mut items = vec![info.email.as_str()];
    for field in [&info.phone, &info.location, &info.linkedin, &info.website] {
        if let Some(value) = field {
            items.push(value.as_str());
        }
    }
    items.retain(|s| !s.is_empty());
    items
}

pub(crate) fn date_range(start: Option<&str>, end: Option<&str>, current: bool) -> Option<String> {
    let end = if current { Some("Present") } else { end };
    match (start, end) {
        (Some(start), Some(end)) => Some(format!("{start} – {end}")),
        (Some(start), None) => Some(start.to_string()),
        (None, Some(end)) => Some(end.to_string()),
        (None, None) => None,
    }
}

pub(crate) fn experience_heading(exp: &ExperienceEntry) -> String {
    format!("{}, {}", exp.position, exp.company)
}

/// Location and dates for an experience entry, joined for a single line.
pub(crate) fn experience_meta(exp: &ExperienceEntry) -> Option<String> {
    let dates = date_range(exp.start_date.as_deref(), exp.end_date.as_deref(), exp.current);
    let parts: Vec<String> = [exp.location.clone(), dates].into_iter().flatten().collect();
    (!parts.is_empty()).then(|| parts.join(" | "))
}

/// "Degree in Field, Institution (dates), GPA x" with absent parts skipped.
pub(crate) fn education_line(edu: &EducationEntry) -> String {
    let degree = match &edu.field {
        Some(field) if !edu.degree.is_empty() => format!("{} in {field}", edu.degree),
        Some(field) => field.clone(),
        None => edu.degree.clone(),
    };
    let mut line = if degree.is_empty() {
        edu.institution.clone()
    } else {
        format!("{degree}, {}", edu.institution)
    };
    if let Some(dates) = date_range(edu.start_date.as_deref(), edu.end_date.as_deref(), false) {
        line.push_str(&format!(" ({dates})"));
    }
    if let Some(gpa) = &edu.gpa {
        line.push_str(&format!(", GPA {gpa}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resumes::content::fixtures::sample_content;

    #[test]
    fn test_slug_sanitizes_title() {
        assert_eq!(filename_slug("Senior Backend Engineer (2024)"), "senior-backend-engineer-2024");
        assert_eq!(filename_slug("../../etc/passwd"), "etc-passwd");
        assert_eq!(filename_slug("\"quoted\"\r\nX-Injected: 1"), "quoted-x-injected-1");
    }

    #[test]
    fn test_slug_falls_back_to_resume() {
        assert_eq!(filename_slug(""), "resume");
        assert_eq!(filename_slug("简历"), "resume");
        assert_eq!(filename_slug("---"), "resume");
    }

    #[test]
    fn test_format_parses_lowercase() {
        let query: ExportQuery = serde_json::from_str(r#"{"format":"docx"}"#).unwrap();
        assert_eq!(query.format, ExportFormat::Docx);
        let query: ExportQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.format, ExportFormat::Pdf);
        assert!(serde_json::from_str::<ExportQuery>(r#"{"format":"odt"}"#).is_err());
    }

    #[test]
    fn test_attachment_headers() {
        let response = attachment(b"hi".to_vec(), "My CV", ExportFormat::Txt);
        let headers = response.headers();
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"my-cv.txt\""
        );
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
    }

    #[test]
    fn test_current_role_ends_present() {
        assert_eq!(
            date_range(Some("2020-01"), Some("2021-01"), true).as_deref(),
            Some("2020-01 – Present")
        );
        assert_eq!(date_range(None, None, false), None);
        let meta = experience_meta(&sample_content().experience[0]).unwrap();
        assert_eq!(meta, "Remote | 2020-01 – Present");
    }
}
