//! Multipart intake and text extraction for uploaded resumes.

use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
}

impl FileKind {
    /// Detects the kind from the file extension, then the declared content type.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);
        match extension.as_deref() {
            Some("pdf") => return Some(FileKind::Pdf),
            Some("txt") => return Some(FileKind::Text),
            _ => {}
        }
        match content_type {
            Some("application/pdf") => Some(FileKind::Pdf),
            Some(ct) if ct.starts_with("text/plain") => Some(FileKind::Text),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Text => "txt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            FileKind::Pdf => "application/pdf",
            FileKind::Text => "text/plain; charset=utf-8",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub kind: FileKind,
    pub bytes: Bytes,
}

/// A fully buffered multipart form: text fields by name, files in upload order.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<(String, UploadedFile)>,
}

impl UploadForm {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn require_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("'{name}' is required")))
    }

    pub fn files_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a UploadedFile> + 'a {
        self.files
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, file)| file)
    }
}

/// Buffers the whole form. Files of unsupported types are rejected up front;
/// more than `max_files` files is a validation error.
pub async fn read_upload_form(mut multipart: Multipart, max_files: usize) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name {
            Some(file_name) => {
                let kind = FileKind::detect(&file_name, field.content_type()).ok_or_else(|| {
                    AppError::Validation(format!(
                        "'{file_name}' has an unsupported type; upload a PDF or .txt file"
                    ))
                })?;
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if bytes.is_empty() {
                    return Err(AppError::Validation(format!("'{file_name}' is empty")));
                }
                if form.files.len() >= max_files {
                    return Err(AppError::Validation(format!(
                        "At most {max_files} file(s) may be uploaded at once"
                    )));
                }
                form.files.push((
                    name,
                    UploadedFile {
                        file_name,
                        kind,
                        bytes,
                    },
                ));
            }
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".to_string())
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}

/// Extracts plain text from an upload. PDF parsing is CPU-bound and runs on
/// the blocking pool.
pub async fn extract_text(file: &UploadedFile) -> Result<String, AppError> {
    let text = match file.kind {
        FileKind::Text => String::from_utf8(file.bytes.to_vec()).map_err(|_| {
            AppError::Validation(format!("'{}' is not valid UTF-8 text", file.file_name))
        })?,
        FileKind::Pdf => {
            let bytes = file.bytes.clone();
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
                .await
                .map_err(|e| {
                    // the parser panics on some malformed files
                    AppError::UnprocessableEntity(format!(
                        "Could not read text from '{}': {e}",
                        file.file_name
                    ))
                })?
                .map_err(|e| {
                    AppError::UnprocessableEntity(format!(
                        "Could not read text from '{}': {e}",
                        file.file_name
                    ))
                })?
        }
    };

    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "No text could be extracted from '{}'; scanned images are not supported",
            file.file_name
        )));
    }
    Ok(text)
}

/// Collapses runs of spaces and blank lines left behind by PDF extraction.
fn normalize_whitespace(text: &str) -> String {
    let mut lines = Vec::new();
    let mut previous_blank = false;
    for line in text.lines() {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");
        let blank = collapsed.is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(collapsed);
        previous_blank = blank;
    }
    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(FileKind::detect("CV.PDF", None), Some(FileKind::Pdf));
        assert_eq!(FileKind::detect("cv.txt", Some("application/octet-stream")), Some(FileKind::Text));
    }

    #[test]
    fn test_detect_by_content_type() {
        assert_eq!(FileKind::detect("blob", Some("application/pdf")), Some(FileKind::Pdf));
        assert_eq!(
            FileKind::detect("blob", Some("text/plain; charset=utf-8")),
            Some(FileKind::Text)
        );
    }

    #[test]
    fn test_detect_rejects_word_documents() {
        assert_eq!(FileKind::detect("cv.docx", None), None);
        assert_eq!(FileKind::detect("cv", Some("image/png")), None);
    }

    #[tokio::test]
    async fn test_extract_plain_text() {
        let file = UploadedFile {
            file_name: "cv.txt".to_string(),
            kind: FileKind::Text,
            bytes: Bytes::from_static(b"Ada   Lovelace\n\n\n\nRust    engineer\n"),
        };
        assert_eq!(extract_text(&file).await.unwrap(), "Ada Lovelace\n\nRust engineer");
    }

    #[tokio::test]
    async fn test_extract_blank_text_is_unprocessable() {
        let file = UploadedFile {
            file_name: "blank.txt".to_string(),
            kind: FileKind::Text,
            bytes: Bytes::from_static(b"   \n  "),
        };
        assert!(matches!(
            extract_text(&file).await,
            Err(AppError::UnprocessableEntity(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_invalid_utf8_is_validation_error() {
        let file = UploadedFile {
            file_name: "bin.txt".to_string(),
            kind: FileKind::Text,
            bytes: Bytes::from_static(&[0xff, 0xfe, 0x00]),
        };
        assert!(matches!(extract_text(&file).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_extract_garbage_pdf_is_unprocessable() {
        let file = UploadedFile {
            file_name: "broken.pdf".to_string(),
            kind: FileKind::Pdf,
            bytes: Bytes::from_static(b"definitely not a pdf"),
        };
        assert!(matches!(
            extract_text(&file).await,
            Err(AppError::UnprocessableEntity(_))
        ));
    }
}
