//! Resume file → plain text, for the multipart upload endpoint.

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported resume format '{0}'; upload a PDF or plain-text file")]
    Unsupported(String),

    #[error("Could not read text from PDF: {0}")]
    Pdf(String),

    #[error("Resume file contains no text")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Detects the format from the declared content type, falling back to the
    /// file extension.
    pub fn detect(file_name: Option<&str>, content_type: Option<&str>) -> Result<Self, DocumentError> {
        match content_type.map(|c| c.split(';').next().unwrap_or(c).trim().to_ascii_lowercase()) {
            Some(ct) if ct == "application/pdf" => return Ok(DocumentKind::Pdf),
            Some(ct) if ct.starts_with("text/") => return Ok(DocumentKind::PlainText),
            _ => {}
        }

        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" | "md" | "text" => Ok(DocumentKind::PlainText),
            _ => Err(DocumentError::Unsupported(
                file_name.unwrap_or("unnamed file").to_string(),
            )),
        }
    }
}

/// Extracts the resume text. Plain text is decoded as UTF-8 with replacement
/// characters for invalid sequences.
pub fn extract_resume_text(kind: DocumentKind, data: &Bytes) -> Result<String, DocumentError> {
    let text = match kind {
        DocumentKind::PlainText => String::from_utf8_lossy(data).into_owned(),
        DocumentKind::Pdf => {
            pdf_extract::extract_text_from_mem(data).map_err(|e| DocumentError::Pdf(e.to_string()))?
        }
    };

    if text.trim().is_empty() {
        return Err(DocumentError::Empty);
    }
    Ok(text)
}
