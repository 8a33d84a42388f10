//! Content Loader — resolves `.txt` and `.pdf` source documents to plain text.
//!
//! The prompt builder accepts job descriptions and resumes either as literal
//! text or as a path to a source document; this module handles the latter.

use std::path::Path;

use crate::errors::InterviewError;

/// Returns true when `value` looks like a reference to a loadable source
/// document rather than literal text.
pub fn is_document_reference(value: &str) -> bool {
    let lower = value.trim_end().to_ascii_lowercase();
    lower.ends_with(".txt") || lower.ends_with(".pdf")
}

/// Loads the text content of a source document.
///
/// Supports `.txt` (raw UTF-8 read) and `.pdf` (extracted page text; pages
/// with no extractable text contribute nothing). Any other extension is an
/// unsupported-format error.
pub fn load(path: &Path) -> Result<String, InterviewError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") => std::fs::read_to_string(path).map_err(|e| InterviewError::ContentLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Some("pdf") => pdf_extract::extract_text(path).map_err(|e| InterviewError::ContentLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        _ => Err(InterviewError::ContentLoad {
            path: path.to_path_buf(),
            reason: "unsupported file format, use .txt or .pdf".to_string(),
        }),
    }
}

/// Resolves a prompt input: document references are loaded, literal text is
/// passed through unchanged.
pub fn resolve(value: &str) -> Result<String, InterviewError> {
    if is_document_reference(value) {
        load(Path::new(value.trim_end()))
    } else {
        Ok(value.to_string())
    }
}
