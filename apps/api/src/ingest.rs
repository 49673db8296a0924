//! Document-to-text collaborator. Decodes uploaded binaries into plain text
//! for the extraction pipeline; the core never sees a file format.

use regex::Regex;
use tracing::debug;

use crate::errors::AppError;

/// Extracts plain text from an uploaded document. PDF is decoded with
/// `pdf-extract`; `.txt` and `.md` pass through. Anything else is an
/// unsupported-format error.
pub fn extract_text(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let raw = match extension.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to decode PDF: {e}")))?,
        "txt" | "md" => String::from_utf8_lossy(bytes).into_owned(),
        other => {
            return Err(AppError::UnsupportedFormat(format!(
                "'.{other}' is not supported (expected .pdf, .txt, or .md)"
            )))
        }
    };

    let cleaned = clean_text(&raw);
    debug!(
        "Extracted {} chars from {filename} ({} after cleanup)",
        raw.len(),
        cleaned.len()
    );
    Ok(cleaned)
}

/// Normalizes extracted text: collapses whitespace runs, drops lone
/// page-number lines and control characters. Also applied to pasted text.
pub fn clean_text(text: &str) -> String {
    let blank_runs = Regex::new(r"\n\s*\n").expect("pattern must compile");
    let space_runs = Regex::new(r" +").expect("pattern must compile");
    let page_numbers = Regex::new(r"\n\d+\n").expect("pattern must compile");

    let text = blank_runs.replace_all(text, "\n\n");
    let text = space_runs.replace_all(&text, " ");
    let text = page_numbers.replace_all(&text, "\n");
    let text: String = text
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension_rejected() {
        let err = extract_text("resume.docx", b"bytes").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_text("resume.txt", b"Jane Doe\nEngineer").unwrap();
        assert_eq!(text, "Jane Doe\nEngineer");
    }

    #[test]
    fn test_clean_text_collapses_blank_runs() {
        assert_eq!(clean_text("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_clean_text_collapses_spaces() {
        assert_eq!(clean_text("a    b"), "a b");
    }

    #[test]
    fn test_clean_text_drops_page_number_lines() {
        assert_eq!(clean_text("end of page\n2\nnext page"), "end of page\nnext page");
    }

    #[test]
    fn test_clean_text_strips_control_chars() {
        assert_eq!(clean_text("a\u{0007}b\tc"), "ab\tc");
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert!(extract_text("notes.TXT", b"hello world").is_ok());
    }
}
