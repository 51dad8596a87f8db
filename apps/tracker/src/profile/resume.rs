use std::path::Path;

use tracing::debug;

use crate::errors::ApiError;

/// Reads resume text from disk. PDFs go through `pdf-extract` on a blocking
/// thread; `.txt` and `.md` are read as UTF-8.
pub async fn read_resume_text(path: &Path) -> Result<String, ApiError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::Resume(format!("{}: {e}", path.display())))?;
    debug!("Read {} bytes of resume from {}", bytes.len(), path.display());

    let text = match extension.as_str() {
        "pdf" => tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ApiError::Resume(format!("PDF extraction task failed: {e}")))?
            .map_err(|e| ApiError::Resume(format!("could not extract text from PDF: {e:?}")))?,
        "txt" | "md" | "" => String::from_utf8(bytes)
            .map_err(|_| ApiError::Resume("resume file is not valid UTF-8".to_string()))?,
        other => {
            return Err(ApiError::Resume(format!(
                "unsupported resume format '.{other}' (use .pdf, .txt or .md)"
            )))
        }
    };

    Ok(normalize_whitespace(&text))
}

/// Collapses runs of blank lines and trailing spaces left by PDF extraction.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
