//! Filename and path component handling.

use crate::error::{Error, Result};

/// Replacement used when a path component sanitizes down to nothing.
const UNTITLED: &str = "untitled";

/// Sanitize a remote name (user, course or album title) for use as a single
/// directory name.
///
/// Separators and characters invalid on common filesystems become `_`, so the
/// result can never escape its parent directory.
pub fn sanitize_path_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match sanitized.trim() {
        "" | "." | ".." => UNTITLED.to_string(),
        _ => sanitized,
    }
}

/// Validate an attachment filename, returning it unchanged when safe.
///
/// Names are kept verbatim so the local file matches the remote one; only
/// names that would resolve outside the album directory are rejected.
pub fn check_attachment_filename(name: &str) -> Result<&str> {
    if name.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    if name == "." || name == ".." {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    Ok(name)
}
