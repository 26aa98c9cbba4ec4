//! URL derivation for the wiki server's edit-page endpoints.
//!
//! The preview and attach endpoints share the edit page's path with the
//! `/edit/` segment swapped out, so a page at `/page/edit/main` previews at
//! `/page/preview/main` and attaches at `/page/attach/main`.

use inkpad_core::constants::{ATTACH_SEGMENT, EDIT_SEGMENT, PREVIEW_SEGMENT};
use inkpad_core::AppError;

/// Derives the preview endpoint from an edit-page URL.
pub fn preview_url(edit_url: &str) -> Result<String, AppError> {
    swap_edit_segment(edit_url, PREVIEW_SEGMENT)
}

/// Derives the attachment submission endpoint from an edit-page URL.
pub fn attach_url(edit_url: &str) -> Result<String, AppError> {
    swap_edit_segment(edit_url, ATTACH_SEGMENT)
}

/// Replaces the first `/edit/` segment. A URL without one cannot be an edit
/// page, so that is a setup error rather than a silent no-op.
fn swap_edit_segment(edit_url: &str, replacement: &str) -> Result<String, AppError> {
    match edit_url.find(EDIT_SEGMENT) {
        Some(idx) => Ok(format!(
            "{}{}{}",
            &edit_url[..idx],
            replacement,
            &edit_url[idx + EDIT_SEGMENT.len()..]
        )),
        None => Err(AppError::InvalidInput(format!(
            "Not an edit-page URL (no {} segment): {}",
            EDIT_SEGMENT, edit_url
        ))),
    }
}
