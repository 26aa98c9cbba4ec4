//! Trait seams between the coordination engine and the HTTP layer.
//!
//! The uploader crate works against these traits so it never depends on a
//! concrete HTTP client; `inkpad-client` provides the real implementations
//! and tests substitute counting or scripted doubles.

use async_trait::async_trait;

use crate::error::AppError;

/// Source of named HTML template fragments.
///
/// The template cache calls this exactly once per name on a miss; the
/// production implementation does `GET /template/<name>`.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    async fn fetch_template(&self, name: &str) -> Result<String, AppError>;
}

/// Server-side renderer for the edit page's live preview.
///
/// Takes the current editor text and returns the rendered HTML fragment.
#[async_trait]
pub trait PreviewBackend: Send + Sync {
    async fn render_preview(&self, text: &str) -> Result<String, AppError>;
}
