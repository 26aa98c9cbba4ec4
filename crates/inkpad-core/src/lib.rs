//! Inkpad Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! shared helpers used by the Inkpad edit-page coordination components.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod hooks;
pub mod models;

// Re-export commonly used types
pub use config::SessionConfig;
pub use error::AppError;
pub use format::format_size;
pub use hooks::{PreviewBackend, TemplateSource};
pub use models::{AttachmentLink, AttachmentOutcome, FileIdentity, FileInfo};
