//! Data models for the attachment workflow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A file as reported by the upload transport. The transport owns the file;
/// this layer only reads its name and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
}

impl FileInfo {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Stable key correlating transport events and table rows for one logical
/// file. Derived from the filename, so two files sharing a name share an
/// identity; the shared row is last-write-wins by design.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileIdentity(String);

impl FileIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server response body for a completed upload. Matches the attach endpoint
/// payload shape; parsed strictly with serde_json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentOutcome {
    pub viewable: bool,
    pub repository_path: String,
}

/// An action link shown in a completed row ("View" / "Download").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentLink {
    pub label: String,
    pub href: String,
}

impl AttachmentLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }

    /// "View" link for a stored attachment, shown only when the server marks
    /// the artifact viewable.
    pub fn view(repository_path: &str) -> Self {
        Self::new(
            "View",
            format!("{}/{}", crate::constants::ATTACHMENT_VIEW_PREFIX, repository_path),
        )
    }

    /// "Download" link for a stored attachment, always present.
    pub fn download(repository_path: &str) -> Self {
        Self::new(
            "Download",
            format!(
                "{}/{}",
                crate::constants::ATTACHMENT_DOWNLOAD_PREFIX,
                repository_path
            ),
        )
    }
}
