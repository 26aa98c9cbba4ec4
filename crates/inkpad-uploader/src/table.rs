//! In-memory attachment table: one row per file identity.
//!
//! Replaces the page's DOM-traversal row management with an explicit index
//! from [`FileIdentity`] to row state. Rows are created lazily on first sight
//! of an identity, updated in place on every later event, and never removed
//! for the life of the session. The table starts in a placeholder state; the
//! first `ensure_row` installs the table skeleton fetched through the
//! template cache.

use std::collections::HashMap;
use std::sync::Arc;

use inkpad_core::{AppError, AttachmentLink, FileIdentity};

use crate::template_cache::TemplateCache;

/// Contents of a row's action cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Upload in progress (or not yet started), percent in 0..=100.
    Progress(u8),
    /// Upload finished; links built from the server response.
    Links(Vec<AttachmentLink>),
    /// Completion payload could not be parsed; visible error state.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct AttachmentRow {
    pub identity: FileIdentity,
    pub filename: String,
    pub size_text: String,
    pub action: RowAction,
}

pub struct AttachmentTable {
    cache: Arc<TemplateCache>,
    skeleton_template: String,
    skeleton: Option<String>,
    order: Vec<FileIdentity>,
    rows: HashMap<FileIdentity, AttachmentRow>,
}

impl AttachmentTable {
    pub fn new(cache: Arc<TemplateCache>, skeleton_template: impl Into<String>) -> Self {
        Self {
            cache,
            skeleton_template: skeleton_template.into(),
            skeleton: None,
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }

    /// Whether the table is still in its empty placeholder state.
    pub fn is_placeholder(&self) -> bool {
        self.skeleton.is_none()
    }

    /// The installed table skeleton, once the first row has been ensured.
    pub fn skeleton(&self) -> Option<&str> {
        self.skeleton.as_deref()
    }

    /// Ensures exactly one row exists for `identity`, creating it on first
    /// sight and updating its display fields in place thereafter. The action
    /// cell is reset to a fresh 0 % progress indicator either way.
    ///
    /// A template fetch failure while installing the skeleton propagates to
    /// the caller; no row is created in that case.
    ///
    /// Two files sharing a name share an identity, so the second call
    /// overwrites the first row's display fields (last write wins).
    pub async fn ensure_row(
        &mut self,
        identity: FileIdentity,
        filename: impl Into<String>,
        size_text: impl Into<String>,
    ) -> Result<(), AppError> {
        if self.skeleton.is_none() {
            let content = self.cache.fetch(&self.skeleton_template).await?;
            tracing::debug!(template = %self.skeleton_template, "Attachment table skeleton installed");
            self.skeleton = Some(content);
        }

        let filename = filename.into();
        let size_text = size_text.into();

        match self.rows.get_mut(&identity) {
            Some(row) => {
                row.filename = filename;
                row.size_text = size_text;
                row.action = RowAction::Progress(0);
            }
            None => {
                self.order.push(identity.clone());
                self.rows.insert(
                    identity.clone(),
                    AttachmentRow {
                        identity,
                        filename,
                        size_text,
                        action: RowAction::Progress(0),
                    },
                );
            }
        }

        Ok(())
    }

    /// Updates the progress indicator for `identity`, clamped to 100.
    ///
    /// An unknown identity is a lost update: the caller logs it and a later
    /// event reconciles the row.
    pub fn set_progress(&mut self, identity: &FileIdentity, percent: u8) -> Result<(), AppError> {
        let row = self
            .rows
            .get_mut(identity)
            .ok_or_else(|| AppError::RowNotFound(identity.to_string()))?;
        row.action = RowAction::Progress(percent.min(100));
        Ok(())
    }

    /// Replaces the action cell with result links for a finished upload.
    pub fn complete(
        &mut self,
        identity: &FileIdentity,
        links: Vec<AttachmentLink>,
    ) -> Result<(), AppError> {
        let row = self
            .rows
            .get_mut(identity)
            .ok_or_else(|| AppError::RowNotFound(identity.to_string()))?;
        row.action = RowAction::Links(links);
        Ok(())
    }

    /// Puts the row into a visible failed state (malformed completion
    /// payload).
    pub fn fail(&mut self, identity: &FileIdentity, message: impl Into<String>) -> Result<(), AppError> {
        let row = self
            .rows
            .get_mut(identity)
            .ok_or_else(|| AppError::RowNotFound(identity.to_string()))?;
        row.action = RowAction::Failed(message.into());
        Ok(())
    }

    pub fn row(&self, identity: &FileIdentity) -> Option<&AttachmentRow> {
        self.rows.get(identity)
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> impl Iterator<Item = &AttachmentRow> {
        self.order.iter().filter_map(|id| self.rows.get(id))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use inkpad_core::TemplateSource;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TemplateSource for StaticSource {
        async fn fetch_template(&self, _name: &str) -> Result<String, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("<table class=\"attachment-table\"></table>".to_string())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TemplateSource for FailingSource {
        async fn fetch_template(&self, _name: &str) -> Result<String, AppError> {
            Err(AppError::TemplateFetch("offline".to_string()))
        }
    }

    fn table_with_source(source: Arc<dyn TemplateSource>) -> AttachmentTable {
        let cache = Arc::new(TemplateCache::new(source));
        AttachmentTable::new(cache, "page/attachments.html")
    }

    fn identity(n: &str) -> FileIdentity {
        FileIdentity::new(n)
    }

    #[tokio::test]
    async fn first_row_installs_the_skeleton() {
        let mut table = table_with_source(Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
        }));
        assert!(table.is_placeholder());

        table
            .ensure_row(identity("id1"), "a.txt", "1 KB")
            .await
            .unwrap();

        assert!(!table.is_placeholder());
        assert!(table.skeleton().unwrap().contains("attachment-table"));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn ensure_row_is_idempotent_per_identity() {
        let source = Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
        });
        let mut table = table_with_source(source);

        table
            .ensure_row(identity("id1"), "a.txt", "1 KB")
            .await
            .unwrap();
        table
            .ensure_row(identity("id1"), "a.txt", "2 KB")
            .await
            .unwrap();

        assert_eq!(table.len(), 1);
        let row = table.row(&identity("id1")).unwrap();
        assert_eq!(row.size_text, "2 KB");
        assert_eq!(row.action, RowAction::Progress(0));
    }

    #[tokio::test]
    async fn rows_keep_insertion_order() {
        let mut table = table_with_source(Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
        }));

        table.ensure_row(identity("b"), "b.txt", "1 KB").await.unwrap();
        table.ensure_row(identity("a"), "a.txt", "1 KB").await.unwrap();
        table.ensure_row(identity("b"), "b.txt", "1 KB").await.unwrap();

        let names: Vec<&str> = table.rows().map(|r| r.filename.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
    }

    #[tokio::test]
    async fn skeleton_fetch_failure_propagates_and_creates_no_row() {
        let mut table = table_with_source(Arc::new(FailingSource));

        let err = table
            .ensure_row(identity("id1"), "a.txt", "1 KB")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::TemplateFetch(_)));
        assert!(table.is_placeholder());
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn progress_updates_clamp_to_one_hundred() {
        let mut table = table_with_source(Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
        }));
        table.ensure_row(identity("id1"), "a.txt", "1 KB").await.unwrap();

        table.set_progress(&identity("id1"), 42).unwrap();
        assert_eq!(
            table.row(&identity("id1")).unwrap().action,
            RowAction::Progress(42)
        );

        table.set_progress(&identity("id1"), 250).unwrap();
        assert_eq!(
            table.row(&identity("id1")).unwrap().action,
            RowAction::Progress(100)
        );
    }

    #[tokio::test]
    async fn progress_for_unknown_identity_is_row_not_found() {
        let mut table = table_with_source(Arc::new(StaticSource {
            calls: AtomicUsize::new(0),
        }));
        let err = table.set_progress(&identity("ghost"), 10).unwrap_err();
        assert!(matches!(err, AppError::RowNotFound(_)));
        assert!(table.is_empty());
    }
}
