//! Periodic preview synchronization.
//!
//! On every tick the task reads the current editor text, posts it through the
//! [`PreviewBackend`], and publishes the rendered HTML on a watch channel for
//! the preview region to display. Construct it only when the page has a
//! preview region; pages without one simply never register the task.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use inkpad_core::{AppError, PreviewBackend};

use crate::periodic::PeriodicTask;

/// Reads the current editor contents at tick time.
pub type EditorTextSource = Box<dyn Fn() -> String + Send + Sync>;

pub struct PreviewSyncTask {
    backend: Arc<dyn PreviewBackend>,
    text_source: EditorTextSource,
    html_tx: watch::Sender<String>,
}

impl PreviewSyncTask {
    /// Returns the task and the receiver carrying each rendered preview.
    pub fn new(
        backend: Arc<dyn PreviewBackend>,
        text_source: EditorTextSource,
    ) -> (Arc<Self>, watch::Receiver<String>) {
        let (html_tx, html_rx) = watch::channel(String::new());
        (
            Arc::new(Self {
                backend,
                text_source,
                html_tx,
            }),
            html_rx,
        )
    }
}

#[async_trait]
impl PeriodicTask for PreviewSyncTask {
    fn name(&self) -> &str {
        "preview-sync"
    }

    async fn run(&self) -> Result<(), AppError> {
        let text = (self.text_source)();
        let html = self.backend.render_preview(&text).await?;
        // receiver may be gone if the page tore the preview region down
        let _ = self.html_tx.send(html);
        Ok(())
    }
}
