//! Session assembly: wires the registry, template cache, optional preview
//! sync, and upload controller together for one edit page.
//!
//! Mirrors page setup order: the preview task (when the page has a preview
//! region) is registered before the upload restart task, so each tick syncs
//! the preview first and then nudges the transport.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use inkpad_core::{AppError, PreviewBackend, SessionConfig, TemplateSource};

use crate::controller::UploadController;
use crate::periodic::PeriodicTaskRegistry;
use crate::preview::{EditorTextSource, PreviewSyncTask};
use crate::template_cache::TemplateCache;
use crate::transport::UploadTransport;

/// Everything the coordination layer runs for one edit page.
pub struct EditSession {
    registry: Arc<PeriodicTaskRegistry>,
    controller: Arc<UploadController>,
    preview_html: Option<watch::Receiver<String>>,
    tick_period: Duration,
}

impl EditSession {
    /// Builds the session. Pass `preview` only when the page has a preview
    /// region; pages without one never register the sync task.
    pub async fn start(
        config: &SessionConfig,
        transport: Arc<dyn UploadTransport>,
        templates: Arc<dyn TemplateSource>,
        preview: Option<(Arc<dyn PreviewBackend>, EditorTextSource)>,
    ) -> Result<Self, AppError> {
        let registry = Arc::new(PeriodicTaskRegistry::new());

        let preview_html = preview.map(|(backend, text_source)| {
            let (task, html_rx) = PreviewSyncTask::new(backend, text_source);
            registry.register(task);
            html_rx
        });

        let cache = Arc::new(TemplateCache::new(templates));
        let controller =
            UploadController::setup(transport, cache, config.table_template.clone(), &registry)
                .await?;

        Ok(Self {
            registry,
            controller,
            preview_html,
            tick_period: Duration::from_secs(config.tick_interval_secs),
        })
    }

    /// Starts the periodic ticker for the session's lifetime.
    pub fn spawn_ticker(&self) -> tokio::task::JoinHandle<()> {
        self.registry.clone().spawn(self.tick_period)
    }

    pub fn registry(&self) -> &Arc<PeriodicTaskRegistry> {
        &self.registry
    }

    pub fn controller(&self) -> &Arc<UploadController> {
        &self.controller
    }

    /// Rendered preview HTML, updated on each tick. `None` when the page has
    /// no preview region.
    pub fn preview_html(&self) -> Option<watch::Receiver<String>> {
        self.preview_html.clone()
    }
}
