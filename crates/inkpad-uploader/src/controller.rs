//! Upload lifecycle controller.
//!
//! Orchestrates the attachment workflow: reacts to transport events
//! (files added, progress, completed, failed), keeps the attachment table and
//! start-control state consistent, and registers a periodic "restart uploads"
//! task so an upload that missed its initial trigger still starts on a later
//! tick. Failures in one file's handling never abort the rest of the batch,
//! and a failure in one event never stops the event loop.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex, Weak};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use inkpad_core::{AppError, AttachmentLink, AttachmentOutcome, FileIdentity, FileInfo};

use crate::identity::FileIdentityResolver;
use crate::periodic::{PeriodicTask, PeriodicTaskRegistry};
use crate::table::AttachmentTable;
use crate::template_cache::TemplateCache;
use crate::transport::{TransportEvent, UploadTransport};

/// Where the current batch is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// No files yet.
    Idle,
    /// Files have rows; uploads not known to be running.
    Added,
    /// At least one upload is moving.
    Uploading,
    /// Every added file reached a terminal state.
    Completed,
}

/// Visibility of the page's upload affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiControls {
    pub drop_zone_visible: bool,
    pub picker_visible: bool,
    pub start_visible: bool,
}

struct ControllerState {
    phase: UploadPhase,
    controls: UiControls,
    /// Identities added but not yet completed; the start control stays
    /// visible while this is non-empty.
    pending: HashSet<FileIdentity>,
}

pub struct UploadController {
    transport: Arc<dyn UploadTransport>,
    resolver: FileIdentityResolver,
    table: Mutex<AttachmentTable>,
    state: StdMutex<ControllerState>,
}

impl UploadController {
    /// Builds the controller, registers the periodic upload-restart task,
    /// initializes the transport, and applies the capability toggle:
    /// drag-and-drop transports show the drop zone and hide the picker and
    /// start control (they auto-start); others keep the picker and start
    /// control visible.
    pub async fn setup(
        transport: Arc<dyn UploadTransport>,
        cache: Arc<TemplateCache>,
        table_template: impl Into<String>,
        registry: &PeriodicTaskRegistry,
    ) -> Result<Arc<Self>, AppError> {
        let drag_drop = transport.supports_drag_drop();
        let controller = Arc::new(Self {
            transport: transport.clone(),
            resolver: FileIdentityResolver::new(),
            table: Mutex::new(AttachmentTable::new(cache, table_template)),
            state: StdMutex::new(ControllerState {
                phase: UploadPhase::Idle,
                controls: UiControls {
                    drop_zone_visible: drag_drop,
                    picker_visible: !drag_drop,
                    start_visible: !drag_drop,
                },
                pending: HashSet::new(),
            }),
        });

        registry.register(Arc::new(RestartUploadsTask {
            controller: Arc::downgrade(&controller),
        }));

        transport.init().await?;

        tracing::info!(drag_drop, "Upload controller ready");
        Ok(controller)
    }

    pub fn phase(&self) -> UploadPhase {
        self.state.lock().expect("controller state poisoned").phase
    }

    pub fn controls(&self) -> UiControls {
        self.state
            .lock()
            .expect("controller state poisoned")
            .controls
    }

    /// The identity the controller uses for this file's events and row.
    pub fn identity_of(&self, file: &FileInfo) -> FileIdentity {
        self.resolver.identity_of(file)
    }

    /// The attachment table, for row inspection.
    pub fn table(&self) -> &Mutex<AttachmentTable> {
        &self.table
    }

    /// Starts any uploads that have not begun yet and, when a batch is
    /// pending, advances it to the uploading phase. Both the user's start
    /// action and the periodic restart task come through here, so this is
    /// safe to invoke at any time and repeatedly.
    pub async fn start_uploads(&self) -> Result<(), AppError> {
        self.transport.start().await?;
        let mut state = self.state.lock().expect("controller state poisoned");
        if !state.pending.is_empty() {
            state.phase = UploadPhase::Uploading;
        }
        Ok(())
    }

    /// Consumes transport events until the channel closes. Event failures
    /// are logged inside the handlers and never abort the loop.
    pub async fn run(self: Arc<Self>, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        tracing::debug!("Transport event channel closed");
    }

    pub async fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::FilesAdded(files) => self.on_files_added(files).await,
            TransportEvent::Progress { file, percent } => self.on_progress(&file, percent).await,
            TransportEvent::Completed { file, body } => self.on_completed(&file, &body).await,
            TransportEvent::Failed { file, message } => self.on_failed(&file, &message).await,
        }
    }

    async fn on_files_added(&self, files: Vec<FileInfo>) {
        let mut added = Vec::new();
        for file in &files {
            let identity = self.resolver.identity_of(file);
            let size_text = self.transport.format_size(file.size);

            let mut table = self.table.lock().await;
            match table.ensure_row(identity.clone(), file.name.clone(), size_text).await {
                Ok(()) => {
                    tracing::info!(file = %file.name, identity = %identity, "Attachment row ensured");
                    added.push(identity);
                }
                Err(e) => {
                    // one file's failure must not abort the rest of the batch
                    tracing::error!(file = %file.name, error = %e, "Failed to ensure attachment row");
                }
            }
        }

        if added.is_empty() {
            return;
        }

        {
            let mut state = self.state.lock().expect("controller state poisoned");
            state.pending.extend(added);
            state.controls.start_visible = true;
            state.phase = UploadPhase::Added;
        }

        self.transport.refresh();
    }

    async fn on_progress(&self, file: &FileInfo, percent: u8) {
        let identity = self.resolver.identity_of(file);
        let mut table = self.table.lock().await;
        match table.set_progress(&identity, percent) {
            Ok(()) => {
                drop(table);
                let mut state = self.state.lock().expect("controller state poisoned");
                state.phase = UploadPhase::Uploading;
            }
            Err(e) => {
                // lost update; a later event reconciles the row
                tracing::warn!(file = %file.name, error = %e, "Progress event for unknown row");
            }
        }
    }

    async fn on_completed(&self, file: &FileInfo, body: &str) {
        let identity = self.resolver.identity_of(file);

        let outcome: Result<AttachmentOutcome, AppError> =
            serde_json::from_str(body).map_err(Into::into);

        let mut table = self.table.lock().await;
        let result = match outcome {
            Ok(outcome) => {
                let mut links = Vec::new();
                if outcome.viewable {
                    links.push(AttachmentLink::view(&outcome.repository_path));
                }
                links.push(AttachmentLink::download(&outcome.repository_path));
                tracing::info!(
                    file = %file.name,
                    repository_path = %outcome.repository_path,
                    viewable = outcome.viewable,
                    "Upload completed"
                );
                table.complete(&identity, links)
            }
            Err(e) => {
                tracing::error!(file = %file.name, error = %e, "Malformed completion payload");
                table.fail(&identity, e.to_string())
            }
        };
        drop(table);

        if let Err(e) = result {
            tracing::warn!(file = %file.name, error = %e, "Completion event for unknown row");
            return;
        }

        let mut state = self.state.lock().expect("controller state poisoned");
        state.pending.remove(&identity);
        if state.pending.is_empty() {
            state.controls.start_visible = false;
            state.phase = UploadPhase::Completed;
        }
    }

    async fn on_failed(&self, file: &FileInfo, message: &str) {
        let identity = self.resolver.identity_of(file);
        tracing::warn!(file = %file.name, message, "Upload failed, returning row to added state");

        let mut table = self.table.lock().await;
        if let Err(e) = table.set_progress(&identity, 0) {
            tracing::warn!(file = %file.name, error = %e, "Failure event for unknown row");
            return;
        }
        drop(table);

        let mut state = self.state.lock().expect("controller state poisoned");
        state.pending.insert(identity);
        state.controls.start_visible = true;
        state.phase = UploadPhase::Added;
    }
}

/// Periodic task driving the controller's start path, the recovery route for
/// uploads whose initial trigger was missed. Holds the controller weakly so
/// a torn-down session does not keep ticking.
struct RestartUploadsTask {
    controller: Weak<UploadController>,
}

#[async_trait]
impl PeriodicTask for RestartUploadsTask {
    fn name(&self) -> &str {
        "restart-uploads"
    }

    async fn run(&self) -> Result<(), AppError> {
        match self.controller.upgrade() {
            Some(controller) => controller.start_uploads().await,
            None => {
                tracing::debug!("Upload controller dropped, nothing to restart");
                Ok(())
            }
        }
    }
}
