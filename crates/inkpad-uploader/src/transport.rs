//! Upload transport seam.
//!
//! The transport is the external engine that actually moves bytes to the
//! attach endpoint. This layer consumes exactly five surface points: init,
//! start, the drag-and-drop capability flag, a layout refresh signal, and
//! size formatting, plus the event stream below.

use async_trait::async_trait;

use inkpad_core::{format_size, AppError, FileInfo};

/// File-lifecycle events emitted by the transport, delivered over an mpsc
/// channel to [`UploadController::run`](crate::UploadController::run).
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The user selected or dropped files.
    FilesAdded(Vec<FileInfo>),
    /// Upload progress for one file, percent in 0..=100.
    Progress { file: FileInfo, percent: u8 },
    /// One file finished uploading; `body` is the raw server response.
    Completed { file: FileInfo, body: String },
    /// One file failed to upload (optional transport capability).
    Failed { file: FileInfo, message: String },
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// One-time transport initialization at controller setup.
    async fn init(&self) -> Result<(), AppError>;

    /// Begins uploading any files that have not started yet.
    ///
    /// Must be idempotent and re-entrant: the periodic restart task calls
    /// this every tick, so invoking it on a running or drained transport must
    /// not duplicate uploads.
    async fn start(&self) -> Result<(), AppError>;

    /// Whether the transport supports native drag-and-drop (such transports
    /// auto-start their uploads).
    fn supports_drag_drop(&self) -> bool;

    /// Layout-changed signal, invoked after a batch of rows is rendered.
    fn refresh(&self) {}

    /// Human-readable size text for a row. Defaults to the shared formatter.
    fn format_size(&self, bytes: u64) -> String {
        format_size(bytes)
    }
}
