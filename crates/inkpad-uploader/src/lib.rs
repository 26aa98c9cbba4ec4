//! Attachment upload coordination for a wiki edit page.
//!
//! This crate drives the client-side upload workflow: it caches template
//! fragments, assigns a stable identity to each file, keeps exactly one
//! attachment table row per identity, tracks upload progress, reacts to
//! completion payloads from the server, and retries `start()` on a periodic
//! tick so uploads begin even when the initial trigger is missed.
//!
//! The upload transport itself (how bytes reach the server) is an external
//! collaborator behind the [`UploadTransport`] trait; the wiki server is
//! reached through the `TemplateSource` and `PreviewBackend` seams from
//! `inkpad-core`.

pub mod controller;
pub mod identity;
pub mod periodic;
pub mod preview;
pub mod session;
pub mod table;
pub mod template_cache;
pub mod transport;

pub use controller::{UiControls, UploadController, UploadPhase};
pub use identity::FileIdentityResolver;
pub use periodic::{PeriodicTask, PeriodicTaskRegistry};
pub use preview::{EditorTextSource, PreviewSyncTask};
pub use session::EditSession;
pub use table::{AttachmentRow, AttachmentTable, RowAction};
pub use template_cache::TemplateCache;
pub use transport::{TransportEvent, UploadTransport};
