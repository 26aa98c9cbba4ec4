//! Shared constants for URL derivation, wire field names, and timing.

/// Path segment of an edit-page URL that marks it as an edit page.
pub const EDIT_SEGMENT: &str = "/edit/";

/// Replacement segment for the server-rendered preview endpoint.
pub const PREVIEW_SEGMENT: &str = "/preview/";

/// Replacement segment for the attachment submission endpoint.
pub const ATTACH_SEGMENT: &str = "/attach/";

/// Form field carrying the editor contents in a preview sync POST.
pub const PREVIEW_TEXT_FIELD: &str = "yukkitext";

/// Path prefix for template fragment resources.
pub const TEMPLATE_PREFIX: &str = "/template";

/// Link prefix for viewing a stored attachment.
pub const ATTACHMENT_VIEW_PREFIX: &str = "/attachment/view";

/// Link prefix for downloading a stored attachment.
pub const ATTACHMENT_DOWNLOAD_PREFIX: &str = "/attachment/download";

/// Template fragment holding the attachment table skeleton.
pub const ATTACHMENT_TABLE_TEMPLATE: &str = "page/attachments.html";

/// Interval in seconds between periodic ticks (preview sync, upload restart).
pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;
