//! Configuration for one edit-page session.

use serde::Deserialize;

use crate::constants;

/// Settings for a single edit-page session: where the page lives, where
/// templates come from, and how often the periodic tick fires.
///
/// All fields have working defaults apart from `edit_url`, which identifies
/// the page being edited and is used to derive the preview and attach
/// endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// URL of the edit page (must contain an `/edit/` segment).
    pub edit_url: String,

    /// Path prefix for template fragment resources.
    #[serde(default = "default_template_prefix")]
    pub template_prefix: String,

    /// Template fragment name for the attachment table skeleton.
    #[serde(default = "default_table_template")]
    pub table_template: String,

    /// Seconds between periodic ticks.
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
}

fn default_template_prefix() -> String {
    constants::TEMPLATE_PREFIX.to_string()
}

fn default_table_template() -> String {
    constants::ATTACHMENT_TABLE_TEMPLATE.to_string()
}

fn default_tick_interval_secs() -> u64 {
    constants::DEFAULT_TICK_INTERVAL_SECS
}

impl SessionConfig {
    /// Builds a config for the given edit-page URL with default timing and
    /// template settings.
    pub fn new(edit_url: impl Into<String>) -> Self {
        Self {
            edit_url: edit_url.into(),
            template_prefix: default_template_prefix(),
            table_template: default_table_template(),
            tick_interval_secs: default_tick_interval_secs(),
        }
    }

    /// Loads configuration from `INKPAD_`-prefixed environment variables
    /// (reading a `.env` file first if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::prefixed("INKPAD_").from_env::<SessionConfig>()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_cadence() {
        let config = SessionConfig::new("http://wiki/page/edit/main");
        assert_eq!(config.tick_interval_secs, 10);
        assert_eq!(config.template_prefix, "/template");
        assert_eq!(config.table_template, "page/attachments.html");
    }
}
