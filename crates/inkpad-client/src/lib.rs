//! HTTP client for the wiki server.
//!
//! Provides [`WikiClient`], a thin reqwest wrapper that fetches template
//! fragments (`GET /template/<name>`) and posts editor contents for
//! server-rendered previews. It implements the [`TemplateSource`] and (via
//! [`PreviewEndpoint`]) [`PreviewBackend`] seams from `inkpad-core`, so the
//! uploader engine never sees a concrete HTTP stack.

pub mod urls;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use inkpad_core::constants::{PREVIEW_TEXT_FIELD, TEMPLATE_PREFIX};
use inkpad_core::{AppError, PreviewBackend, TemplateSource};

/// HTTP client for template and preview endpoints on one wiki server.
#[derive(Clone, Debug)]
pub struct WikiClient {
    client: Client,
    base_url: String,
    template_prefix: String,
}

impl WikiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            template_prefix: TEMPLATE_PREFIX.to_string(),
        })
    }

    /// Overrides the template resource prefix (default `/template`).
    pub fn with_template_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.template_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches a raw template fragment by name.
    pub async fn get_template(&self, name: &str) -> Result<String, AppError> {
        let url = self.build_url(&format!("{}/{}", self.template_prefix, name));
        tracing::debug!(template = name, url = %url, "Fetching template");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::TemplateFetch(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::TemplateFetch(format!(
                "GET {} returned status {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::TemplateFetch(format!("Failed to read template body: {}", e)))
    }

    /// Posts the current editor text to the preview endpoint derived from
    /// `edit_url` and returns the rendered HTML.
    pub async fn sync_preview(&self, edit_url: &str, text: &str) -> Result<String, AppError> {
        let url = urls::preview_url(edit_url)?;
        tracing::debug!(url = %url, text_len = text.len(), "Syncing preview");

        let response = self
            .client
            .post(&url)
            .form(&[(PREVIEW_TEXT_FIELD, text)])
            .send()
            .await
            .map_err(|e| AppError::Http(format!("POST {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Http(format!(
                "POST {} returned status {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::Http(format!("Failed to read preview body: {}", e)))
    }
}

#[async_trait]
impl TemplateSource for WikiClient {
    async fn fetch_template(&self, name: &str) -> Result<String, AppError> {
        self.get_template(name).await
    }
}

/// A [`WikiClient`] bound to one edit page, usable as a preview backend.
#[derive(Clone, Debug)]
pub struct PreviewEndpoint {
    client: WikiClient,
    edit_url: String,
}

impl PreviewEndpoint {
    /// Binds the client to an edit page. Fails fast if the URL has no
    /// `/edit/` segment, since every later sync would hit the wrong path.
    pub fn new(client: WikiClient, edit_url: impl Into<String>) -> Result<Self, AppError> {
        let edit_url = edit_url.into();
        urls::preview_url(&edit_url)?;
        Ok(Self { client, edit_url })
    }
}

#[async_trait]
impl PreviewBackend for PreviewEndpoint {
    async fn render_preview(&self, text: &str) -> Result<String, AppError> {
        self.client.sync_preview(&self.edit_url, text).await
    }
}
