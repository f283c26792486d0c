//! Blocking HTTP client for the analysis backend's REST API.
//!
//! The client is deliberately thin: one request per call, no retries, and every response body
//! decoded into the payload types of [`crate::models`]. Failures come back as [`Error`] for the
//! caller to display.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    Acknowledgement, DocumentDetailResponse, DocumentListResponse, SearchResponse, UploadResponse,
};
use crate::section::Section;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use ureq::unversioned::multipart::{Form, Part};
use url::Url;

#[derive(Debug, Clone)]
/// Handle on one backend instance.
pub struct ApiClient {
    base_url: Url,
    agent: ureq::Agent,
}

impl ApiClient {
    /// Builds a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL cannot be parsed or cannot carry a path.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_timeout(&config.api_url, config.request_timeout())
    }

    /// Builds a client for `base_url` with a global per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` cannot be parsed or cannot carry a path.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("{base_url} cannot be used as a base URL")));
        }

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Ok(Self { base_url, agent })
    }

    #[must_use]
    /// Backend this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /api/documents`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a malformed body.
    pub fn list_documents(&self) -> Result<DocumentListResponse> {
        let url = self.endpoint(&["api", "documents"])?;
        debug!(%url, "listing documents");
        self.get_json(&url)
    }

    /// `GET /api/documents/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a malformed body.
    pub fn get_document(&self, document_id: &str) -> Result<DocumentDetailResponse> {
        let url = self.endpoint(&["api", "documents", document_id])?;
        debug!(%url, "fetching document");
        self.get_json(&url)
    }

    /// `GET /api/documents/{id}/sections/{sectionId}`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a malformed body.
    pub fn get_section(&self, document_id: &str, section_id: &str) -> Result<Section> {
        let url = self.endpoint(&["api", "documents", document_id, "sections", section_id])?;
        debug!(%url, "fetching section");
        self.get_json(&url)
    }

    /// `GET /api/search?q={query}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a blank query without contacting the backend, and
    /// otherwise errors on transport failure, non-success status, or a malformed body.
    pub fn search(&self, query: &str) -> Result<SearchResponse> {
        let query = validate_query(query)?;
        let url = self.endpoint(&["api", "search"])?;
        debug!(%url, query, "searching");

        let text = self
            .agent
            .get(url.as_str())
            .query("q", query)
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `POST /api/documents/upload` with the file as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for anything that is not a `.pdf`, an I/O error if the
    /// file cannot be read, and otherwise the usual transport and decoding errors.
    pub fn upload(&self, path: &Path) -> Result<UploadResponse> {
        let filename = validate_upload(path)?;
        let contents = fs::read(path)?;
        let url = self.endpoint(&["api", "documents", "upload"])?;
        info!(%url, filename, bytes = contents.len(), "uploading document");

        let part = Part::bytes(&contents)
            .file_name(&form_filename(&filename))
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);
        let text = self
            .agent
            .post(url.as_str())
            .send(form)
            .and_then(|mut resp| resp.body_mut().read_to_string())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `DELETE /api/documents/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub fn delete_document(&self, document_id: &str) -> Result<Acknowledgement> {
        let url = self.endpoint(&["api", "documents", document_id])?;
        info!(%url, "deleting document");

        let text = self
            .agent
            .delete(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())?;
        Ok(parse_acknowledgement(&text))
    }

    /// `POST /api/documents/reset`, removing every document.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub fn reset(&self) -> Result<Acknowledgement> {
        let url = self.endpoint(&["api", "documents", "reset"])?;
        info!(%url, "resetting all documents");

        let text = self
            .agent
            .post(url.as_str())
            .send_empty()
            .and_then(|mut resp| resp.body_mut().read_to_string())?;
        Ok(parse_acknowledgement(&text))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("{} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        let text = self
            .agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Trims a search query, rejecting one that is blank.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when nothing but whitespace remains.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("query cannot be empty".to_string()));
    }
    Ok(trimmed)
}

/// Checks that `path` names a PDF and returns its file name.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for paths without a file name or a `.pdf` extension.
pub fn validate_upload(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    let filename = path.file_name().map(|name| name.to_string_lossy().into_owned());

    match filename {
        Some(name) if is_pdf => Ok(name),
        _ => Err(Error::InvalidInput(format!(
            "only PDF files can be uploaded: {}",
            path.display()
        ))),
    }
}

/// File name as written into the part's `Content-Disposition` header.
///
/// Control characters and quotes would end the header early, so they become `_`.
fn form_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_control() || c == '"' { '_' } else { c })
        .collect()
}

fn parse_acknowledgement(text: &str) -> Acknowledgement {
    serde_json::from_str(text).unwrap_or_else(|e| {
        debug!(error = %e, body = text, "acknowledgement body not understood, ignoring");
        Acknowledgement::default()
    })
}

#[cfg(test)]
#[path = "tests/api.rs"]
mod tests;
