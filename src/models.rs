//! Payload shapes exchanged with the analysis backend.
//!
//! Every field is treated as untrusted input: optional and defaulted fields tolerate partial
//! payloads, and unknown fields are ignored so a newer backend does not break the client.

use crate::lifecycle::DocumentStatus;
use crate::section::Section;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Processing record for one uploaded document.
pub struct DocumentMetadata {
    /// Backend-assigned identifier.
    pub id: String,
    /// Original file name of the upload.
    pub filename: String,
    /// Where the document is in the analysis pipeline.
    pub status: DocumentStatus,
    /// Upload timestamp as sent by the backend (ISO 8601, possibly without offset).
    pub upload_date: String,
    #[serde(default)]
    /// Number of sections extracted so far.
    pub total_sections: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Failure reason, only present once the status is failed.
    pub error_message: Option<String>,
}

impl DocumentMetadata {
    #[must_use]
    /// Calendar date of the upload, or the raw timestamp if it cannot be parsed.
    pub fn upload_day(&self) -> String {
        if let Ok(stamp) = DateTime::parse_from_rfc3339(&self.upload_date) {
            return stamp.format("%Y-%m-%d").to_string();
        }
        if let Ok(stamp) = NaiveDateTime::parse_from_str(&self.upload_date, "%Y-%m-%dT%H:%M:%S%.f")
        {
            return stamp.format("%Y-%m-%d").to_string();
        }
        self.upload_date.clone()
    }

    #[must_use]
    /// Failure reason, suppressed unless the document actually failed.
    pub fn failure(&self) -> Option<&str> {
        if self.status == DocumentStatus::Failed {
            self.error_message.as_deref()
        } else {
            None
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One search hit pointing back into a section of a document.
pub struct Citation {
    /// Document containing the cited section.
    pub document_id: String,
    /// File name of that document, for display.
    pub document_name: String,
    /// Cited section.
    pub section_id: String,
    /// Title of the cited section, for display.
    pub section_title: String,
    /// Snippet of the section that matched.
    pub text: String,
    /// Relevance, higher is better; nominally within 0..=1 but not guaranteed.
    pub score: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Answer to a natural-language query with its supporting citations.
pub struct SearchResponse {
    /// Echo of the submitted query.
    pub query: String,
    /// Free-text answer.
    pub response: String,
    #[serde(default)]
    /// Supporting hits in backend order.
    pub citations: Vec<Citation>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Body of `GET /api/documents`.
pub struct DocumentListResponse {
    #[serde(default)]
    /// Every known document.
    pub documents: Vec<DocumentMetadata>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Body of `GET /api/documents/{id}`.
pub struct DocumentDetailResponse {
    /// Processing record of the document.
    pub metadata: DocumentMetadata,
    #[serde(default)]
    /// Extracted sections in document order.
    pub sections: Vec<Section>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// Body of `POST /api/documents/upload`.
pub struct UploadResponse {
    /// Identifier assigned to the new document.
    pub document_id: String,
    /// Stored file name.
    pub filename: String,
    /// Initial processing status.
    pub status: DocumentStatus,
    #[serde(default)]
    /// Human-readable confirmation.
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
/// Body of delete and reset responses; anything beyond the message is ignored.
pub struct Acknowledgement {
    #[serde(default)]
    /// Human-readable confirmation.
    pub message: String,
}
