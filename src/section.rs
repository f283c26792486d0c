//! Section representation for analysed PDF documents.
//!
//! A section represents one extracted division of a document, typically a heading with its
//! body text. The backend delivers sections as a flat list in document order, each pointing at
//! its parent by id. The store keeps that list exactly as fetched; hierarchy is derived from it
//! by the tree builder, never patched in place.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
/// One extracted unit of document structure: heading, body and page.
pub struct Section {
    /// Opaque identifier, stable for the lifetime of the document.
    pub id: String,
    /// Heading text.
    pub title: String,
    #[serde(default)]
    /// Extracted body text.
    pub content: String,
    /// Page the section starts on (1-based).
    pub page_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Containing section, if any. Unresolvable references mean "root".
    pub parent_id: Option<String>,
    #[serde(default)]
    /// Child ids as reported by the backend; informational only.
    pub children: Vec<String>,
}

#[derive(Clone, Debug, Default)]
/// Flat list of one document's sections, immutable per fetch.
pub struct SectionStore {
    sections: Vec<Section>,
}

impl SectionStore {
    #[must_use]
    /// Wraps a freshly fetched section list.
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    #[must_use]
    /// Sections in backend order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    #[must_use]
    /// First section in backend order, which need not be a root.
    pub fn first(&self) -> Option<&Section> {
        self.sections.first()
    }

    #[must_use]
    /// Looks a section up by id; the first occurrence wins on duplicates.
    pub fn get(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    #[must_use]
    /// Number of sections held.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    /// Whether the document has no sections yet.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
