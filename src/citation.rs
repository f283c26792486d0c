//! Ranked presentation of search citations with deep-link targets.
//!
//! The backend ranks citations; this module never reorders them. Each entry is tagged with its
//! position (which is what tells repeated hits on the same section apart), a relevance label,
//! and the document/section pair that activating it should open.

use crate::models::Citation;
use std::fmt;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// Where a citation leads: a section inside a specific document.
pub struct NavigationTarget {
    /// Document to open.
    pub document_id: String,
    /// Section to select once that document's sections are loaded.
    pub section_id: String,
}

impl NavigationTarget {
    #[must_use]
    /// Route form of the target, as used by the web front end.
    pub fn deep_link(&self) -> String {
        format!("/documents/{}?section={}", self.document_id, self.section_id)
    }
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.deep_link())
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A citation ready for display at its rank.
pub struct PresentedCitation<'a> {
    /// Zero-based position in the backend's ranking.
    pub rank: usize,
    /// The underlying hit.
    pub citation: &'a Citation,
    /// Relevance as a percentage with one decimal, e.g. `87.3%`.
    pub relevance: String,
    /// Stable display key, unique even for repeated document/section pairs.
    pub key: String,
    /// Where activating the entry navigates to.
    pub target: NavigationTarget,
}

#[must_use]
/// Formats a score as a percentage with one decimal place.
///
/// Scores outside 0..=1 (or not finite) are printed as they are, never clamped.
pub fn format_relevance(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

#[must_use]
/// Exposes citations in backend order, each with a navigation target.
pub fn present(citations: &[Citation]) -> Vec<PresentedCitation<'_>> {
    if !is_rank_ordered(citations) {
        warn!("citations arrived out of score order; showing backend order");
    }

    citations
        .iter()
        .enumerate()
        .map(|(rank, citation)| PresentedCitation {
            rank,
            citation,
            relevance: format_relevance(citation.score),
            key: format!("{}-{}-{}", citation.document_id, citation.section_id, rank),
            target: NavigationTarget {
                document_id: citation.document_id.clone(),
                section_id: citation.section_id.clone(),
            },
        })
        .collect()
}

#[must_use]
/// Whether scores are non-increasing, i.e. the backend honoured its ranking contract.
pub fn is_rank_ordered(citations: &[Citation]) -> bool {
    citations.windows(2).all(|pair| pair[0].score >= pair[1].score)
}

#[must_use]
/// Heading shown above the citation list.
pub fn summary(count: usize) -> String {
    format!("{count} relevant sections found")
}

#[cfg(test)]
#[path = "tests/citation.rs"]
mod tests;
