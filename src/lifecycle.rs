//! Document processing status and the gating of destructive actions.
//!
//! The backend drives documents through a forward-only state machine:
//!
//! ```text
//! Pending -> InProgress -> Completed
//!                      \-> Failed
//! ```
//!
//! `Completed` and `Failed` are terminal; the client never moves a document out of them. Status
//! only decides labels and whether the document list still needs polling. Whether an action is
//! available is decided by [`MutationGate`] from what is in flight, never from status.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Where a document is in the analysis pipeline.
pub enum DocumentStatus {
    /// Uploaded, waiting for analysis to start.
    Pending,
    /// Analysis running.
    InProgress,
    /// Sections extracted and indexed.
    Completed,
    /// Analysis gave up; see the document's error message.
    Failed,
}

impl DocumentStatus {
    #[must_use]
    /// Wire form, e.g. `in_progress`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    /// Badge text: underscores become spaces, then upper-cased (`IN PROGRESS`).
    pub fn label(self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }

    #[must_use]
    /// Whether no further backend transition is expected.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    #[must_use]
    /// Whether `next` is a legal forward step from this status.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress)
                | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[must_use]
/// Whether the document list should keep being refreshed.
pub fn needs_polling<'a, I>(statuses: I) -> bool
where
    I: IntoIterator<Item = &'a DocumentStatus>,
{
    statuses.into_iter().any(|status| !status.is_terminal())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Kinds of request that change backend state.
pub enum MutationKind {
    /// Sending a new PDF.
    Upload,
    /// Removing one document.
    Delete,
    /// Removing every document.
    Reset,
}

impl MutationKind {
    #[must_use]
    /// Text shown in place of the action while it is in flight.
    pub fn pending_label(self) -> &'static str {
        match self {
            Self::Upload => "Uploading...",
            Self::Delete => "Deleting...",
            Self::Reset => "Resetting...",
        }
    }
}

#[derive(Clone, Debug, Default)]
/// Tracks which mutations are awaiting a response.
///
/// At most one mutation of each kind may be in flight; the triggering action stays disabled
/// until that request resolves, successfully or not.
pub struct MutationGate {
    in_flight: HashSet<MutationKind>,
}

impl MutationGate {
    #[must_use]
    /// Whether the action for `kind` can be triggered now.
    pub fn is_enabled(&self, kind: MutationKind) -> bool {
        !self.in_flight.contains(&kind)
    }

    #[must_use]
    /// Whether a request of `kind` is awaiting its response.
    pub fn is_pending(&self, kind: MutationKind) -> bool {
        self.in_flight.contains(&kind)
    }

    /// Marks a mutation as started; refuses if one of the same kind is already in flight.
    pub fn try_begin(&mut self, kind: MutationKind) -> bool {
        self.in_flight.insert(kind)
    }

    /// Marks a mutation as resolved, re-enabling its action.
    pub fn finish(&mut self, kind: MutationKind) {
        self.in_flight.remove(&kind);
    }
}

#[cfg(test)]
#[path = "tests/lifecycle.rs"]
mod tests;
