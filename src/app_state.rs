//! The state machine bridging backend payloads and the interactive views.
//!
//! A TUI needs a single source of truth that can be interrogated and mutated as the user navigates.
//! `AppState` never talks to the network itself: user actions queue [`Request`]s, which the
//! caller hands to the worker, and the worker's [`Reply`]s are fed back through
//! [`AppState::apply`]. Every reply replaces the state it concerns wholesale, so a slow or failed
//! request simply leaves the previous state on screen.

use crate::api::{validate_query, validate_upload};
use crate::citation::{present, PresentedCitation};
use crate::lifecycle::{needs_polling, MutationGate, MutationKind};
use crate::models::{DocumentDetailResponse, DocumentMetadata, SearchResponse};
use crate::section::{Section, SectionStore};
use crate::selection::{Selection, VisibleRow};
use crate::tree::{build_tree, find_path, TreeNode};
use crate::worker::{Reply, Request};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// Determines which screen renders and how input is interpreted.
pub enum View {
    /// Uploaded documents with their processing status.
    Documents,
    /// Section outline and content of one document.
    Sections,
    /// Query, answer and ranked citations.
    Search,
}

#[derive(Clone, PartialEq, Eq, Debug)]
/// Destructive action awaiting a yes/no answer.
pub enum ConfirmAction {
    /// Delete the document with this id.
    Delete(String),
    /// Delete every document.
    Reset,
}

#[derive(Clone, PartialEq, Eq, Debug)]
/// Whether keystrokes navigate or fill a text prompt.
pub enum InputMode {
    /// Keys navigate the current view.
    Normal,
    /// Keys edit the search query.
    Query,
    /// Keys edit the path of a PDF to upload.
    UploadPath,
    /// `y` confirms the pending action, anything else cancels it.
    Confirm(ConfirmAction),
}

/// One loaded document: its flat sections, derived forest, and selection state.
pub struct DocumentView {
    /// Processing record as last fetched.
    pub metadata: DocumentMetadata,
    /// Sections exactly as fetched.
    pub store: SectionStore,
    /// Hierarchy derived from the store.
    pub forest: Vec<TreeNode>,
    /// Current section and expansion state.
    pub selection: Selection,
    /// Highlighted row in the outline.
    pub cursor: usize,
    /// Vertical scroll of the content pane.
    pub content_scroll: u16,
}

impl DocumentView {
    #[must_use]
    /// Builds the outline for a freshly fetched document.
    pub fn new(detail: DocumentDetailResponse) -> Self {
        let forest = build_tree(&detail.sections);
        let selection = Selection::new(&forest);
        let mut view = Self {
            metadata: detail.metadata,
            store: SectionStore::new(detail.sections),
            forest,
            selection,
            cursor: 0,
            content_scroll: 0,
        };
        view.sync_cursor();
        view
    }

    #[must_use]
    /// Outline rows as they should be drawn right now.
    pub fn rows(&self) -> Vec<VisibleRow<'_>> {
        self.selection.visible_rows(&self.forest)
    }

    #[must_use]
    /// Section shown in the content pane.
    pub fn current_section(&self) -> Option<&Section> {
        self.selection.current_section(&self.store)
    }

    /// Selects `section_id`, expanding its ancestors and moving the cursor onto it.
    pub fn focus(&mut self, section_id: &str) -> bool {
        if !self.selection.select_id(&self.store, section_id) {
            return false;
        }
        self.selection.reveal(&self.forest, section_id);
        self.content_scroll = 0;
        self.sync_cursor();
        true
    }

    /// Moves the outline cursor by `delta` rows, clamped to the visible rows.
    pub fn move_cursor(&mut self, delta: isize) {
        let last = self.rows().len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// Jumps the cursor to the first or last visible row.
    pub fn cursor_to_edge(&mut self, end: bool) {
        self.cursor = if end {
            self.rows().len().saturating_sub(1)
        } else {
            0
        };
    }

    /// Makes the section under the cursor current.
    pub fn select_at_cursor(&mut self) {
        let picked = self.rows().get(self.cursor).map(|row| row.node.section.clone());
        if let Some(section) = picked {
            self.selection.select(section);
            self.content_scroll = 0;
        }
    }

    /// Expands or collapses the node under the cursor; leaves have no control to toggle.
    pub fn toggle_at_cursor(&mut self) -> bool {
        let id = self
            .rows()
            .get(self.cursor)
            .map(|row| row.node.section.id.clone());
        match id {
            Some(id) => {
                let changed = self.selection.toggle(&id);
                self.move_cursor(0);
                changed
            }
            None => false,
        }
    }

    /// Moves the cursor to the parent of the highlighted node, if it has one.
    pub fn cursor_to_parent(&mut self) {
        let parent = {
            let rows = self.rows();
            rows.get(self.cursor).and_then(|row| {
                (0..self.cursor)
                    .rev()
                    .find(|&i| rows[i].depth < row.depth)
            })
        };
        if let Some(parent) = parent {
            self.cursor = parent;
        }
    }

    #[must_use]
    /// Titles from the root down to the current section.
    pub fn breadcrumb(&self) -> Vec<String> {
        let Some(current) = self.current_section() else {
            return Vec::new();
        };
        let Some(path) = find_path(&self.forest, &current.id) else {
            return vec![current.title.clone()];
        };
        path.iter()
            .filter_map(|id| self.store.get(id))
            .map(|section| section.title.clone())
            .collect()
    }

    fn sync_cursor(&mut self) {
        let position = self.current_section().map(|current| current.id.clone()).and_then(|id| {
            self.rows()
                .iter()
                .position(|row| row.node.section.id == id)
        });
        self.cursor = position.unwrap_or(0);
    }
}

/// Bridges backend payloads and the interactive views, maintaining session state.
pub struct AppState {
    /// Active screen.
    pub current_view: View,
    /// Screen to return to when leaving the section view.
    pub return_view: View,
    /// How keystrokes are interpreted.
    pub input_mode: InputMode,
    /// Text typed into the active prompt.
    pub input: String,
    /// Last fetched document list.
    pub documents: Vec<DocumentMetadata>,
    /// Whether any list has arrived yet, to tell "loading" from "empty".
    pub documents_loaded: bool,
    /// Highlighted document in the list.
    pub document_cursor: usize,
    /// Document open in the section view.
    pub document: Option<DocumentView>,
    /// Document whose sections are being fetched.
    pub loading_document: Option<String>,
    /// Last search result.
    pub search: Option<SearchResponse>,
    /// Whether a search is awaiting its answer.
    pub search_pending: bool,
    /// Highlighted citation in the search view.
    pub citation_cursor: usize,
    /// In-flight mutations, disabling their actions.
    pub gate: MutationGate,
    /// Status feedback displayed in the help bar.
    pub message: Option<String>,
    outbox: Vec<Request>,
    list_pending: bool,
    last_refresh: Option<Instant>,
    poll_interval: Duration,
}

impl AppState {
    #[must_use]
    /// Starts on the document list with its first fetch already queued.
    pub fn new(poll_interval: Duration) -> Self {
        let mut state = Self {
            current_view: View::Documents,
            return_view: View::Documents,
            input_mode: InputMode::Normal,
            input: String::new(),
            documents: Vec::new(),
            documents_loaded: false,
            document_cursor: 0,
            document: None,
            loading_document: None,
            search: None,
            search_pending: false,
            citation_cursor: 0,
            gate: MutationGate::default(),
            message: None,
            outbox: Vec::new(),
            list_pending: false,
            last_refresh: None,
            poll_interval,
        };
        state.refresh_documents();
        state
    }

    /// Hands over every request queued since the last call.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    /// Queues a document list fetch unless one is already outstanding.
    pub fn refresh_documents(&mut self) {
        if self.list_pending {
            return;
        }
        self.list_pending = true;
        self.last_refresh = Some(Instant::now());
        self.outbox.push(Request::ListDocuments);
    }

    #[must_use]
    /// Whether some document has not reached a terminal status yet.
    pub fn needs_polling(&self) -> bool {
        needs_polling(self.documents.iter().map(|doc| &doc.status))
    }

    /// Schedules the next list refresh while documents are still being processed.
    pub fn tick(&mut self, now: Instant) {
        if !self.needs_polling() {
            return;
        }
        let due = self
            .last_refresh
            .is_none_or(|last| now.duration_since(last) >= self.poll_interval);
        if due {
            debug!("documents still processing, polling");
            self.refresh_documents();
        }
    }

    #[must_use]
    /// Document under the list cursor.
    pub fn highlighted_document(&self) -> Option<&DocumentMetadata> {
        self.documents.get(self.document_cursor)
    }

    /// Moves the document list cursor by `delta`, clamped to the list.
    pub fn move_document_cursor(&mut self, delta: isize) {
        let last = self.documents.len().saturating_sub(1);
        self.document_cursor = self.document_cursor.saturating_add_signed(delta).min(last);
    }

    /// Moves the citation cursor by `delta`, clamped to the results.
    pub fn move_citation_cursor(&mut self, delta: isize) {
        let count = self.search.as_ref().map_or(0, |s| s.citations.len());
        let last = count.saturating_sub(1);
        self.citation_cursor = self.citation_cursor.saturating_add_signed(delta).min(last);
    }

    /// Opens a document, optionally selecting `focus` once its sections arrive.
    pub fn open_document(&mut self, document_id: &str, focus: Option<String>) {
        if self.current_view != View::Sections {
            self.return_view = self.current_view;
        }
        self.current_view = View::Sections;
        self.document = None;
        self.loading_document = Some(document_id.to_string());
        self.outbox.push(Request::OpenDocument {
            document_id: document_id.to_string(),
            focus,
        });
    }

    /// Opens the document under the list cursor.
    pub fn open_highlighted_document(&mut self) {
        if let Some(id) = self.highlighted_document().map(|doc| doc.id.clone()) {
            self.open_document(&id, None);
        }
    }

    /// Leaves the section view for wherever it was entered from.
    pub fn close_document(&mut self) {
        self.document = None;
        self.loading_document = None;
        self.current_view = self.return_view;
    }

    #[must_use]
    /// Citations of the last search, in backend order, ready for display.
    pub fn presented_citations(&self) -> Vec<PresentedCitation<'_>> {
        self.search
            .as_ref()
            .map(|result| present(&result.citations))
            .unwrap_or_default()
    }

    /// Submits a query; blank input or a search already in flight is refused.
    pub fn submit_search(&mut self, query: &str) {
        if self.search_pending {
            return;
        }
        match validate_query(query) {
            Ok(query) => {
                self.search_pending = true;
                self.message = None;
                self.outbox.push(Request::Search {
                    query: query.to_string(),
                });
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    /// Follows the citation at `rank` into its document and section.
    pub fn activate_citation(&mut self, rank: usize) {
        let target = self
            .presented_citations()
            .get(rank)
            .map(|presented| presented.target.clone());
        if let Some(target) = target {
            info!(link = %target, "following citation");
            self.open_document(&target.document_id, Some(target.section_id));
        }
    }

    /// Starts an upload unless one is in flight or the path is not a PDF.
    pub fn request_upload(&mut self, path: PathBuf) {
        if let Err(err) = validate_upload(&path) {
            self.message = Some(err.to_string());
            return;
        }
        if !self.gate.try_begin(MutationKind::Upload) {
            self.message = Some("An upload is already in progress".to_string());
            return;
        }
        self.message = Some(format!("Uploading {}...", path.display()));
        self.outbox.push(Request::Upload { path });
    }

    /// Starts deleting `document_id` unless a delete is already in flight.
    pub fn request_delete(&mut self, document_id: &str) {
        if !self.gate.try_begin(MutationKind::Delete) {
            self.message = Some("A delete is already in progress".to_string());
            return;
        }
        self.outbox.push(Request::Delete {
            document_id: document_id.to_string(),
        });
    }

    /// Starts deleting every document unless a reset is already in flight.
    pub fn request_reset(&mut self) {
        if !self.gate.try_begin(MutationKind::Reset) {
            self.message = Some("A reset is already in progress".to_string());
            return;
        }
        self.outbox.push(Request::Reset);
    }

    /// Asks for confirmation before a destructive action, if it is currently enabled.
    pub fn confirm(&mut self, action: ConfirmAction) {
        let kind = match action {
            ConfirmAction::Delete(_) => MutationKind::Delete,
            ConfirmAction::Reset => MutationKind::Reset,
        };
        if self.gate.is_enabled(kind) {
            self.input_mode = InputMode::Confirm(action);
        }
    }

    /// Resolves a pending confirmation.
    pub fn answer_confirmation(&mut self, accepted: bool) {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        if let (InputMode::Confirm(action), true) = (mode, accepted) {
            match action {
                ConfirmAction::Delete(id) => self.request_delete(&id),
                ConfirmAction::Reset => self.request_reset(),
            }
        }
    }

    /// Folds a worker reply into the state it concerns.
    pub fn apply(&mut self, reply: Reply) {
        match reply {
            Reply::Documents(result) => {
                self.list_pending = false;
                match result {
                    Ok(listing) => {
                        self.documents = listing.documents;
                        self.documents_loaded = true;
                        self.move_document_cursor(0);
                    }
                    Err(err) => self.report("Could not load documents", &err),
                }
            }
            Reply::Document {
                document_id,
                focus,
                result,
            } => self.apply_document(&document_id, focus.as_deref(), result),
            Reply::Search(result) => {
                self.search_pending = false;
                match result {
                    Ok(response) => {
                        self.citation_cursor = 0;
                        self.search = Some(response);
                    }
                    Err(err) => self.report("Search failed", &err),
                }
            }
            Reply::Uploaded(result) => {
                self.gate.finish(MutationKind::Upload);
                match result {
                    Ok(ack) => {
                        self.message = Some(format!("{}: {}", ack.filename, ack.status.label()));
                        self.refresh_documents();
                    }
                    Err(err) => self.report("Upload failed", &err),
                }
            }
            Reply::Deleted {
                document_id,
                result,
            } => {
                self.gate.finish(MutationKind::Delete);
                match result {
                    Ok(_) => {
                        self.documents.retain(|doc| doc.id != document_id);
                        self.move_document_cursor(0);
                        let open = self
                            .document
                            .as_ref()
                            .is_some_and(|doc| doc.metadata.id == document_id);
                        if open || self.loading_document.as_deref() == Some(document_id.as_str()) {
                            self.return_view = View::Documents;
                            self.close_document();
                        }
                        self.message = Some("Document deleted".to_string());
                        self.refresh_documents();
                    }
                    Err(err) => self.report("Delete failed", &err),
                }
            }
            Reply::Reset(result) => {
                self.gate.finish(MutationKind::Reset);
                match result {
                    Ok(_) => {
                        self.documents.clear();
                        self.document_cursor = 0;
                        if self.current_view == View::Sections {
                            self.return_view = View::Documents;
                            self.close_document();
                        }
                        self.message = Some("All documents deleted".to_string());
                        self.refresh_documents();
                    }
                    Err(err) => self.report("Reset failed", &err),
                }
            }
        }
    }

    fn apply_document(
        &mut self,
        document_id: &str,
        focus: Option<&str>,
        result: crate::Result<DocumentDetailResponse>,
    ) {
        if self.loading_document.as_deref() != Some(document_id) {
            debug!(document_id, "discarding stale document reply");
            return;
        }
        self.loading_document = None;

        match result {
            Ok(detail) => {
                let mut view = DocumentView::new(detail);
                if let Some(section_id) = focus {
                    if !view.focus(section_id) {
                        warn!(document_id, section_id, "cited section not in document");
                        self.message = Some(format!("Section {section_id} not found"));
                    }
                }
                self.document = Some(view);
            }
            Err(err) => self.report("Could not load document", &err),
        }
    }

    fn report(&mut self, context: &str, err: &crate::Error) {
        warn!(%err, "{context}");
        self.message = Some(format!("{context}: {err}"));
    }
}

#[cfg(test)]
#[path = "tests/app_state.rs"]
mod tests;
