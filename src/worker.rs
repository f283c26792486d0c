//! Background threads running backend requests off the interface loop.
//!
//! Requests go in over one channel, replies come back over another and are drained by the
//! interface with `try_recv` between frames. Every request runs on its own thread, so replies
//! arrive in completion order rather than request order. Each reply carries everything needed
//! to replace the state it concerns wholesale.

use crate::api::ApiClient;
use crate::error::Result;
use crate::models::{
    Acknowledgement, DocumentDetailResponse, DocumentListResponse, SearchResponse, UploadResponse,
};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq)]
/// Work the interface asks of the backend.
pub enum Request {
    /// Refresh the document list.
    ListDocuments,
    /// Load one document's metadata and sections.
    OpenDocument {
        /// Document to load.
        document_id: String,
        /// Section to select once loaded, when arriving from a citation or deep link.
        focus: Option<String>,
    },
    /// Run a natural-language query.
    Search {
        /// Text as typed by the user.
        query: String,
    },
    /// Send a local PDF for analysis.
    Upload {
        /// File to send.
        path: PathBuf,
    },
    /// Remove one document.
    Delete {
        /// Document to remove.
        document_id: String,
    },
    /// Remove every document.
    Reset,
}

#[derive(Debug)]
/// Outcome of a [`Request`], success or failure.
pub enum Reply {
    /// Answer to [`Request::ListDocuments`].
    Documents(Result<DocumentListResponse>),
    /// Answer to [`Request::OpenDocument`].
    Document {
        /// Document that was requested.
        document_id: String,
        /// Section to select, echoed from the request.
        focus: Option<String>,
        /// Loaded document or the failure.
        result: Result<DocumentDetailResponse>,
    },
    /// Answer to [`Request::Search`].
    Search(Result<SearchResponse>),
    /// Answer to [`Request::Upload`].
    Uploaded(Result<UploadResponse>),
    /// Answer to [`Request::Delete`].
    Deleted {
        /// Document that was targeted.
        document_id: String,
        /// Acknowledgement or the failure.
        result: Result<Acknowledgement>,
    },
    /// Answer to [`Request::Reset`].
    Reset(Result<Acknowledgement>),
}

/// Performs one request synchronously.
#[must_use]
pub fn handle(client: &ApiClient, request: Request) -> Reply {
    match request {
        Request::ListDocuments => Reply::Documents(client.list_documents()),
        Request::OpenDocument { document_id, focus } => {
            let result = client.get_document(&document_id);
            Reply::Document {
                document_id,
                focus,
                result,
            }
        }
        Request::Search { query } => Reply::Search(client.search(&query)),
        Request::Upload { path } => Reply::Uploaded(client.upload(&path)),
        Request::Delete { document_id } => {
            let result = client.delete_document(&document_id);
            Reply::Deleted {
                document_id,
                result,
            }
        }
        Request::Reset => Reply::Reset(client.reset()),
    }
}

/// Handle on the request dispatcher; dropping it stops new requests from being started.
pub struct Worker {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
}

impl Worker {
    #[must_use]
    /// Starts the dispatcher for `client`.
    pub fn spawn(client: ApiClient) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (reply_tx, reply_rx) = mpsc::channel();

        thread::spawn(move || {
            for request in request_rx {
                let client = client.clone();
                let reply_tx = reply_tx.clone();
                thread::spawn(move || {
                    debug!(?request, "handling request");
                    if reply_tx.send(handle(&client, request)).is_err() {
                        debug!("interface gone, reply dropped");
                    }
                });
            }
            debug!("request channel closed, dispatcher exiting");
        });

        Self {
            requests: request_tx,
            replies: reply_rx,
        }
    }

    /// Queues a request, returning whether the worker is still alive to take it.
    pub fn send(&self, request: Request) -> bool {
        if self.requests.send(request).is_err() {
            warn!("worker thread is gone, request dropped");
            return false;
        }
        true
    }

    /// Collects every reply that has arrived, without blocking.
    pub fn drain(&self) -> Vec<Reply> {
        let mut replies = Vec::new();
        loop {
            match self.replies.try_recv() {
                Ok(reply) => replies.push(reply),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        replies
    }

    /// Blocks up to `timeout` for the next reply.
    pub fn wait(&self, timeout: Duration) -> Option<Reply> {
        match self.replies.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/worker.rs"]
mod tests;
