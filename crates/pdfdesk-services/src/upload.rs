//! Upload pipeline
//!
//! select → fingerprint → write ticket → transfer → complete, strictly in
//! that order. A failing stage skips every later one and the failure becomes
//! the outcome. Nothing is retried: a ticket is single-use, so a new attempt
//! always starts again from the fingerprint.

use pdfdesk_core::models::{SelectedFile, UploadOutcome, UploadTicketRequest};
use pdfdesk_core::{Fingerprint, ObjectStore, TicketIssuer, UploadError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::refresh::RefreshSignal;

/// Shown while a pipeline run is outstanding.
pub const UPLOADING_STATUS: &str = "Uploading...";

/// Callback fired once per pipeline run with its outcome.
pub type CompletionHandler = Box<dyn Fn(&UploadOutcome) + Send + Sync>;

/// Content fingerprint of a selected file. Name and timestamps are ignored.
pub fn compute_fingerprint(file: &SelectedFile) -> Fingerprint {
    Fingerprint::of(file.content())
}

#[derive(Default)]
struct Selection {
    file: Option<SelectedFile>,
    /// Bumped on every accepted selection so a finished run only clears the
    /// file it actually uploaded.
    generation: u64,
}

/// Resets the in-progress flag however the run ends.
struct InProgressGuard<'a>(&'a AtomicBool);

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct UploadPipeline {
    issuer: Arc<dyn TicketIssuer>,
    store: Arc<dyn ObjectStore>,
    refresh: RefreshSignal,
    selection: Mutex<Selection>,
    status: Mutex<Option<String>>,
    in_progress: AtomicBool,
    on_complete: Option<CompletionHandler>,
}

impl UploadPipeline {
    pub fn new(
        issuer: Arc<dyn TicketIssuer>,
        store: Arc<dyn ObjectStore>,
        refresh: RefreshSignal,
    ) -> Self {
        Self {
            issuer,
            store,
            refresh,
            selection: Mutex::new(Selection::default()),
            status: Mutex::new(None),
            in_progress: AtomicBool::new(false),
            on_complete: None,
        }
    }

    pub fn with_completion_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&UploadOutcome) + Send + Sync + 'static,
    {
        self.on_complete = Some(Box::new(handler));
        self
    }

    /// Hold `candidate` for the next upload.
    ///
    /// Only `application/pdf` is accepted. A rejected candidate leaves the
    /// current selection untouched and sets the status to the rejection
    /// message; an accepted one replaces the selection and clears the status.
    pub async fn select_file(&self, candidate: SelectedFile) -> Result<(), UploadError> {
        if !candidate.is_pdf() {
            let err = UploadError::InvalidSelection {
                media_type: candidate.media_type().map(str::to_string),
            };
            tracing::debug!(file = %candidate.name(), media_type = ?candidate.media_type(), "Selection rejected");
            *self.status.lock().await = Some(err.to_string());
            return Err(err);
        }

        let mut selection = self.selection.lock().await;
        tracing::debug!(file = %candidate.name(), size = candidate.size(), "File selected");
        selection.file = Some(candidate);
        selection.generation += 1;
        *self.status.lock().await = None;
        Ok(())
    }

    pub async fn selected(&self) -> Option<SelectedFile> {
        self.selection.lock().await.file.clone()
    }

    pub async fn clear_selection(&self) {
        let mut selection = self.selection.lock().await;
        selection.file = None;
        selection.generation += 1;
    }

    /// Current status line, if any.
    pub async fn status(&self) -> Option<String> {
        self.status.lock().await.clone()
    }

    pub fn is_uploading(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    pub fn refresh_signal(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// Run the pipeline on the held file.
    ///
    /// Returns `Err` only for local refusals (nothing selected, a run already
    /// outstanding); those never touch the network and never fire the
    /// completion handler. Every run that starts ends in an [`UploadOutcome`],
    /// reported to the handler exactly once.
    pub async fn upload(&self) -> Result<UploadOutcome, UploadError> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Upload requested while another is in progress");
            return Err(UploadError::InProgress);
        }
        let _guard = InProgressGuard(&self.in_progress);

        let (file, generation) = {
            let selection = self.selection.lock().await;
            match &selection.file {
                Some(file) => (file.clone(), selection.generation),
                None => {
                    let err = UploadError::NoFileSelected;
                    *self.status.lock().await = Some(err.to_string());
                    return Err(err);
                }
            }
        };
        *self.status.lock().await = Some(UPLOADING_STATUS.to_string());

        let outcome = self.run(&file).await;

        if outcome.is_stored() {
            let mut selection = self.selection.lock().await;
            if selection.generation == generation {
                selection.file = None;
            }
            drop(selection);
            self.refresh.notify();
        }

        *self.status.lock().await = Some(outcome.status_message());
        if let Some(handler) = &self.on_complete {
            handler(&outcome);
        }
        Ok(outcome)
    }

    async fn run(&self, file: &SelectedFile) -> UploadOutcome {
        let fingerprint = compute_fingerprint(file);
        tracing::info!(file = %file.name(), size = file.size(), fingerprint = %fingerprint, "Requesting upload ticket");

        let request = UploadTicketRequest::for_file(fingerprint.clone(), file);
        let ticket = match self.issuer.request_upload_ticket(&request).await {
            Ok(ticket) => ticket,
            Err(e) => {
                tracing::warn!(file = %file.name(), error = %e, "Backend rejected upload");
                return UploadOutcome::RejectedByBackend {
                    cause: e.user_message(),
                };
            }
        };

        tracing::info!(file = %file.name(), "Transferring to storage");
        if let Err(e) = self
            .store
            .put_object(&ticket.upload_url, file.content_type(), file.content().clone())
            .await
        {
            tracing::warn!(file = %file.name(), error = %e, "Storage rejected upload");
            return UploadOutcome::RejectedByStorage {
                cause: e.user_message(),
            };
        }

        tracing::info!(file = %file.name(), fingerprint = %fingerprint, "Upload stored");
        UploadOutcome::Stored {
            file_name: file.name().to_string(),
            fingerprint,
        }
    }
}
