use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;
use crate::models::SelectedFile;

/// Body of `POST /api/uploads/upload-request/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicketRequest {
    pub file_hash: Fingerprint,
    pub file_name: String,
    pub file_size: u64,
    /// Declared media type; empty when the file carries none.
    pub file_type: String,
}

impl UploadTicketRequest {
    pub fn for_file(fingerprint: Fingerprint, file: &SelectedFile) -> Self {
        Self {
            file_hash: fingerprint,
            file_name: file.name().to_string(),
            file_size: file.size(),
            file_type: file.media_type().unwrap_or_default().to_string(),
        }
    }
}

/// Raw success body of the ticket request. `upload_url` is absent when the
/// backend answers with an informational reply instead of a ticket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadTicketResponse {
    #[serde(default)]
    pub upload_url: Option<String>,
    #[serde(default)]
    pub file_hash: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A single-use, time-bounded write capability for object storage.
///
/// Expiry is enforced by the storage service; the client never reuses one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTicket {
    pub upload_url: String,
}

/// Terminal result of one upload pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Bytes were accepted by object storage.
    Stored {
        file_name: String,
        fingerprint: Fingerprint,
    },
    /// The backend refused to issue a write ticket.
    RejectedByBackend { cause: String },
    /// Object storage refused the write.
    RejectedByStorage { cause: String },
}

impl UploadOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, UploadOutcome::Stored { .. })
    }

    /// Human-readable cause of a rejection.
    pub fn cause(&self) -> Option<&str> {
        match self {
            UploadOutcome::Stored { .. } => None,
            UploadOutcome::RejectedByBackend { cause }
            | UploadOutcome::RejectedByStorage { cause } => Some(cause),
        }
    }

    /// The single status line shown to the user.
    pub fn status_message(&self) -> String {
        match self.cause() {
            None => "PDF uploaded successfully.".to_string(),
            Some(cause) => format!("Upload failed: {}", cause),
        }
    }
}
