//! Transport traits for the upload pipeline
//!
//! The pipeline only needs two things from the outside world: a backend that
//! issues write tickets and an object store that accepts one write per ticket.
//! The API client crate implements both over HTTP; tests use in-memory fakes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ClientResult;
use crate::models::{UploadTicket, UploadTicketRequest};

/// Issues write tickets for new uploads.
#[async_trait]
pub trait TicketIssuer: Send + Sync {
    /// Ask the backend for a write capability for the described file.
    ///
    /// A success response without an upload URL must be reported as an error.
    async fn request_upload_ticket(&self, request: &UploadTicketRequest)
        -> ClientResult<UploadTicket>;
}

/// Accepts whole-object writes to capability URLs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` to `url` in a single request. No retry, no chunking.
    async fn put_object(&self, url: &str, content_type: &str, body: Bytes) -> ClientResult<()>;
}
