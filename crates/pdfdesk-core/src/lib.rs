//! pdfdesk Core Library
//!
//! This crate provides the domain models, error types, configuration and the
//! transport traits shared by the API client, the service layer and the CLI.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod models;
pub mod transport;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorBody, UploadError};
pub use fingerprint::Fingerprint;
pub use transport::{ObjectStore, TicketIssuer};

/// Canonical media type for every document the service accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";
