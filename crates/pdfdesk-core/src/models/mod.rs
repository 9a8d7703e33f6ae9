//! Data models for the client
//!
//! Each sub-module covers one collaborator surface: the selected file held by
//! the upload pipeline, the upload ticket exchange, the file listing, search,
//! and the user/session records.

mod file;
mod record;
mod search;
mod session;
mod upload;
mod user;

// Re-export all models for convenient imports
pub use file::*;
pub use record::*;
pub use search::*;
pub use session::*;
pub use upload::*;
pub use user::*;
