//! pdfdesk Services Layer
//!
//! Client-side orchestration on top of the HTTP clients: the upload pipeline
//! and the listing refresh signal it drives, the explicit session state, the
//! account registration flow and search history. Front ends (the CLI) only
//! wire these together.

pub mod account;
mod json_file;
pub mod refresh;
pub mod search;
pub mod selection;
pub mod session;
pub mod upload;

pub use account::{PendingSignup, PendingSignupStore, SignUpForm};
pub use refresh::RefreshSignal;
pub use search::SearchSession;
pub use selection::load_selection;
pub use session::{SessionState, SessionStore};
pub use upload::{compute_fingerprint, CompletionHandler, UploadPipeline};
