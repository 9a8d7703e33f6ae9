use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session persisted between CLI invocations.
///
/// `id_token` is the same token the backend stores in its `id_token` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub id_token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
