use serde::{Deserialize, Serialize};

use crate::models::FileRecord;

/// Similarity presets offered by the dashboard, highest first.
pub const SEARCH_THRESHOLD_PRESETS: [f64; 5] = [0.90, 0.85, 0.80, 0.75, 0.65];

pub const DEFAULT_SEARCH_THRESHOLD: f64 = 0.75;

/// Response of `GET /api/search/`: the best matching file and the generated
/// answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub file: FileRecord,
    pub response: String,
}

/// One question/answer exchange, as kept by a search session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchExchange {
    pub query: String,
    pub threshold: f64,
    pub file: FileRecord,
    pub response: String,
}

/// Normalise a user query: trim and collapse runs of whitespace.
///
/// Returns `None` when nothing is left to search for.
pub fn normalize_query(query: &str) -> Option<String> {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Whether `threshold` is a usable similarity fraction.
pub fn is_valid_threshold(threshold: f64) -> bool {
    threshold.is_finite() && (0.0..=1.0).contains(&threshold)
}
