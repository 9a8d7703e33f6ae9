//! Small JSON files under the user's pdfdesk directory.

use pdfdesk_core::ClientResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;

/// `Ok(None)` when the file is missing or unreadable as `T`.
pub(crate) async fn read<T: DeserializeOwned>(path: &Path) -> ClientResult<Option<T>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed file");
            Ok(None)
        }
    }
}

pub(crate) async fn write<T: Serialize>(path: &Path, value: &T) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Remove `path`; a missing file is not an error.
pub(crate) async fn remove(path: &Path) -> ClientResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
