//! Turning a path on disk into a [`SelectedFile`].

use chrono::{DateTime, Utc};
use pdfdesk_core::models::{media_type_for_name, SelectedFile};
use pdfdesk_core::{ClientError, ClientResult};
use std::path::Path;

/// Read `path` fully into memory.
///
/// The declared media type is `media_type` when given, otherwise guessed from
/// the file extension. Nothing about the content is inspected here; whether
/// the file is acceptable is the pipeline's decision.
pub async fn load_selection(path: &Path, media_type: Option<&str>) -> ClientResult<SelectedFile> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::InvalidInput(format!("Not a file: {}", path.display())))?;

    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(ClientError::InvalidInput(format!(
            "Not a file: {}",
            path.display()
        )));
    }
    let content = tokio::fs::read(path).await?;

    let declared = media_type
        .map(str::to_string)
        .or_else(|| media_type_for_name(&name).map(str::to_string));
    tracing::debug!(file = %name, size = content.len(), media_type = ?declared, "Loaded selection");

    let file = SelectedFile::new(name, declared, content);
    Ok(match metadata.modified() {
        Ok(modified) => file.with_last_modified(DateTime::<Utc>::from(modified)),
        Err(_) => file,
    })
}
