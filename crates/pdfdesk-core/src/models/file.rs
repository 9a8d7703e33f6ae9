use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::PDF_MEDIA_TYPE;

/// A file the user picked for upload.
///
/// Held in memory only. The content is reference-counted so the pipeline can
/// hand it to the transfer stage without copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    media_type: Option<String>,
    content: Bytes,
    last_modified: Option<DateTime<Utc>>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: Option<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.filter(|t| !t.trim().is_empty()),
            content: content.into(),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type, if any.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    /// Whether the declared media type is `application/pdf`.
    ///
    /// Parameters such as `; charset=binary` are ignored.
    pub fn is_pdf(&self) -> bool {
        self.media_type
            .as_deref()
            .and_then(|t| t.split(';').next())
            .map(|t| t.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
    }

    /// Value for the `Content-Type` header of the storage write.
    pub fn content_type(&self) -> &str {
        self.media_type.as_deref().unwrap_or(PDF_MEDIA_TYPE)
    }
}

/// Guess the declared media type of a file from its name.
pub fn media_type_for_name(name: &str) -> Option<&'static str> {
    mime_guess::from_path(name).first_raw()
}
