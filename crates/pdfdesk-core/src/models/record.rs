use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

/// Processing state of a stored file as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileStatus {
    Pending,
    Processing,
    Completed,
    #[serde(other)]
    Unknown,
}

impl FromStr for FileStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(FileStatus::Pending),
            "PROCESSING" => Ok(FileStatus::Processing),
            "COMPLETED" => Ok(FileStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid file status: {}", s)),
        }
    }
}

impl Display for FileStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileStatus::Pending => write!(f, "PENDING"),
            FileStatus::Processing => write!(f, "PROCESSING"),
            FileStatus::Completed => write!(f, "COMPLETED"),
            FileStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Owner summary embedded in file records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedBy {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
}

/// One entry of `GET /api/data/files/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub file_id: Uuid,
    pub file_name: String,
    #[serde(default)]
    pub s3_uri: Option<String>,
    /// Public URL the document can be viewed at.
    #[serde(default)]
    pub cdn_url: Option<String>,
    pub file_status: FileStatus,
    #[serde(default)]
    pub processed_flag: bool,
    #[serde(default)]
    pub uploaded_by_user: Option<UploadedBy>,
    /// Only present in search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn uploader_email(&self) -> Option<&str> {
        self.uploaded_by_user.as_ref().map(|u| u.email.as_str())
    }
}
