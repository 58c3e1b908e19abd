//! Documents attached to a pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::DocumentId;

/// A document as listed for a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDocument {
    #[serde(rename = "document_id")]
    pub id: DocumentId,
    pub file_name: String,
    pub file_type: String,
    pub upload_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Extended metadata, fetched on demand rather than with the list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub metadata_id: u64,
    #[serde(rename = "document_id")]
    pub document: DocumentId,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub word_count: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    /// Object-storage locator, resolved to a time-limited URL on demand.
    #[serde(rename = "firebase_storage_path", default)]
    pub storage_path: Option<String>,
    #[serde(rename = "firebase_download_url", default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl DocumentMetadata {
    /// Human-readable size for the files table.
    #[must_use]
    pub fn size_label(&self) -> String {
        match self.file_size {
            None => "unknown".to_string(),
            Some(bytes) if bytes < 1024 => format!("{bytes} B"),
            Some(bytes) if bytes < 1024 * 1024 => format!("{:.1} KiB", bytes as f64 / 1024.0),
            Some(bytes) => format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0)),
        }
    }
}
