/// Transcode job record
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
}

/// One transcoded output at a specific format/resolution/bitrate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rendition {
    pub format: String,
    pub resolution: u32,
    pub bitrate: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Result of processing one uploaded source. Immutable once `status` is
/// terminal; callers inspect `status` and `error` rather than catching
/// anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeJob {
    pub id: Uuid,
    pub source: PathBuf,
    pub duration_seconds: f64,
    pub width: u32,
    pub height: u32,
    pub outputs: Vec<Rendition>,
    pub thumbnail: Option<PathBuf>,
    pub status: JobStatus,
    pub error: Option<String>,
}

impl TranscodeJob {
    pub(crate) fn pending(source: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            duration_seconds: 0.0,
            width: 0,
            height: 0,
            outputs: Vec::new(),
            thumbnail: None,
            status: JobStatus::Pending,
            error: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }
}
