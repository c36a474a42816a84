// src/jobs/record.rs

use std::fmt;
use std::path::PathBuf;

use blake3::Hasher;
use serde::Serialize;

use crate::files::WorkflowFile;
use crate::segments::{Detector, Segment};

/// Stable job identifier.
///
/// First 16 hex characters of a BLAKE3 digest over executable, detector, tags
/// and window, so the same job gets the same id on every run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn derive(executable: &str, detector: &str, tags: &[String], window: &Segment) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(executable.as_bytes());
        hasher.update(b"\0");
        hasher.update(detector.as_bytes());
        hasher.update(b"\0");
        for tag in tags {
            hasher.update(tag.to_uppercase().as_bytes());
            hasher.update(b"\0");
        }
        hasher.update(&window.start.to_le_bytes());
        hasher.update(&window.end.to_le_bytes());

        let hex = hasher.finalize().to_hex();
        JobId(hex.as_str()[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One concrete unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub id: JobId,
    pub executable: String,
    pub executable_path: PathBuf,
    pub detector: Detector,
    /// Time this job produces output for.
    pub window: Segment,
    /// Time this job reads, margins included.
    pub data_span: Segment,
    /// Data locations, then the template bank, then the injection file.
    pub inputs: Vec<WorkflowFile>,
    /// Files produced by upstream jobs that must finish first.
    pub parents: Vec<WorkflowFile>,
    pub output: WorkflowFile,
}

impl JobRecord {
    pub fn data_inputs(&self) -> impl Iterator<Item = &WorkflowFile> {
        self.inputs
            .iter()
            .filter(|f| f.role == crate::files::FileRole::DataLocation)
    }
}
