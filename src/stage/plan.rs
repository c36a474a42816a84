// src/stage/plan.rs

use std::fmt;

use crate::files::FileList;
use crate::jobs::JobRecord;
use crate::partition::DroppedSpan;
use crate::segments::{Detector, Segment};
use crate::types::StageKind;

/// Why a window got no job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapReason {
    /// No set of data-location records covers the required span.
    MissingData,
    /// No template bank of the detector contains the window.
    MissingTemplateBank,
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapReason::MissingData => f.write_str("no data covers the required span"),
            GapReason::MissingTemplateBank => f.write_str("no template bank contains the window"),
        }
    }
}

/// A window dropped because its inputs were not available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub detector: Detector,
    pub window: Segment,
    /// Span the job would have needed to read.
    pub required: Segment,
    pub reason: GapReason,
}

/// Everything one stage call produced.
#[derive(Debug, Clone)]
pub struct StagePlan {
    pub stage: StageKind,
    /// Jobs in creation order: detector order, then window start.
    pub jobs: Vec<JobRecord>,
    /// Output files of `jobs`, same order.
    pub outputs: FileList,
    pub gaps: Vec<CoverageGap>,
    /// Analysable time that was too short for any job, per detector.
    pub dropped: Vec<(Detector, DroppedSpan)>,
    /// Non-fatal configuration consistency warnings.
    pub warnings: Vec<String>,
}

impl StagePlan {
    pub(crate) fn new(stage: StageKind) -> Self {
        Self {
            stage,
            jobs: Vec::new(),
            outputs: FileList::new(),
            gaps: Vec::new(),
            dropped: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn jobs_for<'a>(&'a self, detector: &'a str) -> impl Iterator<Item = &'a JobRecord> {
        self.jobs.iter().filter(move |j| j.detector == detector)
    }

    /// Windows of `detector`'s jobs in order.
    pub fn windows_for(&self, detector: &str) -> Vec<Segment> {
        self.jobs_for(detector).map(|j| j.window).collect()
    }

    /// Consume the plan, keeping only the output collection.
    pub fn into_outputs(self) -> FileList {
        self.outputs
    }
}
