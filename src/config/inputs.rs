// src/config/inputs.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::datafind::{parse_cache, record_from_frame_path};
use crate::errors::{GwflowError, Result};
use crate::files::{FileList, FileRole, WorkflowFile};
use crate::segments::{Segment, SegmentsByDetector, is_ordered_disjoint};

/// Input manifest as read from TOML.
///
/// ```toml
/// frames = ["/frames/H-H1_LDAS_C02_L2-967593543-128.gwf"]
/// data_cache = ["datafind/L1.lcf"]
///
/// [[segment]]
/// detector = "H1"
/// start = 967593543
/// end = 967603543
///
/// [[data]]
/// detector = "L1"
/// start = 967593000
/// end = 967604000
/// path = "/frames/L1/"
///
/// [injection]
/// path = "injections/HL-INJECTIONS-967593543-10000.xml"
/// start = 967593543
/// end = 967603543
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInputManifest {
    #[serde(default)]
    pub segment: Vec<RawSegment>,

    #[serde(default)]
    pub data: Vec<RawDataRecord>,

    /// Frame file paths; detector and span come from the file name.
    #[serde(default)]
    pub frames: Vec<PathBuf>,

    /// LAL cache files listing frame files.
    #[serde(default)]
    pub data_cache: Vec<PathBuf>,

    #[serde(default)]
    pub injection: Option<RawInjection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSegment {
    pub detector: String,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDataRecord {
    pub detector: String,
    pub start: i64,
    pub end: i64,
    pub path: PathBuf,
    #[serde(default = "default_data_description")]
    pub description: String,
}

fn default_data_description() -> String {
    "DATAFIND".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInjection {
    pub path: PathBuf,
    pub start: i64,
    pub end: i64,
}

/// Validated inputs for planning.
#[derive(Debug, Clone, Default)]
pub struct InputManifest {
    pub segments: SegmentsByDetector,
    pub data_locations: FileList,
    pub injection: Option<WorkflowFile>,
}

impl InputManifest {
    /// Validate a raw manifest. `caches` holds `(path, contents)` of each
    /// cache file listed in `data_cache`, already read by the caller.
    pub fn from_raw(raw: RawInputManifest, caches: &[(PathBuf, String)]) -> Result<Self> {
        let mut segments = SegmentsByDetector::new();
        for seg in &raw.segment {
            check_span("segment", &seg.detector, seg.start, seg.end)?;
            segments
                .entry(seg.detector.clone())
                .or_default()
                .push(Segment::new(seg.start, seg.end));
        }
        for (detector, list) in segments.iter_mut() {
            list.sort();
            if !is_ordered_disjoint(list) {
                return Err(GwflowError::ConfigError(format!(
                    "segments for detector {detector} overlap"
                )));
            }
        }

        let mut data_locations = FileList::new();
        for rec in &raw.data {
            check_span("data", &rec.detector, rec.start, rec.end)?;
            data_locations.push(WorkflowFile::new(
                Some(rec.detector.clone()),
                Segment::new(rec.start, rec.end),
                rec.path.clone(),
                rec.description.clone(),
                FileRole::DataLocation,
            ));
        }
        for frame in &raw.frames {
            data_locations.push(record_from_frame_path(frame)?);
        }
        for (path, text) in caches {
            data_locations.extend(parse_cache(path, text)?);
        }

        let injection = match raw.injection {
            Some(inj) => {
                check_span("injection", "-", inj.start, inj.end)?;
                Some(WorkflowFile::new(
                    None,
                    Segment::new(inj.start, inj.end),
                    inj.path,
                    "INJECTIONS",
                    FileRole::Injection,
                ))
            }
            None => None,
        };

        Ok(Self {
            segments,
            data_locations,
            injection,
        })
    }

    pub fn detectors(&self) -> impl Iterator<Item = &str> {
        self.segments.keys().map(|d| d.as_str())
    }
}

fn check_span(kind: &str, detector: &str, start: i64, end: i64) -> Result<()> {
    if end <= start {
        return Err(GwflowError::ConfigError(format!(
            "{kind} entry for {detector} has end {end} not after start {start}"
        )));
    }
    Ok(())
}
