// src/datafind.rs

//! Data-location records from frame file names and LAL cache files.
//!
//! Frame files follow `<OBS>-<TYPE>-<START>-<DURATION>.<ext>` where `TYPE`
//! starts with the detector, e.g. `H-H1_LDAS_C02_L2-967593543-128.gwf`.
//! Cache files hold one frame per line: `OBS TYPE START DURATION URL`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{GwflowError, Result};
use crate::files::{FileList, FileRole, WorkflowFile};
use crate::segments::Segment;

static FRAME_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<obs>[A-Z]+)-(?P<type>[A-Za-z0-9_]+)-(?P<start>\d+)-(?P<dur>\d+)\.[A-Za-z0-9.]+$")
        .expect("frame name regex is valid")
});

static DETECTOR_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<det>[A-Z]\d)_").expect("detector regex is valid"));

/// Build a data-location record from a frame file path.
pub fn record_from_frame_path(path: impl AsRef<Path>) -> Result<WorkflowFile> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let caps = FRAME_NAME_RE.captures(&name).ok_or_else(|| {
        GwflowError::ConfigError(format!(
            "frame file '{}' does not follow OBS-TYPE-START-DURATION.ext",
            path.display()
        ))
    })?;

    let frame_type = &caps["type"];
    let start = parse_seconds(&caps["start"], path)?;
    let duration = parse_seconds(&caps["dur"], path)?;
    let detector = detector_from_type(&caps["obs"], frame_type, path)?;
    let end = end_time(start, duration, path)?;

    Ok(WorkflowFile::new(
        Some(detector),
        Segment::new(start, end),
        path,
        frame_type,
        FileRole::DataLocation,
    ))
}

/// Parse the text of a LAL cache file into data-location records.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_cache(source: &Path, text: &str) -> Result<FileList> {
    let mut records = FileList::new();

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        let [obs, frame_type, start, duration, url] = fields.as_slice() else {
            return Err(GwflowError::ConfigError(format!(
                "{}:{}: expected 'OBS TYPE START DURATION URL', got '{}'",
                source.display(),
                lineno + 1,
                line
            )));
        };

        let start = parse_seconds(start, source)?;
        let duration = parse_seconds(duration, source)?;
        let detector = detector_from_type(obs, frame_type, source)?;
        let end = end_time(start, duration, source)?;

        records.push(WorkflowFile::new(
            Some(detector),
            Segment::new(start, end),
            url_to_path(url),
            *frame_type,
            FileRole::DataLocation,
        ));
    }

    Ok(records)
}

fn detector_from_type(obs: &str, frame_type: &str, source: &Path) -> Result<String> {
    if let Some(caps) = DETECTOR_PREFIX_RE.captures(frame_type) {
        let det = caps["det"].to_string();
        if det.starts_with(obs) {
            return Ok(det);
        }
    }
    Err(GwflowError::ConfigError(format!(
        "{}: cannot tell the detector of frame type '{}' at observatory '{}'",
        source.display(),
        frame_type,
        obs
    )))
}

fn parse_seconds(text: &str, source: &Path) -> Result<i64> {
    text.parse().map_err(|_| {
        GwflowError::ConfigError(format!(
            "{}: '{}' is not a whole number of GPS seconds",
            source.display(),
            text
        ))
    })
}

fn end_time(start: i64, duration: i64, source: &Path) -> Result<i64> {
    start.checked_add(duration).ok_or_else(|| {
        GwflowError::ConfigError(format!(
            "{}: span {start}+{duration} runs past the largest GPS time",
            source.display()
        ))
    })
}

fn url_to_path(url: &str) -> PathBuf {
    let stripped = url
        .strip_prefix("file://localhost")
        .or_else(|| url.strip_prefix("file://"))
        .unwrap_or(url);
    PathBuf::from(stripped)
}
