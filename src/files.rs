// src/files.rs

//! File descriptors passed between stages and the ordered collections that
//! hold them.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::segments::{Detector, Segment};

/// What a file is to the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    /// Where raw detector data for some span can be read.
    DataLocation,
    /// Output of the template-bank stage.
    TemplateBank,
    /// Simulated-signal file shared by every job of a stage.
    Injection,
    /// Output of the matched-filter stage.
    Triggers,
}

/// Opaque file handle: detector, span, path and tags.
///
/// Identity is the path together with the detector and span. Output names
/// encode detector and span, so outputs are unique by path alone; data
/// records may share a location (a frame directory) and differ in span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowFile {
    /// `None` for detector-independent files (injections).
    pub detector: Option<Detector>,
    pub span: Segment,
    pub path: PathBuf,
    pub description: String,
    pub tags: Vec<String>,
    pub role: FileRole,
}

impl WorkflowFile {
    pub fn new(
        detector: Option<Detector>,
        span: Segment,
        path: impl Into<PathBuf>,
        description: impl Into<String>,
        role: FileRole,
    ) -> Self {
        Self {
            detector,
            span,
            path: path.into(),
            description: description.into(),
            tags: Vec::new(),
            role,
        }
    }

    pub fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    /// Build the descriptor of a file a job will write.
    ///
    /// The name follows `<DET>-<DESCRIPTION>[_<TAG>...]-<START>-<DURATION>.<ext>`,
    /// so it is fully determined by detector, description, tags and span.
    pub fn output(
        output_dir: &Path,
        detector: &str,
        description: &str,
        tags: &[String],
        span: Segment,
        extension: &str,
        role: FileRole,
    ) -> Self {
        let mut label = description.to_uppercase();
        for tag in tags {
            label.push('_');
            label.push_str(&tag.to_uppercase());
        }
        let name = format!(
            "{}-{}-{}-{}.{}",
            detector,
            label,
            span.start,
            span.duration(),
            extension
        );
        Self {
            detector: Some(detector.to_string()),
            span,
            path: output_dir.join(name),
            description: description.to_uppercase(),
            tags: tags.to_vec(),
            role,
        }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// True if `other` describes the same file.
    pub fn same_file(&self, other: &WorkflowFile) -> bool {
        self.path == other.path && self.span == other.span && self.detector == other.detector
    }

    fn belongs_to(&self, detector: &str) -> bool {
        self.detector.as_deref() == Some(detector)
    }
}

/// Ordered collection of files with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FileList {
    files: Vec<WorkflowFile>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `file` unless the same file is already present.
    ///
    /// Returns `true` if the file was added.
    pub fn push(&mut self, file: WorkflowFile) -> bool {
        if self.files.iter().any(|f| f.same_file(&file)) {
            return false;
        }
        self.files.push(file);
        true
    }

    pub fn extend(&mut self, other: FileList) {
        for file in other.files {
            self.push(file);
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkflowFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[WorkflowFile] {
        &self.files
    }

    pub fn for_detector<'a, 'b>(
        &'a self,
        detector: &'b str,
    ) -> impl Iterator<Item = &'a WorkflowFile> + use<'a, 'b> {
        self.files.iter().filter(move |f| f.belongs_to(detector))
    }

    pub fn file_names(&self) -> Vec<String> {
        self.files.iter().map(|f| f.file_name()).collect()
    }

    /// The file of `detector` whose span contains `window`.
    ///
    /// With several candidates the tightest span wins, then the earliest
    /// start, then the path.
    pub fn find_containing(&self, detector: &str, window: &Segment) -> Option<&WorkflowFile> {
        self.for_detector(detector)
            .filter(|f| f.span.contains(window))
            .min_by(|a, b| {
                a.span
                    .duration()
                    .cmp(&b.span.duration())
                    .then(a.span.start.cmp(&b.span.start))
                    .then(a.path.cmp(&b.path))
            })
    }

    /// Smallest set of files of `detector` whose spans together cover `span`.
    ///
    /// Greedy interval cover: at each step take the candidate reaching
    /// furthest past the cursor; ties go to the earliest start, then the path.
    /// Returns `None` if some part of `span` has no file.
    pub fn minimal_cover(&self, detector: &str, span: &Segment) -> Option<Vec<&WorkflowFile>> {
        let mut candidates: Vec<&WorkflowFile> = self
            .for_detector(detector)
            .filter(|f| f.span.intersects(span))
            .collect();
        candidates.sort_by(|a, b| {
            a.span
                .start
                .cmp(&b.span.start)
                .then(a.path.cmp(&b.path))
        });

        let mut chosen = Vec::new();
        let mut cursor = span.start;
        while cursor < span.end {
            let mut best: Option<&WorkflowFile> = None;
            for file in candidates.iter().copied() {
                if file.span.start > cursor {
                    break;
                }
                if file.span.end <= cursor {
                    continue;
                }
                match best {
                    Some(b) if file.span.end <= b.span.end => {}
                    _ => best = Some(file),
                }
            }
            let next = best?;
            cursor = next.span.end;
            chosen.push(next);
        }
        Some(chosen)
    }

    /// True if the files of `detector` cover every second of `span`.
    pub fn covers(&self, detector: &str, span: &Segment) -> bool {
        self.minimal_cover(detector, span).is_some()
    }
}

impl FromIterator<WorkflowFile> for FileList {
    fn from_iter<I: IntoIterator<Item = WorkflowFile>>(iter: I) -> Self {
        let mut list = FileList::new();
        for file in iter {
            list.push(file);
        }
        list
    }
}

impl<'a> IntoIterator for &'a FileList {
    type Item = &'a WorkflowFile;
    type IntoIter = std::slice::Iter<'a, WorkflowFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
