#![allow(dead_code)]

use std::collections::BTreeMap;

use gwflow::config::{OptionValue, WorkflowConfig};
use gwflow::files::{FileList, FileRole, WorkflowFile};
use gwflow::segments::{Segment, SegmentsByDetector};

pub const TMPLTBANK_EXE: &str = "/opt/bin/lalapps_tmpltbank";
pub const INSPIRAL_EXE: &str = "/opt/bin/pycbc_inspiral";
pub const METHOD: &str = "WORKFLOW_INDEPENDENT_IFOS";

/// Builder for `WorkflowConfig` to simplify test setup.
///
/// `standard()` gives both stages 2000 s windows with 256 s of padding on
/// each side.
pub struct WorkflowConfigBuilder {
    sections: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl WorkflowConfigBuilder {
    pub fn new() -> Self {
        Self {
            sections: BTreeMap::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new()
            .set("workflow-tmpltbank", "tmpltbank-method", METHOD)
            .set("workflow-tmpltbank", "analysis-length", 2000)
            .set("workflow-matchedfilter", "matchedfilter-method", METHOD)
            .set("workflow-matchedfilter", "analysis-length", 2000)
            .set("executables", "tmpltbank", TMPLTBANK_EXE)
            .set("executables", "inspiral", INSPIRAL_EXE)
            .set("tmpltbank", "pad-data", 256)
            .set("inspiral", "pad-data", 256)
    }

    pub fn set(mut self, section: &str, option: &str, value: impl Into<OptionValue>) -> Self {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), value.into());
        self
    }

    pub fn unset(mut self, section: &str, option: &str) -> Self {
        if let Some(options) = self.sections.get_mut(section) {
            options.remove(option);
        }
        self
    }

    /// Make the matched-filter stage reuse the template-bank windows.
    pub fn link_matchedfilter(self) -> Self {
        self.set(
            "workflow-matchedfilter",
            "matchedfilter-link-to-tmpltbank",
            true,
        )
    }

    /// Declare the reciprocal link on the template-bank side.
    pub fn link_tmpltbank(self) -> Self {
        self.set(
            "workflow-tmpltbank",
            "tmpltbank-link-to-matchedfilter",
            true,
        )
    }

    pub fn build(self) -> WorkflowConfig {
        let mut config = WorkflowConfig::new();
        for (section, options) in self.sections {
            for (option, value) in options {
                config.set(&section, &option, value);
            }
        }
        config
    }
}

impl Default for WorkflowConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Segment map from `(detector, start, end)` triples.
pub fn segments(spans: &[(&str, i64, i64)]) -> SegmentsByDetector {
    let mut map = SegmentsByDetector::new();
    for (det, start, end) in spans {
        map.entry(det.to_string())
            .or_default()
            .push(Segment::new(*start, *end));
    }
    map
}

pub fn data_record(detector: &str, start: i64, end: i64) -> WorkflowFile {
    WorkflowFile::new(
        Some(detector.to_string()),
        Segment::new(start, end),
        format!("/data/{detector}-DATAFIND-{start}-{}.gwf", end - start),
        "DATAFIND",
        FileRole::DataLocation,
    )
}

pub fn data_records(spans: &[(&str, i64, i64)]) -> FileList {
    spans
        .iter()
        .map(|(det, start, end)| data_record(det, *start, *end))
        .collect()
}

pub fn template_bank(detector: &str, start: i64, end: i64) -> WorkflowFile {
    WorkflowFile::new(
        Some(detector.to_string()),
        Segment::new(start, end),
        format!("/banks/{detector}-TMPLTBANK-{start}-{}.xml.gz", end - start),
        "TMPLTBANK",
        FileRole::TemplateBank,
    )
}

pub fn injection_file(start: i64, end: i64) -> WorkflowFile {
    WorkflowFile::new(
        None,
        Segment::new(start, end),
        format!("/inj/HL-INJECTIONS-{start}-{}.xml", end - start),
        "INJECTIONS",
        FileRole::Injection,
    )
}

pub fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(|t| t.to_string()).collect()
}

pub fn seg(start: i64, end: i64) -> Segment {
    Segment::new(start, end)
}
