// src/jobs/template.rs

//! Per-(executable, detector) job templates.

use std::path::{Path, PathBuf};

use crate::config::WorkflowConfig;
use crate::errors::{GwflowError, Result};
use crate::files::WorkflowFile;
use crate::jobs::record::{JobId, JobRecord};
use crate::partition::PartitionParams;
use crate::segments::{Detector, GpsSeconds, Segment};
use crate::types::StageKind;

/// The executables a template can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutableKind {
    LalappsTmpltbank,
    PycbcGeomNonspinbank,
    LalappsInspiral,
    PycbcInspiral,
}

impl ExecutableKind {
    pub const ALL: &'static [ExecutableKind] = &[
        ExecutableKind::LalappsTmpltbank,
        ExecutableKind::PycbcGeomNonspinbank,
        ExecutableKind::LalappsInspiral,
        ExecutableKind::PycbcInspiral,
    ];

    /// Identifier used in `[executables]` paths (the file name).
    pub fn identifier(self) -> &'static str {
        match self {
            ExecutableKind::LalappsTmpltbank => "lalapps_tmpltbank",
            ExecutableKind::PycbcGeomNonspinbank => "pycbc_geom_nonspinbank",
            ExecutableKind::LalappsInspiral => "lalapps_inspiral",
            ExecutableKind::PycbcInspiral => "pycbc_inspiral",
        }
    }

    pub fn stage(self) -> StageKind {
        match self {
            ExecutableKind::LalappsTmpltbank | ExecutableKind::PycbcGeomNonspinbank => {
                StageKind::TemplateBank
            }
            ExecutableKind::LalappsInspiral | ExecutableKind::PycbcInspiral => {
                StageKind::MatchedFilter
            }
        }
    }

    /// Description used in output file names.
    pub fn description(self) -> &'static str {
        match self.stage() {
            StageKind::TemplateBank => "TMPLTBANK",
            StageKind::MatchedFilter => "INSPIRAL",
        }
    }

    pub fn output_extension(self) -> &'static str {
        match self {
            ExecutableKind::PycbcGeomNonspinbank => "xml",
            _ => "xml.gz",
        }
    }
}

/// Immutable description of how one executable analyses one detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTemplate {
    pub kind: ExecutableKind,
    pub executable: PathBuf,
    pub detector: Detector,
    pub tags: Vec<String>,
    pub window_length: GpsSeconds,
    pub min_window: GpsSeconds,
    pub start_margin: GpsSeconds,
    pub end_margin: GpsSeconds,
    /// Whether this executable's own stage lets windows overlap.
    pub allow_overlap: bool,
}

impl JobTemplate {
    pub fn partition_params(&self, allow_overlap: bool) -> PartitionParams {
        PartitionParams {
            window_length: self.window_length,
            min_window: self.min_window,
            start_margin: self.start_margin,
            end_margin: self.end_margin,
            allow_overlap,
        }
    }

    /// Parameters this template's stage partitions with on its own.
    pub fn own_partition_params(&self) -> PartitionParams {
        self.partition_params(self.allow_overlap)
    }

    pub fn required_span(&self, window: &Segment) -> Segment {
        self.own_partition_params().required_span(window)
    }

    /// Instantiate the job analysing `window`.
    pub fn create_job(
        &self,
        window: Segment,
        data: Vec<WorkflowFile>,
        template_bank: Option<WorkflowFile>,
        injection: Option<&WorkflowFile>,
        output_dir: &Path,
    ) -> JobRecord {
        let data_span = self.required_span(&window);
        let output = WorkflowFile::output(
            output_dir,
            &self.detector,
            self.kind.description(),
            &self.tags,
            window,
            self.kind.output_extension(),
            self.kind.stage().output_role(),
        );

        let mut inputs = data;
        let mut parents = Vec::new();
        if let Some(bank) = template_bank {
            inputs.push(bank.clone());
            parents.push(bank);
        }
        if let Some(inj) = injection {
            inputs.push(inj.clone());
        }

        JobRecord {
            id: JobId::derive(self.kind.identifier(), &self.detector, &self.tags, &window),
            executable: self.kind.identifier().to_string(),
            executable_path: self.executable.clone(),
            detector: self.detector.clone(),
            window,
            data_span,
            inputs,
            parents,
            output,
        }
    }
}

/// What a factory needs to build a template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub config: &'a WorkflowConfig,
    pub kind: ExecutableKind,
    pub executable: &'a Path,
    pub detector: &'a str,
    pub tags: &'a [String],
}

impl TemplateContext<'_> {
    fn stage_section(&self) -> String {
        self.kind.stage().section()
    }

    fn exe_section(&self) -> &'static str {
        self.kind.stage().executable_key()
    }

    fn analysis_length(&self) -> Result<GpsSeconds> {
        self.config
            .get_i64(&self.stage_section(), "analysis-length", self.tags)
    }

    fn exe_option(&self, option: &str) -> Result<GpsSeconds> {
        self.config.get_i64(self.exe_section(), option, self.tags)
    }

    fn exe_option_or(&self, option: &str, default: GpsSeconds) -> Result<GpsSeconds> {
        self.config
            .get_i64_or(self.exe_section(), option, self.tags, default)
    }

    /// Overflow in option arithmetic is reported against `option`.
    fn checked(&self, option: &str, value: Option<GpsSeconds>) -> Result<GpsSeconds> {
        value.ok_or_else(|| GwflowError::InvalidOption {
            section: self.exe_section().to_string(),
            option: option.to_string(),
            reason: "value out of range".to_string(),
        })
    }

    /// Assemble and sanity-check a template.
    fn finish(
        &self,
        window_length: GpsSeconds,
        start_margin: GpsSeconds,
        end_margin: GpsSeconds,
    ) -> Result<JobTemplate> {
        let section = self.stage_section();
        if window_length <= 0 {
            return Err(GwflowError::InvalidOption {
                section,
                option: "analysis-length".to_string(),
                reason: format!(
                    "{} would analyse a window of {window_length}s",
                    self.kind.identifier()
                ),
            });
        }
        if start_margin < 0 || end_margin < 0 {
            return Err(GwflowError::InvalidOption {
                section: self.exe_section().to_string(),
                option: "pad-data".to_string(),
                reason: "padding must not be negative".to_string(),
            });
        }

        let min_window =
            self.config
                .get_i64_or(&section, "min-analysis-length", self.tags, window_length)?;
        if min_window <= 0 || min_window > window_length {
            return Err(GwflowError::InvalidOption {
                section,
                option: "min-analysis-length".to_string(),
                reason: format!("must be in 1..={window_length}, got {min_window}"),
            });
        }

        Ok(JobTemplate {
            kind: self.kind,
            executable: self.executable.to_path_buf(),
            detector: self.detector.to_string(),
            tags: self.tags.to_vec(),
            window_length,
            min_window,
            start_margin,
            end_margin,
            allow_overlap: self.kind.stage().allow_overlap(self.config, self.tags)?,
        })
    }
}

/// Template banks: the whole analysis length is valid, padded on both sides.
pub fn tmpltbank_template(ctx: &TemplateContext<'_>) -> Result<JobTemplate> {
    let analysis_length = ctx.analysis_length()?;
    let pad = ctx.exe_option_or("pad-data", 0)?;
    ctx.finish(analysis_length, pad, pad)
}

/// `lalapps_inspiral` discards a quarter segment at each end of its data.
pub fn lalapps_inspiral_template(ctx: &TemplateContext<'_>) -> Result<JobTemplate> {
    let analysis_length = ctx.analysis_length()?;
    let pad = ctx.exe_option_or("pad-data", 0)?;
    let segment_length = ctx.exe_option("segment-length")?;
    let trim = segment_length / 4;
    let window = ctx.checked("segment-length", analysis_length.checked_sub(2 * trim))?;
    let margin = ctx.checked("pad-data", pad.checked_add(trim))?;
    ctx.finish(window, margin, margin)
}

/// `pycbc_inspiral` discards explicit start and end pads.
pub fn pycbc_inspiral_template(ctx: &TemplateContext<'_>) -> Result<JobTemplate> {
    let analysis_length = ctx.analysis_length()?;
    let pad = ctx.exe_option_or("pad-data", 0)?;
    let start_pad = ctx.exe_option_or("segment-start-pad", 0)?;
    let end_pad = ctx.exe_option_or("segment-end-pad", 0)?;
    let window = ctx.checked(
        "segment-start-pad",
        analysis_length
            .checked_sub(start_pad)
            .and_then(|len| len.checked_sub(end_pad)),
    )?;
    let start_margin = ctx.checked("pad-data", pad.checked_add(start_pad))?;
    let end_margin = ctx.checked("pad-data", pad.checked_add(end_pad))?;
    ctx.finish(window, start_margin, end_margin)
}
