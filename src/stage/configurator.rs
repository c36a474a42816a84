// src/stage/configurator.rs

//! Stage entry points: pick the generation strategy from the config and
//! hand over to [`build_stage_jobs`].

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::config::validate::EXECUTABLES_SECTION;
use crate::config::{WorkflowConfig, validate_tags};
use crate::errors::{GwflowError, Result};
use crate::files::{FileList, WorkflowFile};
use crate::jobs::ExecutableRegistry;
use crate::segments::SegmentsByDetector;
use crate::stage::builder::{StageRequest, build_stage_jobs};
use crate::stage::plan::StagePlan;
use crate::types::{StageKind, StageMethod};

/// Caller-provided inputs shared by every stage.
#[derive(Debug, Clone, Copy)]
pub struct StageInputs<'a> {
    pub segments: &'a SegmentsByDetector,
    pub data_locations: &'a FileList,
    /// Outputs of the template-bank stage; `None` for the bank stage itself.
    pub template_banks: Option<&'a FileList>,
    pub output_dir: &'a Path,
    pub injection_file: Option<&'a WorkflowFile>,
    pub tags: &'a [String],
}

/// Plan the template-bank stage using `tmpltbank-method` from the config.
pub fn setup_tmpltbank_stage(
    config: &WorkflowConfig,
    registry: &ExecutableRegistry,
    inputs: &StageInputs<'_>,
) -> Result<StagePlan> {
    setup_stage(config, registry, StageKind::TemplateBank, inputs)
}

/// Plan the matched-filter stage using `matchedfilter-method` from the config.
///
/// The returned plan's `outputs` hold the trigger files only; the template
/// banks passed in are parents, not outputs.
pub fn setup_matchedfilter_stage(
    config: &WorkflowConfig,
    registry: &ExecutableRegistry,
    inputs: &StageInputs<'_>,
) -> Result<StagePlan> {
    setup_stage(config, registry, StageKind::MatchedFilter, inputs)
}

fn setup_stage(
    config: &WorkflowConfig,
    registry: &ExecutableRegistry,
    stage: StageKind,
    inputs: &StageInputs<'_>,
) -> Result<StagePlan> {
    let method = config.get_str(&stage.section(), &stage.method_option(), inputs.tags)?;
    configure_stage(config, registry, stage, &method, inputs)
}

/// Plan `stage` with an explicitly declared method.
///
/// Everything that can be rejected from configuration alone is checked
/// before the output directory is created.
pub fn configure_stage(
    config: &WorkflowConfig,
    registry: &ExecutableRegistry,
    stage: StageKind,
    declared_method: &str,
    inputs: &StageInputs<'_>,
) -> Result<StagePlan> {
    info!(stage = %stage, "entering stage setup");
    validate_tags(inputs.tags)?;

    let method = StageMethod::from_str(declared_method).map_err(|_| GwflowError::UnknownMethod {
        stage: stage.to_string(),
        method: declared_method.to_string(),
        expected: StageMethod::ALL.join(", "),
    })?;

    let (link, warnings) = link_to_companion(config, stage, inputs.tags)?;

    let executable = executable_path(config, stage, inputs.tags)?;
    let companion_executable = if link {
        Some(executable_path(config, stage.companion(), inputs.tags)?)
    } else {
        None
    };

    // Fail on unknown executables before touching the filesystem.
    registry.resolve(&executable)?;
    if let Some(exe) = &companion_executable {
        registry.resolve(exe)?;
    }

    fs::create_dir_all(inputs.output_dir)?;

    let mut plan = match method {
        StageMethod::WorkflowIndependentIfos => {
            info!(stage = %stage, %method, linked = link, "adding jobs to workflow");
            let request = StageRequest {
                stage,
                executable: &executable,
                companion_executable: companion_executable.as_deref(),
                segments: inputs.segments,
                data_locations: inputs.data_locations,
                template_banks: inputs.template_banks,
                output_dir: inputs.output_dir,
                injection_file: inputs.injection_file,
                tags: inputs.tags,
                link_to_companion: link,
                allow_overlap: stage.allow_overlap(config, inputs.tags)?,
            };
            build_stage_jobs(config, registry, &request)?
        }
    };
    plan.warnings = warnings;

    info!(
        stage = %stage,
        jobs = plan.jobs.len(),
        gaps = plan.gaps.len(),
        "leaving stage setup"
    );
    Ok(plan)
}

/// Read the stage's link option and check that the companion declares the
/// reciprocal one. A one-sided declaration is only warned about.
///
/// Returns whether this stage takes its windows from the companion. When
/// both stages declare the link the template-bank stage keeps its own
/// windows and the matched-filter stage follows it.
fn link_to_companion(
    config: &WorkflowConfig,
    stage: StageKind,
    tags: &[String],
) -> Result<(bool, Vec<String>)> {
    let link = config.get_bool_or(&stage.section(), &stage.link_option(), tags, false)?;
    let mut warnings = Vec::new();

    if link {
        let companion = stage.companion();
        let reciprocal =
            config.get_bool_or(&companion.section(), &companion.link_option(), tags, false)?;
        if reciprocal && stage == StageKind::TemplateBank {
            debug!(stage = %stage, "mutually linked; template banks own the windows");
            return Ok((false, warnings));
        }
        if !reciprocal {
            let msg = format!(
                "[{}] sets {} but [{}] does not set {}; the two stages may disagree on job windows",
                stage.section(),
                stage.link_option(),
                companion.section(),
                companion.link_option()
            );
            warn!(stage = %stage, "{msg}");
            warnings.push(msg);
        }
    }

    Ok((link, warnings))
}

fn executable_path(config: &WorkflowConfig, stage: StageKind, tags: &[String]) -> Result<PathBuf> {
    let path = config.get_str(EXECUTABLES_SECTION, stage.executable_key(), tags)?;
    Ok(PathBuf::from(path))
}
