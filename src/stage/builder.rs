// src/stage/builder.rs

//! Turn segments into job records for one stage.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{WorkflowConfig, validate_tags};
use crate::errors::{GwflowError, Result};
use crate::files::{FileList, WorkflowFile};
use crate::jobs::{ExecutableRegistry, JobTemplate, ResolvedExecutable};
use crate::partition::{first_overlap, partition_segments};
use crate::segments::{Segment, SegmentsByDetector};
use crate::stage::plan::{CoverageGap, GapReason, StagePlan};
use crate::types::StageKind;

/// Inputs of [`build_stage_jobs`].
#[derive(Debug, Clone, Copy)]
pub struct StageRequest<'a> {
    pub stage: StageKind,
    /// Executable path or identifier of this stage.
    pub executable: &'a Path,
    /// Executable of the companion stage; required when linking.
    pub companion_executable: Option<&'a Path>,
    pub segments: &'a SegmentsByDetector,
    pub data_locations: &'a FileList,
    /// Parent files; when given, every job needs one containing its window.
    pub template_banks: Option<&'a FileList>,
    pub output_dir: &'a Path,
    pub injection_file: Option<&'a WorkflowFile>,
    pub tags: &'a [String],
    /// Reuse the companion stage's windows instead of partitioning.
    pub link_to_companion: bool,
    pub allow_overlap: bool,
}

/// Build one job per analysable window of every detector.
///
/// Detectors are processed in key order and their jobs concatenated. Fails
/// if no detector ends up with a job.
pub fn build_stage_jobs(
    config: &WorkflowConfig,
    registry: &ExecutableRegistry,
    req: &StageRequest<'_>,
) -> Result<StagePlan> {
    validate_tags(req.tags)?;

    let primary = resolve_for_stage(registry, req.executable, req.stage)?;
    let companion = if req.link_to_companion {
        let exe = req.companion_executable.ok_or_else(|| {
            GwflowError::ConfigError(format!(
                "{} stage is linked to {} but no {} executable was given",
                req.stage,
                req.stage.companion(),
                req.stage.companion()
            ))
        })?;
        Some(resolve_for_stage(registry, exe, req.stage.companion())?)
    } else {
        None
    };

    check_detectors_known(req)?;

    let mut plan = StagePlan::new(req.stage);

    for (detector, segments) in req.segments {
        if segments.is_empty() {
            info!(detector = %detector, stage = %req.stage, "no analysable segments; detector gets no jobs");
            continue;
        }

        let template = primary.create_template(config, detector, req.tags)?;
        let partition = match &companion {
            Some(link) => {
                let link_template = link.create_template(config, detector, req.tags)?;
                debug!(
                    detector = %detector,
                    companion = %link.identifier,
                    window_length = link_template.window_length,
                    "using companion stage windows"
                );
                partition_segments(
                    detector,
                    &link_template.own_partition_params(),
                    segments,
                    req.data_locations,
                )
            }
            None => partition_segments(
                detector,
                &template.partition_params(req.allow_overlap),
                segments,
                req.data_locations,
            ),
        };

        plan.dropped.extend(
            partition
                .dropped
                .iter()
                .map(|span| (detector.clone(), *span)),
        );

        if !req.allow_overlap {
            if let Some(at) = first_overlap(&partition.windows) {
                return Err(GwflowError::OverlapRejected {
                    detector: detector.clone(),
                    at,
                });
            }
        }

        if partition.windows.is_empty() {
            info!(detector = %detector, stage = %req.stage, "no viable job windows; detector gets no jobs");
            continue;
        }

        let before = plan.jobs.len();
        let gaps_before = plan.gaps.len();
        for window in &partition.windows {
            add_job(&template, *window, req, &mut plan);
        }

        let made = plan.jobs.len() - before;
        let gaps = plan.gaps.len() - gaps_before;
        if made == 0 {
            return Err(GwflowError::NoCoverage {
                detector: detector.clone(),
                gaps,
            });
        }
        info!(detector = %detector, stage = %req.stage, jobs = made, gaps, "planned detector jobs");
    }

    if plan.jobs.is_empty() {
        return Err(GwflowError::EmptyResult(req.stage.to_string()));
    }

    Ok(plan)
}

/// Create the job for `window`, or record why it could not be created.
fn add_job(template: &JobTemplate, window: Segment, req: &StageRequest<'_>, plan: &mut StagePlan) {
    let detector = template.detector.as_str();
    let required = template.required_span(&window);

    let Some(data) = req.data_locations.minimal_cover(detector, &required) else {
        record_gap(plan, detector, window, required, GapReason::MissingData);
        return;
    };
    let data: Vec<WorkflowFile> = data.into_iter().cloned().collect();

    let bank = match req.template_banks {
        Some(banks) => match banks.find_containing(detector, &window) {
            Some(bank) => Some(bank.clone()),
            None => {
                record_gap(plan, detector, window, required, GapReason::MissingTemplateBank);
                return;
            }
        },
        None => None,
    };

    let job = template.create_job(window, data, bank, req.injection_file, req.output_dir);
    debug!(
        detector = %detector,
        job = %job.id,
        window = %job.window,
        output = %job.output.file_name(),
        "created job"
    );
    plan.outputs.push(job.output.clone());
    plan.jobs.push(job);
}

fn record_gap(
    plan: &mut StagePlan,
    detector: &str,
    window: Segment,
    required: Segment,
    reason: GapReason,
) {
    warn!(
        detector = %detector,
        window = %window,
        required = %required,
        %reason,
        "coverage gap; skipping window"
    );
    plan.gaps.push(CoverageGap {
        detector: detector.to_string(),
        window,
        required,
        reason,
    });
}

fn resolve_for_stage(
    registry: &ExecutableRegistry,
    executable: &Path,
    stage: StageKind,
) -> Result<ResolvedExecutable> {
    let resolved = registry.resolve(executable)?;
    if resolved.kind.stage() != stage {
        return Err(GwflowError::ConfigError(format!(
            "executable '{}' plans {} jobs, not {} jobs",
            resolved.identifier,
            resolved.kind.stage(),
            stage
        )));
    }
    Ok(resolved)
}

/// Every detector named by data locations or template banks must have an
/// entry (possibly empty) in the segment map.
fn check_detectors_known(req: &StageRequest<'_>) -> Result<()> {
    let banks = req.template_banks.into_iter().flat_map(|b| b.iter());
    for file in req.data_locations.iter().chain(banks) {
        if let Some(det) = &file.detector {
            if !req.segments.contains_key(det) {
                return Err(GwflowError::ConfigError(format!(
                    "'{}' belongs to detector {} which has no segment list",
                    file.path.display(),
                    det
                )));
            }
        }
    }
    Ok(())
}
