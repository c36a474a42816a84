// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod datafind;
pub mod errors;
pub mod files;
pub mod jobs;
pub mod logging;
pub mod partition;
pub mod segments;
pub mod stage;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{InputManifest, WorkflowConfig, load_and_validate, load_inputs};
use crate::dag::Workflow;
use crate::files::FileList;
use crate::jobs::ExecutableRegistry;
use crate::stage::{CoverageGap, StageInputs, setup_matchedfilter_stage, setup_tmpltbank_stage};
use crate::types::StageKind;

/// Both stages planned and assembled into one job graph.
#[derive(Debug, Clone)]
pub struct PlannedWorkflow {
    pub workflow: Workflow,
    pub template_banks: FileList,
    pub triggers: FileList,
    pub gaps: Vec<CoverageGap>,
    pub warnings: Vec<String>,
}

/// Plan the template-bank stage, then the matched-filter stage on top of
/// its banks, and collect both into a [`Workflow`].
///
/// Each stage writes into its own subdirectory of `output_dir`.
pub fn plan_workflow(
    config: &WorkflowConfig,
    registry: &ExecutableRegistry,
    inputs: &InputManifest,
    output_dir: &Path,
    tags: &[String],
) -> crate::errors::Result<PlannedWorkflow> {
    let mut workflow = Workflow::new();

    let bank_dir = output_dir.join(StageKind::TemplateBank.dir_name());
    let bank_plan = setup_tmpltbank_stage(
        config,
        registry,
        &StageInputs {
            segments: &inputs.segments,
            data_locations: &inputs.data_locations,
            template_banks: None,
            output_dir: &bank_dir,
            injection_file: None,
            tags,
        },
    )?;
    let mut gaps = bank_plan.gaps.clone();
    let mut warnings = bank_plan.warnings.clone();
    let template_banks = workflow.add_stage(bank_plan)?;

    let inspiral_dir = output_dir.join(StageKind::MatchedFilter.dir_name());
    let inspiral_plan = setup_matchedfilter_stage(
        config,
        registry,
        &StageInputs {
            segments: &inputs.segments,
            data_locations: &inputs.data_locations,
            template_banks: Some(&template_banks),
            output_dir: &inspiral_dir,
            injection_file: inputs.injection.as_ref(),
            tags,
        },
    )?;
    gaps.extend(inspiral_plan.gaps.iter().cloned());
    warnings.extend(inspiral_plan.warnings.iter().cloned());
    let triggers = workflow.add_stage(inspiral_plan)?;

    Ok(PlannedWorkflow {
        workflow,
        template_banks,
        triggers,
        gaps,
        warnings,
    })
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config + input manifest loading
/// - template-bank and matched-filter stage planning
/// - summary output and plan file writing
pub fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading workflow config {:?}", args.config))?;
    let inputs = load_inputs(&args.inputs)
        .with_context(|| format!("loading input manifest {:?}", args.inputs))?;

    if args.dry_run {
        print_dry_run(&cfg, &inputs, &args.tags);
        return Ok(());
    }

    let output_dir = match &args.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(
            cfg.resolve("workflow", "output-dir", &args.tags)?
                .map(|v| v.to_string())
                .unwrap_or_else(|| "output".to_string()),
        ),
    };

    let registry = ExecutableRegistry::with_defaults();
    let planned = plan_workflow(&cfg, &registry, &inputs, &output_dir, &args.tags)?;

    print_summary(&planned);

    let plan_path = args
        .plan
        .map(PathBuf::from)
        .unwrap_or_else(|| output_dir.join("workflow-plan.toml"));
    let text = planned.workflow.to_toml()?;
    fs::write(&plan_path, text)
        .with_context(|| format!("writing workflow plan to {:?}", plan_path))?;
    info!(path = %plan_path.display(), jobs = planned.workflow.len(), "wrote workflow plan");

    Ok(())
}

fn print_summary(planned: &PlannedWorkflow) {
    println!("gwflow plan");
    println!("  fingerprint = {}", planned.workflow.fingerprint());
    println!("  jobs = {}", planned.workflow.len());
    println!("  template banks = {}", planned.template_banks.len());
    println!("  trigger files = {}", planned.triggers.len());
    if !planned.gaps.is_empty() {
        println!("  coverage gaps = {}", planned.gaps.len());
        for gap in &planned.gaps {
            println!("    - {} {}: {}", gap.detector, gap.window, gap.reason);
        }
    }
    for warning in &planned.warnings {
        println!("  warning: {warning}");
    }
}

/// Dry-run output: config sections, detectors and their segments.
fn print_dry_run(cfg: &WorkflowConfig, inputs: &InputManifest, tags: &[String]) {
    println!("gwflow dry-run");
    if !tags.is_empty() {
        println!("  tags = {:?}", tags);
    }
    println!();

    println!("sections:");
    for name in cfg.section_names() {
        println!("  - [{name}]");
    }
    println!();

    println!("detectors ({}):", inputs.segments.len());
    for (detector, segments) in &inputs.segments {
        let live: i64 = segments.iter().map(|s| s.duration()).sum();
        let data = inputs.data_locations.for_detector(detector).count();
        println!("  - {detector}");
        println!("      segments: {} ({live}s)", segments.len());
        println!("      data locations: {data}");
    }
    if let Some(inj) = &inputs.injection {
        println!("injection: {}", inj.path.display());
    }

    debug!("dry-run complete (no planning)");
}
