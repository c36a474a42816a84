#![allow(dead_code)]

use std::path::Path;

use gwflow::config::WorkflowConfig;
use gwflow::errors::Result;
use gwflow::files::{FileList, WorkflowFile};
use gwflow::jobs::ExecutableRegistry;
use gwflow::segments::SegmentsByDetector;
use gwflow::stage::{StageInputs, StagePlan, setup_matchedfilter_stage, setup_tmpltbank_stage};

pub fn plan_banks(
    config: &WorkflowConfig,
    segments: &SegmentsByDetector,
    data: &FileList,
    output_dir: &Path,
    tags: &[String],
) -> Result<StagePlan> {
    gwflow_test_utils::init_tracing();
    let registry = ExecutableRegistry::with_defaults();
    setup_tmpltbank_stage(
        config,
        &registry,
        &StageInputs {
            segments,
            data_locations: data,
            template_banks: None,
            output_dir,
            injection_file: None,
            tags,
        },
    )
}

pub fn plan_inspiral(
    config: &WorkflowConfig,
    segments: &SegmentsByDetector,
    data: &FileList,
    banks: &FileList,
    injection: Option<&WorkflowFile>,
    output_dir: &Path,
    tags: &[String],
) -> Result<StagePlan> {
    gwflow_test_utils::init_tracing();
    let registry = ExecutableRegistry::with_defaults();
    setup_matchedfilter_stage(
        config,
        &registry,
        &StageInputs {
            segments,
            data_locations: data,
            template_banks: Some(banks),
            output_dir,
            injection_file: injection,
            tags,
        },
    )
}
