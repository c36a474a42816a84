// src/stage/mod.rs

//! Stage planning.
//!
//! - [`configurator`] reads the declared method and linking options and
//!   dispatches to the builder.
//! - [`builder`] partitions each detector's segments and creates jobs.
//! - [`plan`] holds what a stage call returns.

pub mod builder;
pub mod configurator;
pub mod plan;

pub use builder::{StageRequest, build_stage_jobs};
pub use configurator::{
    StageInputs, configure_stage, setup_matchedfilter_stage, setup_tmpltbank_stage,
};
pub use plan::{CoverageGap, GapReason, StagePlan};
