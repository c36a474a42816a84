// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed, ini-like option store (`model.rs`).
//! - Resolve options with tag-qualified section fallback (`resolve.rs`).
//! - Load config and input manifests from disk (`loader.rs`, `inputs.rs`).
//! - Validate basic invariants (`validate.rs`).

pub mod inputs;
pub mod loader;
pub mod model;
pub mod resolve;
pub mod validate;

pub use inputs::{InputManifest, RawInputManifest};
pub use loader::{load_and_validate, load_from_path, load_inputs};
pub use model::{OptionValue, RawWorkflowConfig, WorkflowConfig};
pub use resolve::{candidate_sections, validate_tags};
