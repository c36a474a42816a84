// src/dag/mod.rs

//! Job graph assembly.
//!
//! - [`workflow`] collects stage plans into a DAG of jobs, derives the
//!   dependency edges and orders jobs for submission.

pub mod workflow;

pub use workflow::Workflow;
