// src/jobs/mod.rs

//! Job templates, the executable registry and job records.
//!
//! - [`template`] turns config options into per-detector [`JobTemplate`]s.
//! - [`registry`] maps executable names to template factories.
//! - [`record`] holds the concrete [`JobRecord`]s a stage produces.

pub mod record;
pub mod registry;
pub mod template;

pub use record::{JobId, JobRecord};
pub use registry::{ExecutableRegistry, ResolvedExecutable, TemplateFactory};
pub use template::{ExecutableKind, JobTemplate, TemplateContext};
