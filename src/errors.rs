// src/errors.rs

//! Crate-wide error type.
//!
//! Fatal conditions are variants of [`GwflowError`]. Non-fatal conditions
//! (linking mismatches, coverage gaps) are never errors; they are logged and
//! recorded on the stage plan instead.

use thiserror::Error;

use crate::segments::Segment;

#[derive(Error, Debug)]
pub enum GwflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown {stage} method '{method}' (expected one of: {expected})")]
    UnknownMethod {
        stage: String,
        method: String,
        expected: String,
    },

    #[error("Unknown executable '{0}': no job template is registered for it")]
    UnknownExecutable(String),

    #[error("Missing option '{option}' in section [{section}] (tags: {tags:?})")]
    MissingOption {
        section: String,
        option: String,
        tags: Vec<String>,
    },

    #[error("Invalid value for option '{option}' in section [{section}]: {reason}")]
    InvalidOption {
        section: String,
        option: String,
        reason: String,
    },

    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: String },

    #[error("Job windows for detector {detector} overlap at {at}; overlap is not allowed")]
    OverlapRejected { detector: String, at: Segment },

    #[error("No job for detector {detector} has data coverage ({gaps} window(s) dropped)")]
    NoCoverage { detector: String, gaps: usize },

    #[error("Stage '{0}' produced no jobs for any detector")]
    EmptyResult(String),

    #[error("Cycle detected in workflow graph involving job '{0}'")]
    WorkflowCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GwflowError {
    /// True for the errors that describe a bad configuration rather than a
    /// problem with the inputs or the produced graph.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            GwflowError::ConfigError(_)
                | GwflowError::UnknownMethod { .. }
                | GwflowError::UnknownExecutable(_)
                | GwflowError::MissingOption { .. }
                | GwflowError::InvalidOption { .. }
                | GwflowError::InvalidTag { .. }
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, GwflowError>;
