// src/types.rs

use std::fmt;
use std::str::FromStr;

use crate::config::WorkflowConfig;
use crate::errors::Result;
use crate::files::FileRole;

/// A pipeline stage this crate knows how to plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    TemplateBank,
    MatchedFilter,
}

impl StageKind {
    /// Name used in logs, error messages and option prefixes.
    pub fn name(self) -> &'static str {
        match self {
            StageKind::TemplateBank => "tmpltbank",
            StageKind::MatchedFilter => "matchedfilter",
        }
    }

    /// Config section holding the stage-level options.
    pub fn section(self) -> String {
        format!("workflow-{}", self.name())
    }

    /// Key under `[executables]` naming the stage's executable.
    pub fn executable_key(self) -> &'static str {
        match self {
            StageKind::TemplateBank => "tmpltbank",
            StageKind::MatchedFilter => "inspiral",
        }
    }

    pub fn method_option(self) -> String {
        format!("{}-method", self.name())
    }

    /// Option asking this stage to reuse the companion stage's job windows.
    pub fn link_option(self) -> String {
        format!("{}-link-to-{}", self.name(), self.companion().name())
    }

    /// The stage whose windows this one can be linked to.
    pub fn companion(self) -> StageKind {
        match self {
            StageKind::TemplateBank => StageKind::MatchedFilter,
            StageKind::MatchedFilter => StageKind::TemplateBank,
        }
    }

    pub fn output_role(self) -> FileRole {
        match self {
            StageKind::TemplateBank => FileRole::TemplateBank,
            StageKind::MatchedFilter => FileRole::Triggers,
        }
    }

    /// Subdirectory of the workflow output directory used by this stage.
    pub fn dir_name(self) -> &'static str {
        match self {
            StageKind::TemplateBank => "tmpltbank",
            StageKind::MatchedFilter => "inspiral",
        }
    }

    /// Whether jobs of this stage may cover overlapping windows.
    ///
    /// Matched-filter output must never double count time, so overlap is
    /// always refused there. Template banks may opt in with
    /// `tmpltbank-allow-overlap`.
    pub fn allow_overlap(self, config: &WorkflowConfig, tags: &[String]) -> Result<bool> {
        match self {
            StageKind::MatchedFilter => Ok(false),
            StageKind::TemplateBank => config.get_bool_or(
                &self.section(),
                &format!("{}-allow-overlap", self.name()),
                tags,
                false,
            ),
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strategy used to generate a stage's jobs.
///
/// Only one strategy exists today: every detector is partitioned on its own
/// and gets its own family of jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageMethod {
    WorkflowIndependentIfos,
}

impl StageMethod {
    pub const ALL: &'static [&'static str] = &["WORKFLOW_INDEPENDENT_IFOS"];
}

impl FromStr for StageMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "WORKFLOW_INDEPENDENT_IFOS" => Ok(StageMethod::WorkflowIndependentIfos),
            other => Err(format!(
                "invalid stage method: {other} (expected {})",
                StageMethod::ALL.join(", ")
            )),
        }
    }
}

impl fmt::Display for StageMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageMethod::WorkflowIndependentIfos => f.write_str("WORKFLOW_INDEPENDENT_IFOS"),
        }
    }
}
