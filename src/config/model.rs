// src/config/model.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Workflow configuration as read from a TOML file.
///
/// Every top-level table is an ini-style section holding scalar options.
/// Tag-specific variants of a section append the lowercase tags:
///
/// ```toml
/// [workflow-matchedfilter]
/// matchedfilter-method = "WORKFLOW_INDEPENDENT_IFOS"
/// matchedfilter-link-to-tmpltbank = true
/// analysis-length = 2000
///
/// [workflow-matchedfilter-bnsinj]
/// analysis-length = 1024
///
/// [executables]
/// tmpltbank = "/opt/lalsuite/bin/lalapps_tmpltbank"
/// inspiral = "/opt/pycbc/bin/pycbc_inspiral"
///
/// [inspiral]
/// pad-data = 8
/// segment-start-pad = 64
/// segment-end-pad = 16
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawWorkflowConfig {
    pub sections: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            OptionValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            OptionValue::Integer(0) => Some(false),
            OptionValue::Integer(1) => Some(true),
            OptionValue::Integer(_) | OptionValue::Float(_) => None,
        }
    }

    /// Whole seconds; floats are accepted only when integral and in range.
    pub fn as_i64(&self) -> Option<i64> {
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
        const UPPER: f64 = i64::MAX as f64;
        const LOWER: f64 = i64::MIN as f64;
        match self {
            OptionValue::Integer(i) => Some(*i),
            OptionValue::Float(f) if f.fract() == 0.0 && *f >= LOWER && *f < UPPER => {
                Some(*f as i64)
            }
            OptionValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Integer(i) => write!(f, "{i}"),
            OptionValue::Float(x) => write!(f, "{x}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Integer(i)
    }
}

/// Validated configuration.
///
/// Section and option names are stored lowercase. Construct via
/// `WorkflowConfig::try_from(raw)` (see `config::validate`) or
/// [`WorkflowConfig::new`] plus [`WorkflowConfig::set`] in code.
#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    pub(crate) sections: BTreeMap<String, BTreeMap<String, OptionValue>>,
}

impl WorkflowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn new_unchecked(
        sections: BTreeMap<String, BTreeMap<String, OptionValue>>,
    ) -> Self {
        Self { sections }
    }

    /// Set an option, creating the section if needed.
    pub fn set(
        &mut self,
        section: &str,
        option: &str,
        value: impl Into<OptionValue>,
    ) -> &mut Self {
        self.sections
            .entry(section.to_lowercase())
            .or_default()
            .insert(option.to_lowercase(), value.into());
        self
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_lowercase())
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(|s| s.as_str())
    }

    /// Look up an option in exactly this section, without tag fallback.
    pub fn get_raw(&self, section: &str, option: &str) -> Option<&OptionValue> {
        self.sections
            .get(&section.to_lowercase())
            .and_then(|s| s.get(&option.to_lowercase()))
    }
}
