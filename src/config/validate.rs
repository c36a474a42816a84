// src/config/validate.rs

use std::collections::BTreeMap;

use crate::config::model::{OptionValue, RawWorkflowConfig, WorkflowConfig};
use crate::errors::{GwflowError, Result};

/// Section mapping executable names to paths.
pub const EXECUTABLES_SECTION: &str = "executables";

impl TryFrom<RawWorkflowConfig> for WorkflowConfig {
    type Error = crate::errors::GwflowError;

    fn try_from(raw: RawWorkflowConfig) -> std::result::Result<Self, Self::Error> {
        ensure_has_sections(&raw)?;
        let sections = normalize_names(raw)?;
        validate_executables(&sections)?;
        Ok(WorkflowConfig::new_unchecked(sections))
    }
}

fn ensure_has_sections(raw: &RawWorkflowConfig) -> Result<()> {
    if raw.sections.is_empty() {
        return Err(GwflowError::ConfigError(
            "config must contain at least one [section]".to_string(),
        ));
    }
    Ok(())
}

/// Lowercase section and option names, rejecting names that collide once
/// case is ignored.
fn normalize_names(
    raw: RawWorkflowConfig,
) -> Result<BTreeMap<String, BTreeMap<String, OptionValue>>> {
    let mut sections: BTreeMap<String, BTreeMap<String, OptionValue>> = BTreeMap::new();

    for (name, options) in raw.sections {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Err(GwflowError::ConfigError(
                "section names must not be empty".to_string(),
            ));
        }
        if sections.contains_key(&key) {
            return Err(GwflowError::ConfigError(format!(
                "section [{name}] is defined more than once (names are case-insensitive)"
            )));
        }

        let mut normalized = BTreeMap::new();
        for (option, value) in options {
            let opt_key = option.trim().to_lowercase();
            if normalized.insert(opt_key, value).is_some() {
                return Err(GwflowError::ConfigError(format!(
                    "option '{option}' is defined more than once in [{name}]"
                )));
            }
        }
        sections.insert(key, normalized);
    }

    Ok(sections)
}

fn validate_executables(sections: &BTreeMap<String, BTreeMap<String, OptionValue>>) -> Result<()> {
    let Some(executables) = sections.get(EXECUTABLES_SECTION) else {
        return Ok(());
    };

    for (name, value) in executables {
        match value {
            OptionValue::Text(path) if !path.trim().is_empty() => {}
            other => {
                return Err(GwflowError::InvalidOption {
                    section: EXECUTABLES_SECTION.to_string(),
                    option: name.clone(),
                    reason: format!("expected an executable path, got '{other}'"),
                });
            }
        }
    }
    Ok(())
}
