// src/config/resolve.rs

//! Tag-aware option lookup.
//!
//! An option is searched for in tag-qualified variants of a section before
//! the plain section. For `resolve("inspiral", "pad-data", ["BNS", "INJ"])`
//! the candidates are, in order:
//!
//! 1. `[inspiral-bns-inj]`
//! 2. `[inspiral-bns]`
//! 3. `[inspiral-inj]`
//! 4. `[inspiral]`
//!
//! Larger tag combinations win; between combinations of the same size the
//! one whose tags come first in the caller's list wins. The first candidate
//! defining the option is used.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{OptionValue, WorkflowConfig};
use crate::errors::{GwflowError, Result};

/// Upper bound on tags per lookup; keeps the candidate list small.
pub const MAX_TAGS: usize = 8;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("tag regex is valid")
});

/// Reject tags that cannot be turned into section names or file names.
pub fn validate_tags(tags: &[String]) -> Result<()> {
    if tags.len() > MAX_TAGS {
        return Err(GwflowError::InvalidTag {
            tag: tags.join(","),
            reason: format!("at most {MAX_TAGS} tags are supported, got {}", tags.len()),
        });
    }

    let mut seen = HashSet::new();
    for tag in tags {
        if !TAG_RE.is_match(tag) {
            return Err(GwflowError::InvalidTag {
                tag: tag.clone(),
                reason: "tags must be non-empty and contain only letters, digits or '_'"
                    .to_string(),
            });
        }
        if !seen.insert(tag.to_lowercase()) {
            return Err(GwflowError::InvalidTag {
                tag: tag.clone(),
                reason: "duplicate tag".to_string(),
            });
        }
    }
    Ok(())
}

/// Candidate section names for `section` and `tags`, most specific first.
pub fn candidate_sections(section: &str, tags: &[String]) -> Vec<String> {
    let section = section.to_lowercase();
    let lowered: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();

    let mut out = Vec::new();
    for size in (1..=lowered.len()).rev() {
        let mut combo = Vec::with_capacity(size);
        push_combinations(&lowered, size, 0, &mut combo, &mut |picked: &[&str]| {
            out.push(format!("{}-{}", section, picked.join("-")));
        });
    }
    out.push(section);
    out
}

/// Visit every `size`-element combination of `items[start..]` in
/// lexicographic index order.
fn push_combinations<'a>(
    items: &'a [String],
    size: usize,
    start: usize,
    combo: &mut Vec<&'a str>,
    visit: &mut dyn FnMut(&[&'a str]),
) {
    if combo.len() == size {
        visit(combo);
        return;
    }
    for i in start..items.len() {
        if items.len() - i < size - combo.len() {
            break;
        }
        combo.push(&items[i]);
        push_combinations(items, size, i + 1, combo, visit);
        combo.pop();
    }
}

impl WorkflowConfig {
    /// Resolve `option` for `section` honouring `tags`.
    ///
    /// Returns `Ok(None)` when no candidate section defines the option and an
    /// error when the tags themselves are malformed.
    pub fn resolve(
        &self,
        section: &str,
        option: &str,
        tags: &[String],
    ) -> Result<Option<&OptionValue>> {
        validate_tags(tags)?;
        Ok(candidate_sections(section, tags)
            .iter()
            .find_map(|candidate| self.get_raw(candidate, option)))
    }

    pub fn has_option_tags(&self, section: &str, option: &str, tags: &[String]) -> Result<bool> {
        Ok(self.resolve(section, option, tags)?.is_some())
    }

    /// Required string option.
    pub fn get_str(&self, section: &str, option: &str, tags: &[String]) -> Result<String> {
        self.resolve(section, option, tags)?
            .map(|v| v.to_string())
            .ok_or_else(|| missing(section, option, tags))
    }

    /// Required integer option.
    pub fn get_i64(&self, section: &str, option: &str, tags: &[String]) -> Result<i64> {
        let value = self
            .resolve(section, option, tags)?
            .ok_or_else(|| missing(section, option, tags))?;
        value.as_i64().ok_or_else(|| GwflowError::InvalidOption {
            section: section.to_string(),
            option: option.to_string(),
            reason: format!("expected whole seconds, got '{value}'"),
        })
    }

    pub fn get_i64_or(
        &self,
        section: &str,
        option: &str,
        tags: &[String],
        default: i64,
    ) -> Result<i64> {
        if self.has_option_tags(section, option, tags)? {
            self.get_i64(section, option, tags)
        } else {
            Ok(default)
        }
    }

    pub fn get_bool_or(
        &self,
        section: &str,
        option: &str,
        tags: &[String],
        default: bool,
    ) -> Result<bool> {
        match self.resolve(section, option, tags)? {
            None => Ok(default),
            Some(value) => value.as_bool().ok_or_else(|| GwflowError::InvalidOption {
                section: section.to_string(),
                option: option.to_string(),
                reason: format!("expected a boolean, got '{value}'"),
            }),
        }
    }
}

fn missing(section: &str, option: &str, tags: &[String]) -> GwflowError {
    GwflowError::MissingOption {
        section: section.to_string(),
        option: option.to_string(),
        tags: tags.to_vec(),
    }
}
