// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::inputs::{InputManifest, RawInputManifest};
use crate::config::model::{RawWorkflowConfig, WorkflowConfig};
use crate::errors::Result;

/// Load a workflow configuration file and return the raw sections.
///
/// This only performs TOML deserialization; use [`load_and_validate`] to get
/// a [`WorkflowConfig`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWorkflowConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawWorkflowConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a workflow configuration file and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WorkflowConfig> {
    let raw_config = load_from_path(&path)?;
    let config = WorkflowConfig::try_from(raw_config)?;
    Ok(config)
}

/// Load the input manifest (segments, data locations, injection file).
///
/// Relative `data_cache` paths are resolved against the manifest's directory.
pub fn load_inputs(path: impl AsRef<Path>) -> Result<InputManifest> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let raw: RawInputManifest = toml::from_str(&contents)?;

    let base = manifest_dir(path);
    let mut caches = Vec::with_capacity(raw.data_cache.len());
    for cache in &raw.data_cache {
        let cache_path = if cache.is_absolute() {
            cache.clone()
        } else {
            base.join(cache)
        };
        let text = fs::read_to_string(&cache_path)?;
        caches.push((cache_path, text));
    }

    InputManifest::from_raw(raw, &caches)
}

fn manifest_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
