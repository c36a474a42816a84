// src/jobs/registry.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::WorkflowConfig;
use crate::errors::{GwflowError, Result};
use crate::jobs::template::{
    ExecutableKind, JobTemplate, TemplateContext, lalapps_inspiral_template,
    pycbc_inspiral_template, tmpltbank_template,
};

/// Builds a [`JobTemplate`] for one detector.
pub type TemplateFactory = fn(&TemplateContext<'_>) -> Result<JobTemplate>;

#[derive(Debug, Clone, Copy)]
struct Entry {
    kind: ExecutableKind,
    factory: TemplateFactory,
}

/// Maps executable identifiers to template factories.
///
/// Identifiers are executable file names; `/opt/bin/pycbc_inspiral` and
/// `pycbc_inspiral` resolve to the same entry. There is no fallback: an
/// unregistered identifier is an error.
#[derive(Debug, Clone, Default)]
pub struct ExecutableRegistry {
    entries: BTreeMap<String, Entry>,
}

impl ExecutableRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in executable.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in ExecutableKind::ALL {
            let factory: TemplateFactory = match kind {
                ExecutableKind::LalappsTmpltbank | ExecutableKind::PycbcGeomNonspinbank => {
                    tmpltbank_template
                }
                ExecutableKind::LalappsInspiral => lalapps_inspiral_template,
                ExecutableKind::PycbcInspiral => pycbc_inspiral_template,
            };
            registry.register(kind.identifier(), *kind, factory);
        }
        registry
    }

    pub fn register(&mut self, identifier: &str, kind: ExecutableKind, factory: TemplateFactory) {
        self.entries
            .insert(identifier.to_string(), Entry { kind, factory });
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    /// Resolve an executable path or identifier.
    pub fn resolve(&self, executable: &Path) -> Result<ResolvedExecutable> {
        let identifier = executable
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let entry = self
            .entries
            .get(&identifier)
            .ok_or_else(|| GwflowError::UnknownExecutable(identifier.clone()))?;

        debug!(executable = %identifier, kind = ?entry.kind, "resolved executable");
        Ok(ResolvedExecutable {
            identifier,
            path: executable.to_path_buf(),
            kind: entry.kind,
            factory: entry.factory,
        })
    }
}

/// An executable known to the registry.
#[derive(Debug, Clone)]
pub struct ResolvedExecutable {
    pub identifier: String,
    pub path: PathBuf,
    pub kind: ExecutableKind,
    factory: TemplateFactory,
}

impl ResolvedExecutable {
    pub fn create_template(
        &self,
        config: &WorkflowConfig,
        detector: &str,
        tags: &[String],
    ) -> Result<JobTemplate> {
        let ctx = TemplateContext {
            config,
            kind: self.kind,
            executable: &self.path,
            detector,
            tags,
        };
        (self.factory)(&ctx)
    }
}
