//! Descriptor sources
//!
//! The compiler never inspects a program directly: a [`Scanner`] produces
//! the [`DescriptorSet`] up front. [`JsonScanner`] reads descriptor
//! documents written by an external scanning tool and keeps the
//! declarations inside the configured [`ScanScope`].

use crate::config::CompilerConfig;
use crate::descriptor::DescriptorSet;
use crate::error::GeneratorError;
use crate::naming::package_of;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Produces the declarations of one compilation
pub trait Scanner {
    /// Scan and return every declaration in scope
    fn scan(&self) -> Result<DescriptorSet, GeneratorError>;
}

/// Package include/exclude filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanScope {
    /// Namespaces to include
    pub base_packages: Vec<String>,
    /// Namespaces to skip, even below a base package
    pub exclude_packages: Vec<String>,
    /// Maximum package depth below a base package
    pub max_depth: usize,
}

impl ScanScope {
    /// Scope described by a compiler configuration
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            base_packages: config.base_packages.clone(),
            exclude_packages: config.exclude_packages.clone(),
            max_depth: config.max_scan_depth,
        }
    }

    /// Whether a declaration identity is in scope
    ///
    /// The depth of a package is the number of segments below the base
    /// package it matched; the base package itself has depth 0.
    pub fn includes(&self, identity: &str) -> bool {
        let package = package_of(identity);
        if self.exclude_packages.iter().any(|ex| within(package, ex.trim()).is_some()) {
            return false;
        }
        self.base_packages
            .iter()
            .filter_map(|base| within(package, base.trim()))
            .any(|depth| depth <= self.max_depth)
    }

    /// Keep only the declarations in scope
    pub fn apply(&self, set: DescriptorSet) -> DescriptorSet {
        let total = set.len();
        let kept = DescriptorSet::new(set.iter().filter(|d| self.includes(&d.name)).cloned());
        debug!(total, kept = kept.len(), "applied scan scope");
        kept
    }
}

/// Depth of `package` below `base`, if it is inside it
fn within(package: &str, base: &str) -> Option<usize> {
    if base.is_empty() {
        return None;
    }
    if package == base {
        return Some(0);
    }
    package
        .strip_prefix(base)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(|rest| rest.split('.').count())
}

/// Reads JSON descriptor documents
#[derive(Debug, Clone)]
pub struct JsonScanner {
    paths: Vec<PathBuf>,
    scope: ScanScope,
}

impl JsonScanner {
    /// Scanner over the given documents
    pub fn new<I, P>(paths: I, scope: ScanScope) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            scope,
        }
    }

    /// Scanner over the given documents, scoped by a configuration
    pub fn from_config<I, P>(paths: I, config: &CompilerConfig) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::new(paths, ScanScope::from_config(config))
    }

    fn read(path: &Path) -> Result<DescriptorSet, GeneratorError> {
        let json = fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        DescriptorSet::from_json(&json).map_err(|e| match e {
            GeneratorError::Parse(message) => {
                GeneratorError::Parse(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }
}

impl Scanner for JsonScanner {
    fn scan(&self) -> Result<DescriptorSet, GeneratorError> {
        let mut set = DescriptorSet::default();
        for path in &self.paths {
            let document = Self::read(path)?;
            debug!(path = %path.display(), count = document.len(), "read descriptor document");
            set.extend(document);
        }

        let set = self.scope.apply(set);
        info!(documents = self.paths.len(), declarations = set.len(), "scanned descriptors");
        Ok(set)
    }
}
