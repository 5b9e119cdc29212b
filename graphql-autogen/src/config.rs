//! Compiler configuration
//!
//! Plain configuration values handed to the compiler. Where they come from
//! (file, flags, environment) is the caller's business.

use crate::error::GeneratorError;
use crate::naming::NamingStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default output file name
pub const DEFAULT_OUTPUT_FILE: &str = "schema.graphqls";

/// Default maximum package depth below a base package
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 10;

/// Configuration for one compilation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Namespaces to include
    pub base_packages: Vec<String>,
    /// Namespaces to skip, even below a base package
    pub exclude_packages: Vec<String>,
    /// Where the SDL is written
    pub output_file: PathBuf,
    /// Casing for auto-named types
    pub naming_strategy: NamingStrategy,
    /// Emit input-marked types that no operation references
    pub generate_inputs: bool,
    /// Include attributes and accessors declared on superclasses
    pub include_inherited_fields: bool,
    /// Maximum package depth below a base package
    pub max_scan_depth: usize,
    /// Treat recovered issues as a failed run
    pub fail_on_error: bool,
    /// Apply pagination markers
    pub generate_pagination: bool,
    /// Produce data-loader specs
    pub generate_data_loaders: bool,
    /// Look up documentation comments when no description is given
    pub include_docs: bool,
    /// Extra custom scalar mappings: type identity -> scalar name
    pub type_mappings: BTreeMap<String, String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            base_packages: Vec::new(),
            exclude_packages: Vec::new(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            naming_strategy: NamingStrategy::default(),
            generate_inputs: true,
            include_inherited_fields: true,
            max_scan_depth: DEFAULT_MAX_SCAN_DEPTH,
            fail_on_error: false,
            generate_pagination: true,
            generate_data_loaders: true,
            include_docs: true,
            type_mappings: BTreeMap::new(),
        }
    }
}

impl CompilerConfig {
    /// Default configuration scanning the given base packages
    pub fn for_packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_packages: packages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Reject configurations that cannot produce a schema
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.base_packages.is_empty() {
            return Err(GeneratorError::Configuration(
                "at least one base package is required".to_string(),
            ));
        }

        if let Some(blank) = self
            .base_packages
            .iter()
            .chain(&self.exclude_packages)
            .find(|p| p.trim().is_empty())
        {
            return Err(GeneratorError::Configuration(format!(
                "package names must not be blank (got {:?})",
                blank
            )));
        }

        if self.max_scan_depth == 0 {
            return Err(GeneratorError::Configuration(
                "max scan depth must be at least 1".to_string(),
            ));
        }

        for (identity, scalar) in &self.type_mappings {
            if identity.trim().is_empty() || scalar.trim().is_empty() {
                return Err(GeneratorError::Configuration(format!(
                    "type mapping {:?} -> {:?} must name both a type and a scalar",
                    identity, scalar
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.output_file, PathBuf::from("schema.graphqls"));
        assert_eq!(config.naming_strategy, NamingStrategy::PascalCase);
        assert_eq!(config.max_scan_depth, 10);
        assert!(config.generate_inputs);
        assert!(config.include_inherited_fields);
        assert!(!config.fail_on_error);
    }

    #[test]
    fn test_empty_base_packages_rejected() {
        let err = CompilerConfig::default().validate().unwrap_err();
        assert!(matches!(err, GeneratorError::Configuration(_)));
    }

    #[test]
    fn test_blank_values_rejected() {
        let mut config = CompilerConfig::for_packages(["com.example", " "]);
        assert!(config.validate().is_err());

        config.base_packages = vec!["com.example".into()];
        config.type_mappings.insert("java.time.Instant".into(), "".into());
        assert!(config.validate().is_err());

        config.type_mappings.clear();
        config.max_scan_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_valid_config() {
        assert!(CompilerConfig::for_packages(["com.example"]).validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{"base_packages": ["com.example"], "naming_strategy": "SNAKE_CASE"}"#;
        let config: CompilerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.naming_strategy, NamingStrategy::SnakeCase);
        assert!(config.generate_pagination);

        let bad = r#"{"naming_strategy": "KEBAB_CASE"}"#;
        assert!(serde_json::from_str::<CompilerConfig>(bad).is_err());
    }
}
