//! Configuration file handling
//!
//! A TOML file carries the compiler settings plus the descriptor documents
//! to read. Command-line flags override whatever the file says.

use graphql_autogen::{CompilerConfig, GeneratorError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File read when no `--config` is given, if it exists
pub const DEFAULT_CONFIG_FILE: &str = "graphql-autogen.toml";

/// Errors of the command-line front end
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Compilation or configuration failure from the library
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// Failed to read or write a file
    #[error("failed to access {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Malformed configuration file
    #[error("invalid configuration file {path}: {source}")]
    Toml {
        /// Configuration file
        path: PathBuf,
        /// Parser error
        source: toml::de::Error,
    },

    /// Failed to serialize data-loader metadata
    #[error("failed to serialize data-loader metadata: {0}")]
    Json(#[from] serde_json::Error),

    /// Nothing to compile
    #[error("no descriptor documents given (pass them as arguments or set `descriptors` in the config file)")]
    NoDescriptors,
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Compiler settings
    #[serde(flatten)]
    pub compiler: CompilerConfig,
    /// Descriptor documents to read
    pub descriptors: Vec<PathBuf>,
    /// Where data-loader metadata is written
    pub data_loader_output: Option<PathBuf>,
}

impl ConfigFile {
    /// Parse TOML text; `path` is only used in error messages
    pub fn parse(text: &str, path: &Path) -> Result<Self, CliError> {
        toml::from_str(text).map_err(|source| CliError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a configuration file
    pub fn read(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut file = Self::parse(&text, path)?;

        // Relative descriptor paths are relative to the file
        if let Some(dir) = path.parent() {
            for descriptor in &mut file.descriptors {
                if descriptor.is_relative() {
                    *descriptor = dir.join(&*descriptor);
                }
            }
        }
        Ok(file)
    }

    /// Read the explicit file, or the default file when present
    pub fn load(explicit: Option<&Path>) -> Result<Self, CliError> {
        match explicit {
            Some(path) => Self::read(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                tracing::debug!(path = DEFAULT_CONFIG_FILE, "using default configuration file");
                Self::read(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }
}
