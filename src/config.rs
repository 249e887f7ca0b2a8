//! Configuration loading for gutterpress.
//!
//! Configuration lives in a TOML file (`.gutterpress.toml` or
//! `gutterpress.toml`), discovered from the working directory upward. The
//! `[global]` section controls file selection for the CLI; the
//! `[annotator]` section overrides the class tokens used for selection
//! and injected markup.

use crate::annotator::AnnotatorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration file names searched during discovery, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &[".gutterpress.toml", "gutterpress.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: Box<toml::de::Error>,
    },
    #[error("Config file already exists: {path}")]
    FileExists { path: String },
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Global configuration options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Files to include (glob patterns); empty means every HTML file found
    #[serde(default)]
    pub include: Vec<String>,

    /// Files to exclude (glob patterns)
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Respect .gitignore files when scanning directories
    #[serde(default = "default_respect_gitignore", alias = "respect_gitignore")]
    pub respect_gitignore: bool,
}

fn default_respect_gitignore() -> bool {
    true
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

/// Full configuration: file selection plus annotator class tokens.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,

    #[serde(default)]
    pub annotator: AnnotatorConfig,
}

impl Config {
    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source: Box::new(source),
        })
    }
}

/// Walk from `start_dir` to the filesystem root looking for a config file.
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load configuration with discovery.
///
/// `explicit_path` short-circuits discovery; `isolated` skips all config
/// files and returns built-in defaults. Returns the configuration and the
/// path it was loaded from, if any.
pub fn load_config(explicit_path: Option<&str>, isolated: bool) -> Result<(Config, Option<PathBuf>), ConfigError> {
    if isolated {
        return Ok((Config::default(), None));
    }

    if let Some(path) = explicit_path {
        let path = PathBuf::from(path);
        let config = Config::load_from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let start = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match discover_config(&start) {
        Some(path) => {
            log::debug!("loaded configuration from {}", path.display());
            let config = Config::load_from_file(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((Config::default(), None)),
    }
}

/// Create a default configuration file at the specified path.
pub fn create_default_config(path: &str) -> Result<(), ConfigError> {
    if Path::new(path).exists() {
        return Err(ConfigError::FileExists { path: path.to_string() });
    }

    fs::write(path, default_config_content()).map_err(|source| ConfigError::Write {
        path: path.to_string(),
        source,
    })
}

/// Default configuration file content, with every option commented out.
pub fn default_config_content() -> &'static str {
    r#"# gutterpress configuration file

# Global configuration options
[global]
# List of file/directory patterns to include (if provided, only these are processed)
# include = [
#     "public/**/*.html",
# ]

# List of file/directory patterns to exclude
exclude = [
    # Common directories to exclude
    ".git",
    "node_modules",
]

# Respect .gitignore files when scanning directories (default: true)
respect-gitignore = true

# Class tokens used for selection and injected markup
# [annotator]
# wrapper-class = "highlight"
# marker-class = "line-numbers"
# rows-class = "line-numbers-rows"
"#
}
