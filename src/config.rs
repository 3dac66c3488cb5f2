// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Shell configuration
//!
//! Loaded from `config.toml` in the platform config directory, or from the
//! file given with `--config`. Every key is optional.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{PipeflowError, PipeflowResult};
use crate::pipeline::DEFAULT_FILE_MODE;

/// Shell configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// When the executor waits for spawned stages
    #[serde(default)]
    pub wait: WaitStrategy,

    /// How the final stage's termination becomes the pipeline status
    #[serde(default)]
    pub status: StatusMode,

    /// Permission bits for files created by `>` and `>>`
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,

    /// Label shown in the interactive prompt
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

fn default_prompt() -> String {
    "pipeflow".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            wait: WaitStrategy::default(),
            status: StatusMode::default(),
            file_mode: default_file_mode(),
            prompt: default_prompt(),
        }
    }
}

impl ShellConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> PipeflowResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Per-user config location, e.g. `~/.config/pipeflow/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "pipeflow").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> PipeflowResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipeflowError::ConfigRead {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| PipeflowError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// When the executor waits for the processes it spawns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WaitStrategy {
    /// Spawn the whole chain, then wait for every stage in order
    #[default]
    Concurrent,
    /// Wait for each stage before spawning the next one
    ///
    /// A stage that writes more than a pipe buffer blocks forever, because
    /// its reader has not been spawned yet.
    Sequential,
}

/// How the pipeline status is derived from the final stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusMode {
    /// `0` on success, the failure sentinel otherwise
    #[default]
    Collapse,
    /// The final stage's own exit code (`128 + signal` when killed)
    Exact,
}
