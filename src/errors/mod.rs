// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Error types
//!
//! Only orchestration failures surface as `PipeflowError`. Failures that
//! belong to a single stage (missing input file, unresolvable program) are
//! absorbed into that stage's exit status instead, see
//! [`crate::pipeline::StageError`].

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::parser::ParseError;

/// Result type for pipeflow operations
pub type PipeflowResult<T> = Result<T, PipeflowError>;

/// Main error type for pipeflow
#[derive(Error, Debug, Diagnostic)]
pub enum PipeflowError {
    // ─────────────────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid pipeline: {reason}")]
    #[diagnostic(code(pipeflow::invalid_pipeline))]
    InvalidPipeline { reason: String },

    #[error("Input parse error: {0}")]
    #[diagnostic(code(pipeflow::parse_error))]
    Parse(#[from] ParseError),

    // ─────────────────────────────────────────────────────────────────────────
    // Orchestration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("failed to create pipe for stage {stage} ('{program}'): {error}")]
    #[diagnostic(
        code(pipeflow::pipe_creation),
        help("The shell may have run out of file descriptors")
    )]
    PipeCreation {
        stage: usize,
        program: String,
        error: String,
    },

    #[error("failed to spawn stage {stage} ('{program}'): {error}")]
    #[diagnostic(code(pipeflow::spawn_failed))]
    Spawn {
        stage: usize,
        program: String,
        error: String,
    },

    #[error("failed to wait for stage {stage} ('{program}'): {error}")]
    #[diagnostic(code(pipeflow::wait_failed))]
    Wait {
        stage: usize,
        program: String,
        error: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read config file '{path}': {error}")]
    #[diagnostic(code(pipeflow::config_read))]
    ConfigRead { path: PathBuf, error: String },

    #[error("Invalid config file '{path}': {message}")]
    #[diagnostic(
        code(pipeflow::config_parse),
        help("Valid keys: wait, status, file_mode, prompt")
    )]
    ConfigParse { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("YAML serialization error: {message}")]
    #[diagnostic(code(pipeflow::yaml_error))]
    Yaml { message: String },

    #[error("JSON serialization error: {message}")]
    #[diagnostic(code(pipeflow::json_error))]
    Json { message: String },
}

impl From<serde_yaml::Error> for PipeflowError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for PipeflowError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl PipeflowError {
    pub(crate) fn invalid_pipeline(reason: impl Into<String>) -> Self {
        Self::InvalidPipeline {
            reason: reason.into(),
        }
    }
}
