// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Pipeline definition structures
//!
//! A pipeline is an owned, ordered list of stages. The stage that receives
//! stage `i`'s output is simply stage `i + 1`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{PipeflowError, PipeflowResult};

/// A parsed pipeline: one or more stages connected by pipes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Stages in execution order
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Build a pipeline, checking the stage invariants
    pub fn new(stages: Vec<Stage>) -> PipeflowResult<Self> {
        let pipeline = Self { stages };
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Chain commands with pipes; the last one inherits the shell's output
    pub fn piped<I, A, S>(commands: I) -> PipeflowResult<Self>
    where
        I: IntoIterator<Item = A>,
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stages: Vec<Stage> = commands.into_iter().map(Stage::new).collect();
        let count = stages.len();
        for stage in stages.iter_mut().take(count.saturating_sub(1)) {
            stage.output = OutputDisposition::Pipe;
        }
        Self::new(stages)
    }

    /// Check the structural invariants of the stage list
    ///
    /// Every stage but the last pipes into its successor, and the last
    /// stage never does.
    pub fn validate(&self) -> PipeflowResult<()> {
        if self.stages.is_empty() {
            return Err(PipeflowError::invalid_pipeline("pipeline has no stages"));
        }

        let last = self.stages.len() - 1;
        for (index, stage) in self.stages.iter().enumerate() {
            if stage.argv.is_empty() || stage.argv[0].is_empty() {
                return Err(PipeflowError::invalid_pipeline(format!(
                    "stage {} has no program name",
                    index
                )));
            }

            match (index == last, stage.pipes_to_next()) {
                (true, true) => {
                    return Err(PipeflowError::invalid_pipeline(format!(
                        "last stage '{}' cannot pipe to a next stage",
                        stage.program()
                    )));
                }
                (false, false) => {
                    return Err(PipeflowError::invalid_pipeline(format!(
                        "stage {} ('{}') is followed by another stage but does not pipe into it",
                        index,
                        stage.program()
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The first stage, which decides builtin routing
    pub fn first(&self) -> &Stage {
        &self.stages[0]
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether this pipeline is a single command with no pipes
    pub fn is_single_stage(&self) -> bool {
        self.stages.len() == 1
    }

    /// Serialize pipeline to JSON
    pub fn to_json(&self) -> PipeflowResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Serialize pipeline to YAML
    pub fn to_yaml(&self) -> PipeflowResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }
}

/// A single command within a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Argument vector; `argv[0]` is the program name
    pub argv: Vec<String>,

    /// File to read standard input from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Where standard output goes
    #[serde(default)]
    pub output: OutputDisposition,
}

impl Stage {
    /// Create a stage that inherits both standard streams
    pub fn new<A, S>(argv: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            input: None,
            output: OutputDisposition::Inherit,
        }
    }

    /// Read standard input from a file
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Set the output disposition
    pub fn with_output(mut self, output: OutputDisposition) -> Self {
        self.output = output;
        self
    }

    /// Program name (`argv[0]`)
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    /// Arguments after the program name
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    pub fn input_path(&self) -> Option<&Path> {
        self.input.as_deref()
    }

    pub fn pipes_to_next(&self) -> bool {
        matches!(self.output, OutputDisposition::Pipe)
    }
}

/// Destination of a stage's standard output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "lowercase")]
pub enum OutputDisposition {
    /// Use the shell's own standard output
    #[default]
    Inherit,
    /// Feed the next stage's standard input
    Pipe,
    /// Replace the file's contents (`>`)
    Truncate(PathBuf),
    /// Append to the file (`>>`)
    Append(PathBuf),
}

impl OutputDisposition {
    /// Redirect target, present only for file dispositions
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Truncate(path) | Self::Append(path) => Some(path),
            Self::Inherit | Self::Pipe => None,
        }
    }
}

impl std::fmt::Display for OutputDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inherit => write!(f, "inherit"),
            Self::Pipe => write!(f, "pipe"),
            Self::Truncate(path) => write!(f, "> {}", path.display()),
            Self::Append(path) => write!(f, ">> {}", path.display()),
        }
    }
}
