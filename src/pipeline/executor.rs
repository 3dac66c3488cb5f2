// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Pipeline executor
//!
//! Realizes a pipeline as a chain of OS processes. Each stage gets its own
//! process; adjacent stages are joined by a pipe created just before the
//! writing stage is spawned. Every pipe end and redirect file is an owned
//! handle that is moved into exactly one spawn configuration, so the
//! orchestrator never keeps a copy past the spawn call.

use std::io::{self, PipeReader, PipeWriter};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::config::{ShellConfig, StatusMode, WaitStrategy};
use crate::errors::{PipeflowError, PipeflowResult};
use crate::pipeline::redirect::{self, OutputMode, DEFAULT_FILE_MODE};
use crate::pipeline::{Pipeline, Stage};

/// Pipeline status for success
pub const SUCCESS: i32 = 0;

/// Pipeline status for failure, and for pipelines that could not be built
pub const FAILURE_SENTINEL: i32 = -1;

/// Exit status of a stage that failed before its program started
pub const STAGE_FAILURE_CODE: i32 = 1;

/// Pipeline execution options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// When to wait for spawned stages
    pub wait: WaitStrategy,
    /// How to report the final status
    pub status: StatusMode,
    /// Permission bits for created redirect targets
    pub file_mode: u32,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            wait: WaitStrategy::default(),
            status: StatusMode::default(),
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

impl From<&ShellConfig> for ExecutionOptions {
    fn from(config: &ShellConfig) -> Self {
        Self {
            wait: config.wait,
            status: config.status,
            file_mode: config.file_mode,
        }
    }
}

/// A failure confined to one stage
///
/// The stage never runs; it contributes [`STAGE_FAILURE_CODE`] to the
/// pipeline and its downstream reader sees end-of-stream.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("cannot open file or directory: {}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open file or directory: {}", .path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot find command: {program}")]
    CommandNotFound { program: String },

    #[error("cannot execute command: {program}: {source}")]
    CannotExecute {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// How a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Normal exit with a status code
    Exited(i32),
    /// Killed by a signal
    Signaled(i32),
    /// Never started, see [`StageError`]
    NotStarted,
}

impl Termination {
    fn from_exit_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Self::Exited(code);
        }

        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            Self::Signaled(status.signal().unwrap_or_default())
        }
        #[cfg(not(unix))]
        {
            Self::Exited(FAILURE_SENTINEL)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Shell-style numeric code
    pub fn code(&self) -> i32 {
        match self {
            Self::Exited(code) => *code,
            Self::Signaled(signal) => 128 + signal,
            Self::NotStarted => STAGE_FAILURE_CODE,
        }
    }
}

/// Result of one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome {
    /// Position in the pipeline
    pub index: usize,
    /// Program name
    pub program: String,
    /// How the stage ended
    pub termination: Termination,
}

/// Result of executing a pipeline
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Outcomes in stage order
    pub outcomes: Vec<StageOutcome>,
    mode: StatusMode,
}

impl PipelineReport {
    fn new(outcomes: Vec<StageOutcome>, mode: StatusMode) -> Self {
        Self { outcomes, mode }
    }

    /// Aggregated status
    ///
    /// Only the last completed stage counts; earlier failures are
    /// overwritten, so `false | true` succeeds.
    pub fn status(&self) -> i32 {
        let Some(last) = self.outcomes.last() else {
            return FAILURE_SENTINEL;
        };

        match self.mode {
            StatusMode::Collapse if last.termination.is_success() => SUCCESS,
            StatusMode::Collapse => FAILURE_SENTINEL,
            StatusMode::Exact => last.termination.code(),
        }
    }

    pub fn success(&self) -> bool {
        self.status() == SUCCESS
    }
}

/// A spawned or already-settled stage
enum StageHandle {
    Running {
        index: usize,
        program: String,
        child: Child,
    },
    Finished(StageOutcome),
}

impl StageHandle {
    async fn wait(self) -> PipeflowResult<StageOutcome> {
        let (index, program, mut child) = match self {
            Self::Finished(outcome) => return Ok(outcome),
            Self::Running {
                index,
                program,
                child,
            } => (index, program, child),
        };

        let status = child.wait().await.map_err(|e| PipeflowError::Wait {
            stage: index,
            program: program.clone(),
            error: e.to_string(),
        })?;

        let termination = Termination::from_exit_status(status);
        debug!(stage = index, program = %program, ?termination, "stage finished");

        Ok(StageOutcome {
            index,
            program,
            termination,
        })
    }
}

/// Pipeline executor
#[derive(Debug, Clone, Default)]
pub struct PipelineExecutor {
    options: ExecutionOptions,
}

impl PipelineExecutor {
    /// Create a new pipeline executor
    pub fn new(options: ExecutionOptions) -> Self {
        if options.wait == WaitStrategy::Sequential {
            warn!("sequential wait: a stage writing more than one pipe buffer will block forever");
        }
        Self { options }
    }

    /// Execute a pipeline
    ///
    /// Stage-local failures are part of the report. An `Err` means the
    /// pipeline itself could not be built: a pipe or a process could not be
    /// created, or a child could not be awaited. Stages that were already
    /// running at that point are killed and reaped first.
    pub async fn execute(&self, pipeline: &Pipeline) -> PipeflowResult<PipelineReport> {
        pipeline.validate()?;

        let mut handles = Vec::with_capacity(pipeline.len());
        let mut upstream: Option<PipeReader> = None;

        for (index, stage) in pipeline.stages().iter().enumerate() {
            let (downstream, writer) = if stage.pipes_to_next() {
                match io::pipe() {
                    Ok((reader, writer)) => {
                        debug!(stage = index, program = stage.program(), "created pipe");
                        (Some(reader), Some(writer))
                    }
                    Err(e) => {
                        drop(upstream);
                        abort(handles).await;
                        return Err(PipeflowError::PipeCreation {
                            stage: index,
                            program: stage.program().to_string(),
                            error: e.to_string(),
                        });
                    }
                }
            } else {
                (None, None)
            };

            let handle = match self.spawn_stage(index, stage, upstream.take(), writer) {
                Ok(handle) => handle,
                Err(e) => {
                    drop(downstream);
                    abort(handles).await;
                    return Err(e);
                }
            };
            upstream = downstream;

            match self.options.wait {
                WaitStrategy::Sequential => handles.push(StageHandle::Finished(handle.wait().await?)),
                WaitStrategy::Concurrent => handles.push(handle),
            }
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        let mut pending = handles.into_iter();
        while let Some(handle) = pending.next() {
            match handle.wait().await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    abort(pending.collect()).await;
                    return Err(e);
                }
            }
        }

        Ok(PipelineReport::new(outcomes, self.options.status))
    }

    /// Spawn one stage with its pipe ends
    ///
    /// `stdin_pipe` is the previous stage's read end and `stdout_pipe` the
    /// write end of this stage's own pipe. Both are consumed: either handed
    /// to the child or closed when this returns.
    fn spawn_stage(
        &self,
        index: usize,
        stage: &Stage,
        stdin_pipe: Option<PipeReader>,
        stdout_pipe: Option<PipeWriter>,
    ) -> PipeflowResult<StageHandle> {
        let mut command = match self.prepare(stage, stdin_pipe, stdout_pipe) {
            Ok(command) => command,
            Err(error) => return Ok(stage_failed(index, stage, error)),
        };

        // The command holds the parent's copies of the child's stdio and
        // releases them when it goes out of scope below.
        match command.spawn() {
            Ok(child) => {
                debug!(stage = index, program = stage.program(), pid = ?child.id(), "spawned stage");
                Ok(StageHandle::Running {
                    index,
                    program: stage.program().to_string(),
                    child,
                })
            }
            Err(e) if is_process_creation_failure(&e) => Err(PipeflowError::Spawn {
                stage: index,
                program: stage.program().to_string(),
                error: e.to_string(),
            }),
            Err(e) => {
                let error = StageError::CannotExecute {
                    program: stage.program().to_string(),
                    source: e,
                };
                Ok(stage_failed(index, stage, error))
            }
        }
    }

    /// Resolve a stage's streams and program into a spawn configuration
    ///
    /// Redirect files take precedence over pipe ends, matching the order a
    /// shell applies them in: pipes first, then files on top.
    fn prepare(
        &self,
        stage: &Stage,
        stdin_pipe: Option<PipeReader>,
        stdout_pipe: Option<PipeWriter>,
    ) -> Result<Command, StageError> {
        let stdin = match stage.input_path() {
            Some(path) => {
                let file = redirect::open_input(path).map_err(|source| StageError::OpenInput {
                    path: path.to_path_buf(),
                    source,
                })?;
                Stdio::from(file)
            }
            None => stdin_pipe.map_or_else(Stdio::inherit, Stdio::from),
        };

        let stdout = match OutputMode::from_disposition(&stage.output) {
            Some((mode, path)) => {
                let file = redirect::open_output(path, mode, self.options.file_mode).map_err(
                    |source| StageError::OpenOutput {
                        path: path.to_path_buf(),
                        source,
                    },
                )?;
                Stdio::from(file)
            }
            None => stdout_pipe.map_or_else(Stdio::inherit, Stdio::from),
        };

        if which::which(stage.program()).is_err() {
            return Err(StageError::CommandNotFound {
                program: stage.program().to_string(),
            });
        }

        let mut command = Command::new(stage.program());
        command.args(stage.args()).stdin(stdin).stdout(stdout);
        Ok(command)
    }
}

/// Spawn errors where no process could be created at all
///
/// Anything else (bad executable format, argument list too long, a busy
/// text file, ...) is a failure to load the program image and only costs
/// that stage.
fn is_process_creation_failure(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory | io::ErrorKind::InvalidInput
    )
}

/// Report a stage-local failure and settle the stage with status 1
fn stage_failed(index: usize, stage: &Stage, error: StageError) -> StageHandle {
    eprintln!("error: {}", error);
    debug!(stage = index, program = stage.program(), error = %error, "stage did not start");

    StageHandle::Finished(StageOutcome {
        index,
        program: stage.program().to_string(),
        termination: Termination::NotStarted,
    })
}

/// Kill and reap stages left running when a pipeline is abandoned
async fn abort(handles: Vec<StageHandle>) {
    for handle in handles {
        if let StageHandle::Running {
            index, mut child, ..
        } = handle
        {
            if let Err(e) = child.start_kill() {
                debug!(stage = index, error = %e, "stage already exited");
            }
            if let Err(e) = child.wait().await {
                debug!(stage = index, error = %e, "failed to reap aborted stage");
            }
        }
    }
}
