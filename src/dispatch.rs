// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Command dispatch
//!
//! Routes a parsed pipeline either to an in-process builtin or to the
//! pipeline executor.
//!
//! Only a single-stage pipeline can run a builtin. A multi-stage pipeline
//! goes to the executor as a whole, even when its first stage names a
//! builtin, so `pwd | cat` runs the external `pwd` program.

use tracing::debug;

use crate::builtins::BuiltinRegistry;
use crate::parser::parse_line;
use crate::pipeline::{Pipeline, PipelineExecutor, FAILURE_SENTINEL};

/// Result of dispatching a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Status of the command
    pub status: i32,
    /// A builtin asked the shell to terminate
    pub exit_requested: bool,
}

impl DispatchOutcome {
    fn status(status: i32) -> Self {
        Self {
            status,
            exit_requested: false,
        }
    }
}

/// Routes pipelines to builtins or to process execution
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    builtins: &'a BuiltinRegistry,
    executor: &'a PipelineExecutor,
}

impl<'a> Dispatcher<'a> {
    pub fn new(builtins: &'a BuiltinRegistry, executor: &'a PipelineExecutor) -> Self {
        Self { builtins, executor }
    }

    /// Parse and run one line of input
    ///
    /// A blank line keeps `last_status`. A parse error is reported on
    /// standard error and yields the failure sentinel.
    pub async fn dispatch_line(&self, line: &str, last_status: i32) -> DispatchOutcome {
        match parse_line(line) {
            Ok(Some(pipeline)) => self.dispatch(&pipeline, last_status).await,
            Ok(None) => DispatchOutcome::status(last_status),
            Err(e) => {
                eprintln!("Input parse error: {}", e);
                DispatchOutcome::status(FAILURE_SENTINEL)
            }
        }
    }

    /// Run a parsed pipeline
    pub async fn dispatch(&self, pipeline: &Pipeline, last_status: i32) -> DispatchOutcome {
        let first = pipeline.first();

        if pipeline.is_single_stage() {
            if let Some(builtin) = self.builtins.get(first.program()) {
                debug!(builtin = builtin.name(), "running builtin");
                let outcome = builtin.run(&first.argv, last_status);
                return DispatchOutcome {
                    status: outcome.status,
                    exit_requested: outcome.exit_requested,
                };
            }
        }

        match self.executor.execute(pipeline).await {
            Ok(report) => DispatchOutcome::status(report.status()),
            Err(e) => {
                eprintln!("error: {}", e);
                debug!(error = ?e, "pipeline aborted");
                DispatchOutcome::status(FAILURE_SENTINEL)
            }
        }
    }
}
