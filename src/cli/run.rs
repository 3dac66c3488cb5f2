// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Run command - execute one command line

use std::process::ExitCode;

use super::{exit_code, ShellContext};

/// Run a single line and exit with its status
pub async fn run(context: &ShellContext, line: &str) -> ExitCode {
    let outcome = context.dispatcher().dispatch_line(line, 0).await;
    tracing::debug!(status = outcome.status, "command line finished");
    exit_code(outcome.status)
}
