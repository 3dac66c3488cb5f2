// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Repl command - read and run lines until end of input or `exit`

use std::io::{IsTerminal, Write};
use std::process::ExitCode;

use miette::{IntoDiagnostic, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{exit_code, ShellContext};
use crate::utils::colors;

/// Run the read-eval-print loop
///
/// The prompt is only shown when standard input is a terminal, so scripts
/// piped into the shell produce nothing but their commands' output.
pub async fn run(context: &ShellContext) -> Result<ExitCode> {
    let interactive = std::io::stdin().is_terminal();
    let dispatcher = context.dispatcher();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_status = 0;

    loop {
        if interactive {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{}", colors::prompt(&context.config.prompt, last_status))
                .and_then(|()| stdout.flush())
                .into_diagnostic()?;
        }

        let Some(line) = lines.next_line().await.into_diagnostic()? else {
            break;
        };

        let outcome = dispatcher.dispatch_line(&line, last_status).await;
        last_status = outcome.status;

        if outcome.exit_requested {
            tracing::debug!(status = last_status, "exit requested");
            break;
        }
    }

    if interactive {
        println!();
    }

    Ok(exit_code(last_status))
}
