// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! pipeflow - pipeline execution shell
//!
//! Runs command lines of piped external programs with file redirections.

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipeflow::cli::{Cli, Commands, ShellContext};

// Children do the parallel work; the shell itself needs one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize tracing on stderr, away from command output
    let default_filter = if cli.verbose {
        "pipeflow=debug"
    } else {
        "pipeflow=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    pipeflow::utils::configure();

    // Dispatch to command handlers
    match cli.command {
        Some(Commands::Parse {
            ref line,
            format,
        }) => pipeflow::cli::parse::run(line, format, cli.verbose)
            .await
            .map(|()| ExitCode::SUCCESS),
        Some(Commands::Run { ref line }) => {
            let context = ShellContext::from_cli(&cli)?;
            Ok(pipeflow::cli::run::run(&context, line).await)
        }
        Some(Commands::Repl) | None => {
            let context = ShellContext::from_cli(&cli)?;
            pipeflow::cli::repl::run(&context).await
        }
    }
}
