// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipeflow.

pub mod parse;
pub mod repl;
pub mod run;

use clap::{Parser, Subcommand};
use miette::Result;
use std::path::PathBuf;

use crate::builtins::{create_default_builtins, BuiltinRegistry};
use crate::config::{ShellConfig, StatusMode, WaitStrategy};
use crate::dispatch::Dispatcher;
use crate::pipeline::{ExecutionOptions, PipelineExecutor};

/// Pipeline execution shell
///
/// Runs command lines made of pipes and file redirections.
#[derive(Parser, Debug)]
#[clap(
    name = "pipeflow",
    version,
    about = "A small shell that runs pipelines of external commands",
    long_about = None,
    after_help = "Examples:\n\
        pipeflow                              Start an interactive shell\n\
        pipeflow run 'ls | wc -l'             Run one command line\n\
        pipeflow parse 'sort < in > out'      Show how a line is parsed\n\n\
        See 'pipeflow <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: the per-user config.toml)
    #[clap(long, global = true, value_name = "FILE", env = "PIPEFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override when stages are waited for
    #[clap(long, global = true, value_enum)]
    pub wait: Option<WaitStrategy>,

    /// Override how the pipeline status is reported
    #[clap(long, global = true, value_enum)]
    pub status: Option<StatusMode>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read command lines from standard input (the default)
    Repl,

    /// Run a single command line
    Run {
        /// The command line, e.g. "ls | wc -l"
        line: String,
    },

    /// Parse a command line and print its pipeline
    Parse {
        /// The command line to parse
        line: String,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

/// Output format for the parse command
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Everything a running shell needs, built once at startup
#[derive(Debug)]
pub struct ShellContext {
    pub config: ShellConfig,
    pub builtins: BuiltinRegistry,
    pub executor: PipelineExecutor,
}

impl ShellContext {
    /// Load configuration and apply command-line overrides
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = ShellConfig::load(cli.config.as_deref())?;
        if let Some(wait) = cli.wait {
            config.wait = wait;
        }
        if let Some(status) = cli.status {
            config.status = status;
        }

        Ok(Self::new(config))
    }

    pub fn new(config: ShellConfig) -> Self {
        let executor = PipelineExecutor::new(ExecutionOptions::from(&config));
        Self {
            config,
            builtins: create_default_builtins(),
            executor,
        }
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.builtins, &self.executor)
    }
}

/// Map a shell status onto a process exit code
///
/// Statuses wrap like a POSIX exit code, so the failure sentinel `-1`
/// becomes 255.
pub fn exit_code(status: i32) -> std::process::ExitCode {
    std::process::ExitCode::from(status as u8)
}
