// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! # pipeflow - Pipeline Execution Shell
//!
//! `pipeflow` is the execution engine of a command-line shell. It takes a
//! parsed pipeline of commands joined by pipes, with optional file
//! redirections, runs it as a chain of OS processes and reports a single
//! exit status.
//!
//! ## Features
//!
//! - **Builtin dispatch** - single commands can run in-process
//! - **Process chaining** - one process per stage, joined by pipes
//! - **Redirections** - `<`, `>` and `>>` with owner-only created files
//! - **Contained failures** - a missing file or program fails only its stage
//!
//! ## Quick Start
//!
//! ```bash
//! # Interactive shell
//! pipeflow
//!
//! # One command line
//! pipeflow run 'ls | wc -l'
//!
//! # Inspect how a line parses
//! pipeflow parse 'sort < names.txt | uniq >> seen.txt'
//! ```

pub mod builtins;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod parser;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use builtins::{create_default_builtins, Builtin, BuiltinOutcome, BuiltinRegistry};
pub use config::{ShellConfig, StatusMode, WaitStrategy};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use errors::{PipeflowError, PipeflowResult};
pub use parser::{parse_line, ParseError};
pub use pipeline::{OutputDisposition, Pipeline, PipelineExecutor, Stage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
