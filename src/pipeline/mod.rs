// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Pipelines and their execution
//!
//! This module defines the stage representation handed over by the parser
//! and the executor that turns it into a chain of processes.

mod definition;
mod executor;
pub mod redirect;

pub use definition::*;
pub use executor::{
    ExecutionOptions, PipelineExecutor, PipelineReport, StageError, StageOutcome, Termination,
    FAILURE_SENTINEL, STAGE_FAILURE_CODE, SUCCESS,
};
pub use redirect::DEFAULT_FILE_MODE;
