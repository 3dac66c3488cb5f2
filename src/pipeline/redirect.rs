// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! File redirections
//!
//! Opens the files named by `<`, `>` and `>>`. The returned handles are
//! moved into the spawned stage and close when the spawn configuration is
//! dropped.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use crate::pipeline::OutputDisposition;

/// Owner read/write, the permission given to newly created redirect targets
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// How an output redirection writes to its file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Replace the existing contents
    Truncate,
    /// Keep the existing contents and write after them
    Append,
}

impl OutputMode {
    /// Output mode and target for a file disposition
    pub fn from_disposition(output: &OutputDisposition) -> Option<(Self, &Path)> {
        match output {
            OutputDisposition::Truncate(path) => Some((Self::Truncate, path)),
            OutputDisposition::Append(path) => Some((Self::Append, path)),
            OutputDisposition::Inherit | OutputDisposition::Pipe => None,
        }
    }
}

/// Open an input redirection read-only
pub fn open_input(path: &Path) -> io::Result<File> {
    File::open(path)
}

/// Open an output redirection, creating the file with `file_mode` if absent
pub fn open_output(path: &Path, mode: OutputMode, file_mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);

    match mode {
        OutputMode::Truncate => options.truncate(true),
        OutputMode::Append => options.append(true),
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(file_mode);
    }
    #[cfg(not(unix))]
    let _ = file_mode;

    options.open(path)
}
