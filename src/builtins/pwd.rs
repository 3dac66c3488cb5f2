// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

use std::io::Write;

use super::{Builtin, BuiltinOutcome};

/// `pwd` - print the working directory
pub struct Pwd;

impl Builtin for Pwd {
    fn name(&self) -> &'static str {
        "pwd"
    }

    fn run(&self, _argv: &[String], _last_status: i32) -> BuiltinOutcome {
        let cwd = match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                eprintln!("pwd: {}", e);
                return BuiltinOutcome::status(1);
            }
        };

        let mut stdout = std::io::stdout().lock();
        match writeln!(stdout, "{}", cwd.display()).and_then(|()| stdout.flush()) {
            Ok(()) => BuiltinOutcome::status(0),
            Err(e) => {
                eprintln!("pwd: write error: {}", e);
                BuiltinOutcome::status(1)
            }
        }
    }
}
