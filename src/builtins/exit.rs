// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

use super::{Builtin, BuiltinOutcome};

/// `exit [code]` - terminate the shell
///
/// Without an argument the shell exits with the previous command's status.
pub struct Exit;

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn run(&self, argv: &[String], last_status: i32) -> BuiltinOutcome {
        match argv.get(1..).unwrap_or_default() {
            [] => BuiltinOutcome::exit(last_status),
            [code] => match code.parse::<i32>() {
                Ok(code) => BuiltinOutcome::exit(code),
                Err(_) => {
                    eprintln!("exit: {}: numeric argument required", code);
                    BuiltinOutcome::status(2)
                }
            },
            _ => {
                eprintln!("exit: too many arguments");
                BuiltinOutcome::status(1)
            }
        }
    }
}
