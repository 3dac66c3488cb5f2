// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

use std::path::PathBuf;

use directories::BaseDirs;

use super::{Builtin, BuiltinOutcome};

/// `cd [dir]` - change the shell's working directory
pub struct Cd;

impl Builtin for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn run(&self, argv: &[String], _last_status: i32) -> BuiltinOutcome {
        let target = match argv.get(1..).unwrap_or_default() {
            [] => match BaseDirs::new() {
                Some(dirs) => dirs.home_dir().to_path_buf(),
                None => {
                    eprintln!("cd: cannot determine home directory");
                    return BuiltinOutcome::status(1);
                }
            },
            [dir] => PathBuf::from(dir),
            _ => {
                eprintln!("cd: too many arguments");
                return BuiltinOutcome::status(1);
            }
        };

        match std::env::set_current_dir(&target) {
            Ok(()) => {
                tracing::debug!(dir = %target.display(), "changed directory");
                BuiltinOutcome::status(0)
            }
            Err(e) => {
                eprintln!("cd: {}: {}", target.display(), e);
                BuiltinOutcome::status(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_too_many_arguments() {
        let before = std::env::current_dir().unwrap();
        let outcome = Cd.run(&argv(&["cd", "/", "/tmp"]), 0);

        assert_eq!(outcome, BuiltinOutcome::status(1));
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");

        let outcome = Cd.run(&argv(&["cd", missing.to_str().unwrap()]), 0);

        assert_eq!(outcome, BuiltinOutcome::status(1));
        assert!(!outcome.exit_requested);
    }
}
