// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Builtin commands
//!
//! Builtins run inside the shell process. The registry is built once at
//! startup and only read afterwards.

mod cd;
mod exit;
mod pwd;

pub use cd::Cd;
pub use exit::Exit;
pub use pwd::Pwd;

use std::collections::HashMap;

/// Result of running a builtin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinOutcome {
    /// Exit status
    pub status: i32,
    /// The builtin asked the shell to terminate
    pub exit_requested: bool,
}

impl BuiltinOutcome {
    /// Finish with a status and keep the shell running
    pub fn status(status: i32) -> Self {
        Self {
            status,
            exit_requested: false,
        }
    }

    /// Finish with a status and terminate the shell
    pub fn exit(status: i32) -> Self {
        Self {
            status,
            exit_requested: true,
        }
    }
}

/// Trait for in-process commands
pub trait Builtin: Send + Sync {
    /// Name the command is invoked by
    fn name(&self) -> &'static str;

    /// Run the command
    ///
    /// # Arguments
    /// * `argv` - Full argument vector, `argv[0]` is the builtin's name
    /// * `last_status` - Status of the previously executed command
    fn run(&self, argv: &[String], last_status: i32) -> BuiltinOutcome;
}

/// Immutable lookup from command name to builtin
#[derive(Default)]
pub struct BuiltinRegistry {
    builtins: HashMap<&'static str, Box<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// Start building a registry
    pub fn builder() -> BuiltinRegistryBuilder {
        BuiltinRegistryBuilder::default()
    }

    /// Look up a builtin by exact name
    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins.get(name).map(|builtin| &**builtin)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.builtins.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("builtins", &self.names())
            .finish()
    }
}

/// Collects builtins before the registry is frozen
#[derive(Default)]
pub struct BuiltinRegistryBuilder {
    builtins: HashMap<&'static str, Box<dyn Builtin>>,
}

impl BuiltinRegistryBuilder {
    /// Register a builtin under its own name, replacing any previous one
    pub fn register(mut self, builtin: impl Builtin + 'static) -> Self {
        self.builtins.insert(builtin.name(), Box::new(builtin));
        self
    }

    pub fn build(self) -> BuiltinRegistry {
        BuiltinRegistry {
            builtins: self.builtins,
        }
    }
}

/// Create the standard registry with all shell builtins
pub fn create_default_builtins() -> BuiltinRegistry {
    BuiltinRegistry::builder()
        .register(Exit)
        .register(Cd)
        .register(Pwd)
        .build()
}
