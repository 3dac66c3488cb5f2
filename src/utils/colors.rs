// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Terminal color utilities
//!
//! Colors only ever decorate the shell's own output (prompt, parse view);
//! command output passes through untouched.

use std::io::IsTerminal;

use colored::Colorize;

/// Check if colors should be used
pub fn should_use_colors() -> bool {
    // Respect NO_COLOR environment variable
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    std::io::stdout().is_terminal()
}

/// Apply the color decision globally
pub fn configure() {
    colored::control::set_override(should_use_colors());
}

/// Interactive prompt showing the previous status
pub fn prompt(label: &str, last_status: i32) -> String {
    let status = last_status.to_string();
    let status = if last_status == 0 {
        status.green()
    } else {
        status.red()
    };
    format!("{} [{}]$ ", label.bold(), status)
}

/// Style for emphasized/bold text
pub fn bold(msg: &str) -> colored::ColoredString {
    msg.bold()
}

/// Style for dimmed/secondary text
pub fn dimmed(msg: &str) -> colored::ColoredString {
    msg.dimmed()
}

/// Style for code/commands
pub fn code(msg: &str) -> colored::ColoredString {
    msg.cyan()
}
