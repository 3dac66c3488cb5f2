// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Parse command - show the pipeline a line turns into

use miette::Result;

use super::OutputFormat;
use crate::errors::PipeflowError;
use crate::parser::parse_line;
use crate::pipeline::Pipeline;
use crate::utils::colors;

/// Run the parse command
pub async fn run(line: &str, format: OutputFormat, verbose: bool) -> Result<()> {
    let Some(pipeline) = parse_line(line).map_err(PipeflowError::from)? else {
        if verbose {
            eprintln!("{}", colors::dimmed("(empty line)"));
        }
        return Ok(());
    };

    match format {
        OutputFormat::Json => println!("{}", pipeline.to_json()?),
        OutputFormat::Yaml => print!("{}", pipeline.to_yaml()?),
        OutputFormat::Text => print_text(&pipeline),
    }

    Ok(())
}

fn print_text(pipeline: &Pipeline) {
    println!(
        "{} ({} stage{})",
        colors::bold("Pipeline"),
        pipeline.len(),
        if pipeline.len() == 1 { "" } else { "s" }
    );

    for (i, stage) in pipeline.stages().iter().enumerate() {
        println!("  {}. {}", i + 1, colors::code(&stage.argv.join(" ")));
        if let Some(input) = stage.input_path() {
            println!("     {} {}", colors::dimmed("stdin: "), input.display());
        }
        println!("     {} {}", colors::dimmed("stdout:"), stage.output);
    }
}
