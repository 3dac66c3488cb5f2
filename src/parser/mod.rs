// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Input line parser
//!
//! Turns one line of input into a [`Pipeline`]:
//!
//! ```text
//! line  := stage ('|' stage)*
//! stage := word+ with at most one '<' file and one '>' / '>>' file
//! ```
//!
//! There is no expansion of any kind: quotes only group characters.

mod lexer;

pub use lexer::{tokenize, Token};

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::{OutputDisposition, Pipeline, Stage};

/// Reasons a line cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated {quote} quote")]
    UnterminatedQuote { quote: char },

    #[error("missing file name after '{operator}'")]
    MissingRedirectTarget { operator: String },

    #[error("missing command")]
    EmptyStage,

    #[error("duplicate input redirection")]
    DuplicateInput,

    #[error("duplicate output redirection")]
    DuplicateOutput,

    #[error("output redirected to a file and piped at the same time")]
    OutputBeforePipe,

    #[error("input redirected from a file and piped at the same time")]
    InputAfterPipe,
}

/// Parse a line into a pipeline
///
/// Returns `Ok(None)` for a line with no tokens.
pub fn parse_line(line: &str) -> Result<Option<Pipeline>, ParseError> {
    let tokens = tokenize(line)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let segments: Vec<&[Token]> = tokens.split(|t| *t == Token::Pipe).collect();
    let last = segments.len() - 1;

    let mut stages = Vec::with_capacity(segments.len());
    for (index, segment) in segments.into_iter().enumerate() {
        let mut stage = parse_stage(segment)?;

        if index != last {
            if stage.output != OutputDisposition::Inherit {
                return Err(ParseError::OutputBeforePipe);
            }
            stage.output = OutputDisposition::Pipe;
        }
        if index != 0 && stage.input.is_some() {
            return Err(ParseError::InputAfterPipe);
        }

        stages.push(stage);
    }

    // The checks above already establish every stage invariant
    Pipeline::new(stages)
        .map(Some)
        .map_err(|_| ParseError::EmptyStage)
}

fn parse_stage(tokens: &[Token]) -> Result<Stage, ParseError> {
    let mut argv = Vec::new();
    let mut input: Option<PathBuf> = None;
    let mut output = OutputDisposition::Inherit;

    let mut iter = tokens.iter();
    while let Some(token) = iter.next() {
        let operator = match token {
            Token::Word(word) => {
                argv.push(word.clone());
                continue;
            }
            // split() removed every pipe
            Token::Pipe => continue,
            operator => operator,
        };

        let target = match iter.next() {
            Some(Token::Word(word)) => PathBuf::from(word),
            _ => {
                return Err(ParseError::MissingRedirectTarget {
                    operator: operator.to_string(),
                })
            }
        };

        match operator {
            Token::Input if input.is_some() => return Err(ParseError::DuplicateInput),
            Token::Input => input = Some(target),
            _ if output != OutputDisposition::Inherit => return Err(ParseError::DuplicateOutput),
            Token::Truncate => output = OutputDisposition::Truncate(target),
            _ => output = OutputDisposition::Append(target),
        }
    }

    if argv.is_empty() {
        return Err(ParseError::EmptyStage);
    }

    Ok(Stage {
        argv,
        input,
        output,
    })
}
