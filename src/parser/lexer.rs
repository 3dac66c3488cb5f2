// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipeflow contributors

//! Tokenizer for shell input lines

use std::iter::Peekable;
use std::str::Chars;

use super::ParseError;

/// A lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word, with quotes removed
    Word(String),
    /// `|`
    Pipe,
    /// `<`
    Input,
    /// `>`
    Truncate,
    /// `>>`
    Append,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word(word) => write!(f, "{}", word),
            Self::Pipe => write!(f, "|"),
            Self::Input => write!(f, "<"),
            Self::Truncate => write!(f, ">"),
            Self::Append => write!(f, ">>"),
        }
    }
}

/// Split a line into tokens
///
/// Operators need no surrounding whitespace. Quotes group characters into
/// a single word; a backslash outside single quotes escapes the next
/// character.
pub fn tokenize(line: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        chars: line.chars().peekable(),
        tokens: Vec::new(),
        word: String::new(),
        in_word: false,
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    word: String,
    // Set by quotes too, so `""` still yields an (empty) word
    in_word: bool,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.chars.next() {
            match c {
                c if c.is_whitespace() => self.flush(),
                '|' => self.operator(Token::Pipe),
                '<' => self.operator(Token::Input),
                '>' => {
                    if self.chars.next_if_eq(&'>').is_some() {
                        self.operator(Token::Append);
                    } else {
                        self.operator(Token::Truncate);
                    }
                }
                '\'' => self.single_quoted()?,
                '"' => self.double_quoted()?,
                '\\' => {
                    self.in_word = true;
                    if let Some(escaped) = self.chars.next() {
                        self.word.push(escaped);
                    }
                }
                c => {
                    self.in_word = true;
                    self.word.push(c);
                }
            }
        }
        self.flush();
        Ok(())
    }

    fn flush(&mut self) {
        if self.in_word {
            self.tokens.push(Token::Word(std::mem::take(&mut self.word)));
            self.in_word = false;
        }
    }

    fn operator(&mut self, token: Token) {
        self.flush();
        self.tokens.push(token);
    }

    fn single_quoted(&mut self) -> Result<(), ParseError> {
        self.in_word = true;
        loop {
            match self.chars.next() {
                Some('\'') => return Ok(()),
                Some(c) => self.word.push(c),
                None => return Err(ParseError::UnterminatedQuote { quote: '\'' }),
            }
        }
    }

    fn double_quoted(&mut self) -> Result<(), ParseError> {
        self.in_word = true;
        loop {
            match self.chars.next() {
                Some('"') => return Ok(()),
                Some('\\') => match self.chars.next_if(|c| matches!(c, '"' | '\\')) {
                    Some(escaped) => self.word.push(escaped),
                    None => self.word.push('\\'),
                },
                Some(c) => self.word.push(c),
                None => return Err(ParseError::UnterminatedQuote { quote: '"' }),
            }
        }
    }
}
