//! Error type shared by the tokenizer and compilation engine.

use std::fmt;

#[derive(Debug)]
pub enum JackError {
    Io(std::io::Error),
    /// A `"` was opened but never closed on its line.
    UnterminatedString { line: usize },
    /// A token that is not in the predefined keyword/symbol tables could not
    /// be classified at the current scan position.
    UnrecognizedToken { line: usize, position: usize },
    /// The parser expected a specific token and found something else.
    UnexpectedToken { expected: String, found: String },
    /// A production ran out of tokens before it could close.
    UnexpectedEndOfInput { while_compiling: String },
}

impl std::error::Error for JackError {}

impl fmt::Display for JackError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnterminatedString { line } => {
                write!(f, "unterminated string constant on line {line}")
            }
            Self::UnrecognizedToken { line, position } => {
                write!(f, "unrecognized token at line {line}, position {position}")
            }
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::UnexpectedEndOfInput { while_compiling } => {
                write!(f, "unexpected end of input while compiling {while_compiling}")
            }
        }
    }
}

impl From<std::io::Error> for JackError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error)
    }
}
