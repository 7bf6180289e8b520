use std::{io, string::FromUtf8Error};

use thiserror::Error;

/// A line of input that does not match the grammar.
///
/// `line` is the 1-based physical line on which the offending construct starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: unterminated section header")]
    UnterminatedSection { line: usize },
    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },
    #[error("line {line}: unexpected character {c:?}")]
    UnexpectedCharacter { line: usize, c: char },
    #[error("line {line}: expected '=' after key")]
    MissingSeparator { line: usize },
    #[error("line {line}: key cannot be empty")]
    EmptyKey { line: usize },
}

impl ParseError {
    #[must_use]
    pub fn line(&self) -> usize {
        match *self {
            Self::UnterminatedSection { line }
            | Self::UnterminatedString { line }
            | Self::UnexpectedCharacter { line, .. }
            | Self::MissingSeparator { line }
            | Self::EmptyKey { line } => line,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("no filename supplied")]
    NoFilename,
}

pub type Result<T> = std::result::Result<T, Error>;
