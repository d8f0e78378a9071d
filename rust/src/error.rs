//! Error kinds returned while decoding the account databases.
// SPDX-License-Identifier: Apache-2.0 OR MIT

use camino::Utf8PathBuf;
use thiserror::Error;

/// A single line could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected at least {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid {field} {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum Error {
    /// The OS message is part of the display so callers can match on it.
    #[error("{path}: {err}")]
    Io {
        path: Utf8PathBuf,
        err: std::io::Error,
    },
    #[error("failed to read {db} entry at line {line}: {err}")]
    Read {
        db: &'static str,
        line: usize,
        err: std::io::Error,
    },
    #[error("failed to parse {db} entry at line {line}: {err}")]
    Format {
        db: &'static str,
        line: usize,
        err: ParseError,
    },
    #[error("user '{0}' not found in the shadow database")]
    NotFound(String),
    #[error("{0} is a required parameter")]
    Validation(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}
