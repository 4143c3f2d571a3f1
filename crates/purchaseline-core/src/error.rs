//! Error types for reading, creating and appending to the purchases table

use std::path::PathBuf;

/// Storage backend rejected a batch.
///
/// The whole batch is rolled back; the loader reports it and moves on.
#[derive(Debug)]
pub enum SinkError {
    /// Unique / primary key / not-null constraint violated
    Constraint(String),
    /// A row's date could not be interpreted as a calendar date
    InvalidDate { row: usize, value: String },
    /// Backend refused a value (failed cast, out of range)
    InvalidValue(String),
    /// I/O, connection or any other backend failure
    Storage(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constraint(msg) => write!(f, "constraint violation: {msg}"),
            Self::InvalidDate { row, value } => {
                write!(f, "row {row}: unrecognized date {value:?}")
            }
            Self::InvalidValue(msg) => write!(f, "invalid value: {msg}"),
            Self::Storage(msg) => write!(f, "storage: {msg}"),
        }
    }
}

impl std::error::Error for SinkError {}

impl SinkError {
    /// Whether the same batch could succeed if attempted again.
    ///
    /// Everything but backend failures depends only on the rows, so retrying
    /// the same batch cannot help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Malformed source file.
#[derive(Debug)]
pub enum ParseError {
    Io { path: PathBuf, source: std::io::Error },
    /// Reader-level failure (bad quoting, unequal row lengths, invalid UTF-8)
    Csv(csv::Error),
    /// Row does not have exactly `date, price, user_id`
    Columns { line: u64, found: usize },
    /// Field is not an integer
    Field {
        line: u64,
        column: &'static str,
        value: String,
    },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "IO: {}: {source}", path.display()),
            Self::Csv(e) => write!(f, "CSV: {e}"),
            Self::Columns { line, found } => {
                write!(f, "line {line}: expected 3 columns, found {found}")
            }
            Self::Field {
                line,
                column,
                value,
            } => write!(f, "line {line}: {column} is not an integer: {value:?}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for ParseError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e)
    }
}

/// Target table could not be created. Fatal for the run.
#[derive(Debug)]
pub struct SchemaError(pub String);

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema: {}", self.0)
    }
}

impl std::error::Error for SchemaError {}
