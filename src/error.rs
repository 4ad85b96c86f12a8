use std::path::PathBuf;
use thiserror::Error;

use crate::view::ViewError;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Config directory not found at {0}. Run 'tally init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Source '{kind}' needs a '{field}' setting in [source]")]
    SourceMisconfigured { kind: String, field: &'static str },

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("A {days}-day period ending {day} starts before the earliest supported date")]
    InvalidPeriod { days: u32, day: chrono::NaiveDate },

    #[error("Invalid {what} '{value}'. Use one of: {expected}")]
    InvalidChoice {
        what: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterParseError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Could not load records: {0}")]
    Refresh(ViewError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a record source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Not signed in: no session for tenant '{0}'")]
    Unavailable(String),

    #[error("Failed to load records: {0}")]
    Retrieval(String),
}

impl SourceError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SourceError::Unavailable(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterParseError {
    #[error("condition cannot be empty")]
    Empty,

    #[error("missing comparison operator in '{0}'")]
    MissingOperator(String),

    #[error("missing field name in '{0}'")]
    MissingField(String),

    #[error("missing value in '{0}'")]
    MissingValue(String),

    #[error("operator '{op}' needs a number, got '{value}'")]
    NotANumber { op: String, value: String },
}

pub type Result<T> = std::result::Result<T, TallyError>;
