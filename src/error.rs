//! Error types for symbol test generation
//!
//! Generation itself never fails on content: unrecognized lines are skipped and
//! missing overload rules only surface when the generated program is compiled.
//! What can fail is reading inputs and loading rule files.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the generator
#[derive(Error, Debug)]
pub enum SymcheckError {
    #[error("Cannot read symbol listing '{}': {source}", path.display())]
    ListingRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read rule file '{}': {source}", path.display())]
    RulesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Rule file error: {0}")]
    RulesParse(String),

    #[error("Invalid name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for SymcheckError {
    fn from(error: serde_yaml::Error) -> Self {
        SymcheckError::RulesParse(error.to_string())
    }
}

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, SymcheckError>;
