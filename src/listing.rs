//! Symbol listing input
//!
//! The listing is an externally produced text file naming one qualified symbol
//! per line. Lines are kept verbatim and in order; interpretation happens in
//! [`crate::classify`].

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SymcheckError};

/// An ordered sequence of raw listing lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolListing {
    lines: Vec<String>,
    origin: Option<PathBuf>,
}

impl SymbolListing {
    /// Load a listing from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SymcheckError::ListingRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut listing = Self::from_text(&content);
        listing.origin = Some(path.to_path_buf());
        debug!(
            path = %path.display(),
            lines = listing.len(),
            "loaded symbol listing"
        );
        Ok(listing)
    }

    /// Build a listing from in-memory text
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
            origin: None,
        }
    }

    /// Build a listing from individual lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            origin: None,
        }
    }

    /// Lines with their 1-based line numbers
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str)> {
        self.lines.iter().enumerate().map(|(i, l)| (i + 1, l.as_str()))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// File the listing was read from, if any
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}
