//! Header include list
//!
//! Header paths are passed through from the command line. Only the final path
//! component is kept, since the generated program is compiled with the
//! library's include directory on the search path.

use tracing::debug;

/// File name fragment marking forward-declaration-only headers
pub const FORWARD_DECL_MARKER: &str = "fwd";

/// Include directives for the generated program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeList {
    includes: Vec<String>,
    excluded: Vec<String>,
}

impl IncludeList {
    /// Reduce header paths to file names, optionally dropping forward headers
    pub fn from_paths<S: AsRef<str>>(paths: &[S], exclude_forward: bool) -> Self {
        let mut list = Self::default();

        for path in paths {
            let path = path.as_ref();
            let Some(name) = file_name(path) else {
                debug!(path, "header path has no file name, skipping");
                list.excluded.push(path.to_string());
                continue;
            };

            if exclude_forward && name.contains(FORWARD_DECL_MARKER) {
                debug!(header = name, "skipping forward-declaration header");
                list.excluded.push(path.to_string());
                continue;
            }

            list.includes.push(name.to_string());
        }

        list
    }

    /// Header file names that will be included, in argument order
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Paths that were dropped
    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// `#include "name"` lines
    pub fn directives(&self) -> impl Iterator<Item = String> + '_ {
        self.includes
            .iter()
            .map(|name| format!("#include \"{}\"", name))
    }
}

/// Final component of a `/`-separated path
fn file_name(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|name| !name.is_empty())
}
