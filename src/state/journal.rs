//! Append-only reflection log.
//!
//! Each entry is the context line, a `Reflection:` line and a blank
//! separator. Existing content is never rewritten.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ReflectionError;

/// Flat text file collecting student reflections
#[derive(Debug, Clone)]
pub struct ReflectionLog {
    path: PathBuf,
}

impl ReflectionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one reflection entry.
    ///
    /// The entry is written with a single `write_all` and the file handle
    /// is dropped before returning.
    pub fn append(&self, context: &str, reflection: &str) -> Result<(), ReflectionError> {
        let entry = format_entry(context, reflection);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| ReflectionError::Open {
                path: self.path.clone(),
                source,
            })?;

        file.write_all(entry.as_bytes())
            .map_err(|source| ReflectionError::Write {
                path: self.path.clone(),
                source,
            })?;

        info!("Saved reflection to {}", self.path.display());
        Ok(())
    }
}

fn format_entry(context: &str, reflection: &str) -> String {
    format!("{}\nReflection: {}\n\n", context, reflection)
}
