//! Build-error log
//!
//! The output of the most recent failed build is kept in a single plain-text
//! file under the tmp directory. The supervisor appends to it while a build
//! fails and clears it once a build succeeds.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildErrorLog {
    path: PathBuf,
}

impl BuildErrorLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Log at `<tmp_path>/<build_log_name>`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.build_errors_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the log or append to it. Returns `false` on any I/O failure.
    pub fn append(&self, message: &str) -> bool {
        match self.try_append(message) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("Failed to write build log {}: {}", self.path.display(), err);
                false
            }
        }
    }

    fn try_append(&self, message: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(message.as_bytes())
    }

    /// Remove the log. A log that is already gone is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }

    pub fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }
}
