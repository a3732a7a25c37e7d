//! File-based log source.

use super::{read_records, LogKind, RecordResult};
use crate::model::error::InputError;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A log file, read once from start to end.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    file: File,
}

impl FileSource {
    /// Open the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        debug!(path = %path.display(), "opened log file");

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Path of the file being read.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse every record in the file.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for read errors.
    pub fn read_records(self, kind: LogKind) -> Result<Vec<RecordResult>, InputError> {
        read_records(BufReader::new(self.file), kind)
    }
}
