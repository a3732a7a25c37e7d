//! Stdin-based log source for piped input.

use super::{read_records, LogKind, RecordResult};
use crate::model::error::InputError;
use std::io::{BufReader, Read};

/// Piped log input, read until EOF.
#[derive(Debug)]
pub struct StdinSource<R: Read> {
    reader: BufReader<R>,
}

impl StdinSource<std::io::Stdin> {
    /// A source reading the process's stdin.
    pub fn new() -> Self {
        Self::from_reader(std::io::stdin())
    }
}

impl Default for StdinSource<std::io::Stdin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Read> StdinSource<R> {
    /// A source reading from any reader.
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Read and parse every record until EOF.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for read errors.
    pub fn read_records(self, kind: LogKind) -> Result<Vec<RecordResult>, InputError> {
        read_records(self.reader, kind)
    }
}
