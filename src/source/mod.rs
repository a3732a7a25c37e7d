//! Log input sources.
//!
//! Reads access, error or audit logs from a file or stdin:
//! - Access and error logs hold one record per line; blank lines are skipped
//! - Audit logs hold multi-line records separated by blank lines
//!
//! Reading is graceful: each record yields its own `Result`, so one bad record does not
//! stop the rest from being read.

use crate::model::error::{InputError, ParseError};
use crate::syntax::registry::FieldRegistry;
use crate::model::{AccessLogMessage, AuditLogMessage, ErrorLogMessage, LogMessage, MalformedRecord};
use std::io::BufRead;
use std::path::PathBuf;
use tracing::debug;

pub mod file;
pub mod stdin;

pub use file::FileSource;
pub use stdin::StdinSource;

/// Which log format a source holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum LogKind {
    /// Access log, one record per line.
    #[default]
    Access,
    /// Error log, one record per line.
    Error,
    /// Audit log, blank-line separated multi-line records.
    Audit,
}

/// A successfully parsed record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    /// Access log record.
    Access(AccessLogMessage),
    /// Error log record.
    Error(ErrorLogMessage),
    /// Audit log record.
    Audit(AuditLogMessage),
}

impl ParsedRecord {
    /// The message carrying the record's typed fields (the header, for audit records).
    pub fn message(&self) -> &LogMessage {
        match self {
            ParsedRecord::Access(m) => m.message(),
            ParsedRecord::Error(m) => m.message(),
            ParsedRecord::Audit(m) => m.header(),
        }
    }

    /// The exact source text of the record.
    pub fn format(&self) -> String {
        match self {
            ParsedRecord::Access(m) => m.format(),
            ParsedRecord::Error(m) => m.format(),
            ParsedRecord::Audit(m) => m.format(),
        }
    }

    /// The record's message as a JSON object, values sanitized through `registry`.
    ///
    /// For audit records this covers the header fields.
    pub fn to_json(&self, registry: &FieldRegistry) -> String {
        self.message().to_json(registry)
    }
}

/// Outcome of parsing one record.
pub type RecordResult = Result<ParsedRecord, MalformedRecord>;

/// Parse a single-line record or a multi-line audit record.
pub fn parse_record(kind: LogKind, line_number: usize, text: &str) -> RecordResult {
    let parsed = match kind {
        LogKind::Access => AccessLogMessage::parse(text).map(ParsedRecord::Access),
        LogKind::Error => ErrorLogMessage::parse(text).map(ParsedRecord::Error),
        LogKind::Audit => AuditLogMessage::parse(text).map(ParsedRecord::Audit),
    };
    parsed.map_err(|error| {
        debug!(line_number, %error, "failed to parse record");
        MalformedRecord::new(line_number, text, error)
    })
}

/// Read and parse every record from `reader`.
///
/// # Errors
///
/// Returns `InputError::Io` if reading fails. Parse failures are not errors here; they
/// are returned as `Err(MalformedRecord)` entries.
pub fn read_records<R: BufRead>(mut reader: R, kind: LogKind) -> Result<Vec<RecordResult>, InputError> {
    let mut records = Vec::new();
    let mut pending = PendingRecord::default();
    let mut buffer = Vec::new();
    let mut line_number = 0;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        line_number += 1;
        let line = decode_line(&buffer);

        if line.as_ref().is_ok_and(|l| l.trim().is_empty()) {
            if let Some(record) = pending.take(kind) {
                records.push(record);
            }
            continue;
        }

        match (kind, line) {
            (LogKind::Access | LogKind::Error, Ok(line)) => {
                records.push(parse_record(kind, line_number, &line));
            }
            (LogKind::Access | LogKind::Error, Err((lossy, error))) => {
                debug!(line_number, %error, "failed to decode line");
                records.push(Err(MalformedRecord::new(line_number, lossy, error)));
            }
            (LogKind::Audit, line) => pending.push(line_number, line),
        }
    }

    if let Some(record) = pending.take(kind) {
        records.push(record);
    }

    debug!(count = records.len(), ?kind, "read records");
    Ok(records)
}

type DecodedLine = Result<String, (String, ParseError)>;

// One line without its terminator. Invalid UTF-8 yields the lossy text and the error.
fn decode_line(bytes: &[u8]) -> DecodedLine {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    std::str::from_utf8(bytes).map(str::to_string).map_err(|e| {
        (
            String::from_utf8_lossy(bytes).into_owned(),
            ParseError::InvalidUtf8 {
                position: e.valid_up_to(),
            },
        )
    })
}

// Lines of the audit record being collected. The first undecodable line makes the whole
// record malformed.
#[derive(Default)]
struct PendingRecord {
    start: usize,
    lines: Vec<String>,
    error: Option<ParseError>,
}

impl PendingRecord {
    fn push(&mut self, line_number: usize, line: DecodedLine) {
        if self.lines.is_empty() {
            self.start = line_number;
        }
        match line {
            Ok(line) => self.lines.push(line),
            Err((lossy, error)) => {
                self.lines.push(lossy);
                self.error.get_or_insert(error);
            }
        }
    }

    fn take(&mut self, kind: LogKind) -> Option<RecordResult> {
        if self.lines.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.lines).join("\n");
        Some(match self.error.take() {
            Some(error) => {
                debug!(line_number = self.start, %error, "failed to decode record");
                Err(MalformedRecord::new(self.start, text, error))
            }
            None => parse_record(kind, self.start, &text),
        })
    }
}

/// Unified input source for log data.
#[derive(Debug)]
pub enum InputSource {
    /// File source.
    File(FileSource),
    /// Stdin source.
    Stdin(StdinSource<std::io::Stdin>),
}

impl InputSource {
    /// Read and parse every record.
    ///
    /// # Errors
    ///
    /// Returns `InputError` for I/O errors.
    pub fn read_records(self, kind: LogKind) -> Result<Vec<RecordResult>, InputError> {
        match self {
            InputSource::File(f) => f.read_records(kind),
            InputSource::Stdin(s) => s.read_records(kind),
        }
    }
}

/// Create the input source for an optional file path.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` if the file does not exist.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(FileSource::new(path)?)),
        None => Ok(InputSource::Stdin(StdinSource::new())),
    }
}
