//! Quoted-token line tokenizer for server log records.
//!
//! This module provides pure functions for splitting one physical log line into its
//! timestamp prefix, bare ("unnamed") tokens and `name=value` pairs. Two line shapes are
//! understood:
//!
//! - access and error log lines: `[timestamp] TOKEN name=value name="quoted value"`,
//!   whitespace delimited;
//! - audit record headers: `# timestamp; name=value; name="quoted value"`,
//!   semicolon delimited.
//!
//! Unknown field names are never an error. Every element keeps the exact text that
//! preceded it and its own exact text, so [`LogLine::format`] reproduces the input.

use crate::model::error::ParseError;
use crate::model::line::{ElementKind, LogElement, LogLine};
use crate::model::timestamp::Timestamp;
use tracing::trace;

/// Prefix of every audit record header line.
pub const AUDIT_HEADER_PREFIX: &str = "# ";

// Longest slice of a line echoed back in a MalformedTimestamp error.
const ERROR_CONTEXT_CHARS: usize = 40;

/// How elements of a line are separated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// Runs of whitespace (access and error logs).
    Whitespace,
    /// `;` surrounded by optional whitespace (audit record headers).
    Semicolon,
}

impl Delimiter {
    fn ends_token(self, c: char) -> bool {
        match self {
            Delimiter::Whitespace => c.is_whitespace(),
            Delimiter::Semicolon => c == ';',
        }
    }
}

/// Tokenize a `[timestamp] ...` access or error log line.
///
/// # Errors
///
/// Returns `ParseError::MalformedTimestamp` if the line does not start with a bracketed,
/// terminated, valid timestamp, and `ParseError::UnterminatedQuote` if a quoted value is
/// never closed.
pub fn tokenize(line: &str) -> Result<LogLine, ParseError> {
    let Some(after_open) = line.strip_prefix('[') else {
        return Err(malformed_prefix(line));
    };
    let Some(close) = after_open.find(']') else {
        return Err(malformed_prefix(line));
    };

    let timestamp = Timestamp::parse(&after_open[..close])?;
    let prefix_len = close + 2;
    let (elements, trailing) = split_elements(&line[prefix_len..], prefix_len, Delimiter::Whitespace)?;

    trace!(elements = elements.len(), "tokenized log line");
    Ok(LogLine::new(&line[..prefix_len], timestamp, elements, trailing))
}

/// Tokenize a `# timestamp; name=value; ...` audit record header line.
///
/// # Errors
///
/// Returns `ParseError::MissingAuditHeader` if the line does not start with `"# "`,
/// `ParseError::MalformedTimestamp` if the text up to the first `;` is not a timestamp,
/// and `ParseError::UnterminatedQuote` if a quoted value is never closed.
pub fn tokenize_audit_header(line: &str) -> Result<LogLine, ParseError> {
    let Some(rest) = line.strip_prefix(AUDIT_HEADER_PREFIX) else {
        return Err(ParseError::MissingAuditHeader {
            line: line.to_string(),
        });
    };

    let end = rest.find(';').unwrap_or(rest.len());
    let body = rest[..end].trim_end();
    let timestamp = Timestamp::parse(body)?;
    let prefix_len = AUDIT_HEADER_PREFIX.len() + body.len();
    let (elements, trailing) = split_elements(&line[prefix_len..], prefix_len, Delimiter::Semicolon)?;

    trace!(elements = elements.len(), "tokenized audit header");
    Ok(LogLine::new(&line[..prefix_len], timestamp, elements, trailing))
}

/// Split `value` on `separator` wherever it occurs outside double quotes.
///
/// No whitespace is trimmed and quotes are kept: the pieces are exact substrings.
pub fn split_outside_quotes(value: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if in_quotes {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quotes = false;
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == separator {
            parts.push(value[start..i].to_string());
            start = i + c.len_utf8();
        }
    }
    parts.push(value[start..].to_string());
    parts
}

/// Resolve backslash escapes in the body of a quoted value.
///
/// `\n`, `\r` and `\t` become control characters; any other escaped character stands
/// for itself. A trailing lone backslash is kept.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn malformed_prefix(line: &str) -> ParseError {
    ParseError::MalformedTimestamp {
        raw: line.chars().take(ERROR_CONTEXT_CHARS).collect(),
    }
}

fn split_elements(
    text: &str,
    offset: usize,
    delimiter: Delimiter,
) -> Result<(Vec<LogElement>, String), ParseError> {
    let mut elements = Vec::new();
    let mut pos = 0;

    loop {
        let separator_start = pos;
        pos = skip_separator(text, pos, delimiter);
        if pos >= text.len() {
            return Ok((elements, text[separator_start..].to_string()));
        }

        let end = scan_token(text, pos, delimiter).ok_or(ParseError::UnterminatedQuote {
            position: offset + pos,
        })?;
        let raw = &text[pos..end];
        elements.push(LogElement::new(&text[separator_start..pos], raw, classify(raw)));
        pos = end;
    }
}

fn skip_separator(text: &str, pos: usize, delimiter: Delimiter) -> usize {
    let skip_whitespace =
        |from: usize| text[from..].find(|c: char| !c.is_whitespace()).map_or(text.len(), |i| from + i);

    let mut pos = skip_whitespace(pos);
    if delimiter == Delimiter::Semicolon {
        while text[pos..].starts_with(';') {
            pos = skip_whitespace(pos + 1);
        }
    }
    pos
}

// Returns the end of the token starting at `start`, or None for an unterminated quote.
fn scan_token(text: &str, start: usize, delimiter: Delimiter) -> Option<usize> {
    let rest = &text[start..];

    let quote_at = if rest.starts_with('"') {
        Some(0)
    } else {
        match rest.find(|c: char| c == '=' || delimiter.ends_token(c)) {
            Some(i) if rest[i..].starts_with("=\"") => Some(i + 1),
            _ => None,
        }
    };

    let after_quote = match quote_at {
        Some(q) => start + q + 1 + closing_quote(&rest[q + 1..])? + 1,
        None => start,
    };

    let end = text[after_quote..]
        .find(|c: char| delimiter.ends_token(c))
        .map_or(text.len(), |i| after_quote + i);

    match delimiter {
        Delimiter::Whitespace => Some(end),
        Delimiter::Semicolon => Some(start + text[start..end].trim_end().len()),
    }
}

// Byte offset of the unescaped closing quote within a quoted body.
fn closing_quote(body: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            return Some(i);
        }
    }
    None
}

fn classify(raw: &str) -> ElementKind {
    if raw.starts_with('"') {
        return ElementKind::Unnamed { value: unquote(raw) };
    }

    match raw.find('=') {
        Some(eq) if eq > 0 => {
            let name = raw[..eq].to_string();
            let value_raw = &raw[eq + 1..];
            if value_raw.starts_with('"') {
                ElementKind::Named {
                    name,
                    value: unquote(value_raw),
                    quoted: true,
                }
            } else {
                ElementKind::Named {
                    name,
                    value: value_raw.to_string(),
                    quoted: false,
                }
            }
        }
        _ => ElementKind::Unnamed {
            value: raw.to_string(),
        },
    }
}

// `quoted` starts with '"'; text after the closing quote is appended verbatim.
fn unquote(quoted: &str) -> String {
    let body = &quoted[1..];
    match closing_quote(body) {
        Some(close) => {
            let mut value = unescape(&body[..close]);
            value.push_str(&body[close + 1..]);
            value
        }
        None => unescape(body),
    }
}
