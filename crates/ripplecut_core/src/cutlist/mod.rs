//! Cut-list parsing.
//!
//! A cut list is CSV text with one `command,timestamp[,...]` row per line:
//!
//! ```text
//! command,time
//! X,500
//! F,1200.5
//! ```
//!
//! - `X` cuts, `F` fast-forwards
//! - the timestamp is in milliseconds, parsed in invariant format first
//!   and then with a lenient locale-style fallback
//! - the first line is a header when its second field is not a number
//!
//! Rows that cannot be used are collected as [`CutRowError`]s instead of
//! failing the whole list.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::operations::{CutListError, CutRowError, EditError, EditResult};

/// What to do at a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutCommand {
    /// `X`: split and delete the part after the timestamp.
    Cut,
    /// `F`: split and speed up the part after the timestamp.
    FastForward,
}

impl FromStr for CutCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "X" => Ok(CutCommand::Cut),
            "F" => Ok(CutCommand::FastForward),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CutCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CutCommand::Cut => write!(f, "X"),
            CutCommand::FastForward => write!(f, "F"),
        }
    }
}

/// One usable row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRow {
    /// 1-based line number in the source text.
    pub line: usize,
    pub command: CutCommand,
    pub timestamp_ms: f64,
}

/// Parsed cut list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutList {
    pub rows: Vec<CutRow>,
    /// Rows that were skipped, with the reason.
    pub rejected: Vec<CutRowError>,
    pub has_header: bool,
}

impl CutList {
    /// Parse cut-list text.
    ///
    /// Fails only when the text contains no non-blank line at all.
    pub fn parse(text: &str) -> Result<Self, CutListError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
            .peekable();

        let Some(&(_, first)) = lines.peek() else {
            return Err(CutListError::Empty);
        };

        let mut list = CutList {
            has_header: is_header(first),
            ..CutList::default()
        };
        if list.has_header {
            lines.next();
        }

        for (line_number, line) in lines {
            match parse_row(line_number, line) {
                Ok(row) => list.rows.push(row),
                Err(err) => {
                    tracing::debug!("Skipping cut-list row: {}", err);
                    list.rejected.push(err);
                }
            }
        }

        Ok(list)
    }

    /// Read and parse a cut-list file.
    pub fn from_path(path: impl AsRef<Path>) -> EditResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| EditError::io(format!("reading cut list {}", path.display()), e))?;
        Ok(Self::parse(&text)?)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A first line is a header when its second field does not parse as an
/// invariant-format number.
fn is_header(line: &str) -> bool {
    let mut fields = line.split(',');
    fields.next();
    match fields.next() {
        Some(second) => parse_invariant(second).is_none(),
        None => false,
    }
}

fn parse_row(line_number: usize, line: &str) -> Result<CutRow, CutRowError> {
    let mut fields = line.split(',').map(str::trim);
    let (Some(command), Some(timestamp)) = (fields.next(), fields.next()) else {
        return Err(CutRowError::MissingField { line: line_number });
    };

    let timestamp_ms = parse_timestamp(timestamp).ok_or_else(|| CutRowError::InvalidTimestamp {
        line: line_number,
        value: timestamp.to_string(),
    })?;

    let command = command
        .parse::<CutCommand>()
        .map_err(|_| CutRowError::UnknownCommand {
            line: line_number,
            command: command.to_string(),
        })?;

    Ok(CutRow {
        line: line_number,
        command,
        timestamp_ms,
    })
}

/// Invariant parse, then the lenient fallback.
pub fn parse_timestamp(value: &str) -> Option<f64> {
    parse_invariant(value).or_else(|| parse_lenient(value))
}

fn parse_invariant(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Accepts group separators (space, apostrophe, underscore, no-break
/// space) and a decimal comma.
fn parse_lenient(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '\'' | '_' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    parse_invariant(&cleaned)
}
