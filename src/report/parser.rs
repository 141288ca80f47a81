//! report::parser
//!
//! Parser for the indented key/value report text printed by `p4 fstat`.
//!
//! # Format
//!
//! ```text
//! ... depotFile //depot/path/foo.js
//! ... isMapped
//! ... haveRev 2
//! ... ... otherOpen0 bob@ws1
//! ... ... otherAction0 edit
//! ... ... otherOpen 1
//!
//! ... depotFile //depot/path/bar.js
//! ```
//!
//! Entries are separated by blank lines. Each `"... "` marker adds one
//! indentation level: level 1 lines are fields of the entry, level 2 lines
//! are fields of nested records keyed `other<Name><index>`, closed by an
//! `otherOpen <count>` line.
//!
//! # Invariants
//!
//! - Nested indices arrive contiguously from 0; a line may repeat the
//!   current index to add another field to the same nested record.
//! - A closing count must equal the number of nested records collected.
//! - One bad line fails the whole parse.

use thiserror::Error;

use super::record::{FieldValue, Report, ReportRecord};

/// Indentation marker repeated at the start of every report line.
const INDENT_MARKER: &str = "... ";

/// Prefix shared by every nested-record key.
const NESTED_PREFIX: &str = "other";

/// Key of the line closing a nested list with its expected length.
const NESTED_COUNT_KEY: &str = "otherOpen";

/// Errors from report parsing.
///
/// Deliberately carries no line detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The text violated the report format.
    #[error("invalid fstat output")]
    Invalid,
}

/// Parse report text into a [`Report`].
///
/// Empty input yields an empty collection. Exactly one entry yields
/// [`Report::Single`].
///
/// # Example
///
/// ```
/// use p4session::report::{parse_report, FieldValue};
///
/// let report = parse_report("... depotFile //depot/f.js\n... isMapped\n... haveRev 2").unwrap();
/// let record = report.single().unwrap();
///
/// assert_eq!(record.text("depotFile"), Some("//depot/f.js"));
/// assert_eq!(record.get("isMapped"), Some(&FieldValue::Present));
/// assert_eq!(record.text("haveRev"), Some("2"));
/// ```
pub fn parse_report(text: &str) -> Result<Report, ReportError> {
    let mut records = Vec::new();

    for (entry_no, entry) in split_entries(text).into_iter().enumerate() {
        if entry.iter().all(|line| line.trim().is_empty()) {
            continue;
        }

        let record = parse_entry(&entry).map_err(|line_no| {
            tracing::debug!(entry = entry_no, line = line_no, "rejecting report text");
            ReportError::Invalid
        })?;
        records.push(record);
    }

    Ok(Report::from_records(records))
}

/// Group lines into blank-line separated entries.
fn split_entries(text: &str) -> Vec<Vec<&str>> {
    let mut entries = Vec::new();
    let mut current = Vec::new();

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            if !current.is_empty() {
                entries.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(line);
    }
    if !current.is_empty() {
        entries.push(current);
    }

    entries
}

/// Parse one entry, returning the offending line number on failure.
fn parse_entry(lines: &[&str]) -> Result<ReportRecord, usize> {
    let mut record = ReportRecord::new();

    for (line_no, line) in lines.iter().enumerate() {
        let (level, rest) = strip_indent(line);
        let (key, value) = rest.split_once(' ').unwrap_or((rest, ""));

        if key.is_empty() {
            continue;
        }

        match level {
            1 => record.insert(key, FieldValue::from(value)),
            2 => apply_nested(&mut record, key, value).ok_or(line_no)?,
            _ => return Err(line_no),
        }
    }

    Ok(record)
}

/// Count and remove leading indentation markers.
fn strip_indent(line: &str) -> (usize, &str) {
    let mut level = 0;
    let mut rest = line;
    while let Some(stripped) = rest.strip_prefix(INDENT_MARKER) {
        level += 1;
        rest = stripped;
    }
    (level, rest)
}

/// Apply a level-2 line to the entry's nested list.
fn apply_nested(record: &mut ReportRecord, key: &str, value: &str) -> Option<()> {
    let nested = record.other_mut();

    if key == NESTED_COUNT_KEY {
        let declared: usize = value.parse().ok()?;
        return (declared == nested.len()).then_some(());
    }

    let (name, index) = split_indexed_key(key)?;
    if index == nested.len() {
        nested.push(ReportRecord::new());
    } else if nested.len().checked_sub(1) != Some(index) {
        return None;
    }

    nested.last_mut()?.insert(name, FieldValue::from(value));
    Some(())
}

/// Split `other<Name><digits>` into `(Name, index)`.
fn split_indexed_key(key: &str) -> Option<(&str, usize)> {
    let rest = key.strip_prefix(NESTED_PREFIX)?;
    let name = rest.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &rest[name.len()..];

    if name.is_empty() || digits.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some((name, digits.parse().ok()?))
}
