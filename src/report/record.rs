//! report::record
//!
//! Typed records produced from `p4 fstat` report text.
//!
//! # Types
//!
//! - [`FieldValue`] - A field's literal text, or a bare flag
//! - [`ReportRecord`] - One entry of a report, with optional nested records
//! - [`Report`] - One record, or an ordered collection of records
//!
//! # Serialization
//!
//! Records serialize to the JSON shape callers of the command-line client
//! expect: text fields become strings, flags become `true`, and nested
//! records appear under `"other"`.
//!
//! ```
//! use p4session::report::parse_report;
//!
//! let report = parse_report("... depotFile //depot/f.js\n... isMapped").unwrap();
//! let json = serde_json::to_value(&report).unwrap();
//! assert_eq!(json["isMapped"], serde_json::json!(true));
//! ```

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// The field name nested records are stored under.
pub const OTHER_FIELD: &str = "other";

/// Value of a single report field.
///
/// Values are never coerced: `headRev 2` stays the string `"2"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// The literal text following the key.
    Text(String),
    /// The key appeared with nothing after it.
    Present,
}

impl FieldValue {
    /// Get the text value, if this field carried one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Present => None,
        }
    }

    /// Check if this field is a bare flag.
    pub fn is_present_flag(&self) -> bool {
        matches!(self, FieldValue::Present)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            FieldValue::Present
        } else {
            FieldValue::Text(value.to_string())
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Present => serializer.serialize_bool(true),
        }
    }
}

/// One entry of a report.
///
/// Top-level fields are keyed by name. Second-level lines populate
/// [`other`](ReportRecord::other), an ordered list of nested records
/// (e.g. other users' opens of the same file).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportRecord {
    fields: BTreeMap<String, FieldValue>,
    other: Option<Vec<ReportRecord>>,
}

impl ReportRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field by name.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get a field's text value by name.
    ///
    /// Returns `None` for missing fields and for bare flags.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// Check if a field is present at all (flag or text).
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Iterate over top-level fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level fields, not counting `other`.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields and no nested list.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.other.is_none()
    }

    /// Nested records, if any second-level line was seen.
    pub fn other(&self) -> Option<&[ReportRecord]> {
        self.other.as_deref()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Get the nested list, creating it empty on first use.
    pub(crate) fn other_mut(&mut self) -> &mut Vec<ReportRecord> {
        self.other.get_or_insert_with(Vec::new)
    }
}

impl Serialize for ReportRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let shadowed = self.other.is_some() && self.fields.contains_key(OTHER_FIELD);
        let len = self.fields.len() + usize::from(self.other.is_some()) - usize::from(shadowed);
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in &self.fields {
            if self.other.is_some() && key == OTHER_FIELD {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        if let Some(other) = &self.other {
            map.serialize_entry(OTHER_FIELD, other)?;
        }
        map.end()
    }
}

/// Result of parsing a report.
///
/// A report describing exactly one entry collapses to [`Report::Single`];
/// anything else (including nothing) is [`Report::Many`] in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// Exactly one entry.
    Single(ReportRecord),
    /// Zero or several entries, in the order they appeared.
    Many(Vec<ReportRecord>),
}

impl Report {
    /// Build a report from parsed records, collapsing a single record.
    pub fn from_records(mut records: Vec<ReportRecord>) -> Self {
        if records.len() == 1 {
            if let Some(record) = records.pop() {
                return Report::Single(record);
            }
        }
        Report::Many(records)
    }

    /// Get the record if this report holds exactly one.
    pub fn single(&self) -> Option<&ReportRecord> {
        match self {
            Report::Single(record) => Some(record),
            Report::Many(_) => None,
        }
    }

    /// Number of records in the report.
    pub fn len(&self) -> usize {
        match self {
            Report::Single(_) => 1,
            Report::Many(records) => records.len(),
        }
    }

    /// Check if the report holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all records in order.
    pub fn records(&self) -> std::slice::Iter<'_, ReportRecord> {
        match self {
            Report::Single(record) => std::slice::from_ref(record).iter(),
            Report::Many(records) => records.iter(),
        }
    }

    /// Flatten into an ordered list of records.
    pub fn into_records(self) -> Vec<ReportRecord> {
        match self {
            Report::Single(record) => vec![record],
            Report::Many(records) => records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod field_value {
        use super::*;

        #[test]
        fn empty_str_is_present_flag() {
            assert_eq!(FieldValue::from(""), FieldValue::Present);
            assert!(FieldValue::from("").is_present_flag());
        }

        #[test]
        fn text_is_not_coerced() {
            let value = FieldValue::from("2");
            assert_eq!(value.as_text(), Some("2"));
            assert_eq!(serde_json::to_value(&value).unwrap(), json!("2"));
        }

        #[test]
        fn flag_serializes_as_true() {
            assert_eq!(
                serde_json::to_value(FieldValue::Present).unwrap(),
                json!(true)
            );
        }
    }

    mod report_record {
        use super::*;

        #[test]
        fn text_skips_flags() {
            let mut record = ReportRecord::new();
            record.insert("isMapped", FieldValue::Present);
            record.insert("haveRev", FieldValue::from("3"));

            assert!(record.contains("isMapped"));
            assert_eq!(record.text("isMapped"), None);
            assert_eq!(record.text("haveRev"), Some("3"));
            assert_eq!(record.len(), 2);
        }

        #[test]
        fn fields_iterate_in_key_order() {
            let mut record = ReportRecord::new();
            record.insert("headRev", FieldValue::from("4"));
            record.insert("depotFile", FieldValue::from("//a"));
            record.insert("isMapped", FieldValue::Present);

            let keys: Vec<_> = record.fields().map(|(k, _)| k).collect();
            assert_eq!(keys, vec!["depotFile", "headRev", "isMapped"]);
            assert_eq!(
                record.fields().find(|(k, _)| *k == "isMapped").map(|(_, v)| v),
                Some(&FieldValue::Present)
            );
        }

        #[test]
        fn serializes_nested_under_other() {
            let mut nested = ReportRecord::new();
            nested.insert("Open", FieldValue::from("bob@ws"));

            let mut record = ReportRecord::new();
            record.insert("depotFile", FieldValue::from("//depot/a"));
            record.other_mut().push(nested);

            assert_eq!(
                serde_json::to_value(&record).unwrap(),
                json!({"depotFile": "//depot/a", "other": [{"Open": "bob@ws"}]})
            );
        }

        #[test]
        fn empty_other_still_serialized() {
            let mut record = ReportRecord::new();
            record.other_mut();
            assert!(!record.is_empty());
            assert_eq!(serde_json::to_value(&record).unwrap(), json!({"other": []}));
        }
    }

    mod report {
        use super::*;

        #[test]
        fn one_record_collapses() {
            let report = Report::from_records(vec![ReportRecord::new()]);
            assert!(matches!(report, Report::Single(_)));
            assert_eq!(report.len(), 1);
        }

        #[test]
        fn zero_records_is_empty_collection() {
            let report = Report::from_records(Vec::new());
            assert_eq!(report, Report::Many(Vec::new()));
            assert!(report.is_empty());
            assert_eq!(serde_json::to_value(&report).unwrap(), json!([]));
        }

        #[test]
        fn records_iterates_in_order() {
            let mut a = ReportRecord::new();
            a.insert("depotFile", FieldValue::from("//a"));
            let mut b = ReportRecord::new();
            b.insert("depotFile", FieldValue::from("//b"));

            let report = Report::from_records(vec![a, b]);
            let files: Vec<_> = report
                .records()
                .filter_map(|r| r.text("depotFile"))
                .collect();
            assert_eq!(files, vec!["//a", "//b"]);
            assert!(report.single().is_none());
        }

        #[test]
        fn into_records_flattens_both_shapes() {
            let mut a = ReportRecord::new();
            a.insert("depotFile", FieldValue::from("//a"));

            let single = Report::from_records(vec![a.clone()]);
            assert_eq!(single.into_records(), vec![a.clone()]);

            let many = Report::from_records(vec![a.clone(), ReportRecord::new()]);
            let records = many.into_records();
            assert_eq!(records.len(), 2);
            assert_eq!(records[0], a);
        }
    }
}
