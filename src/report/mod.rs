//! report
//!
//! Structured records from `p4 fstat` report text.
//!
//! # Architecture
//!
//! This module is a pure leaf: text in, [`Report`] or [`ReportError`] out.
//! It never runs commands; verbs in [`crate::client`] pipe command output
//! through [`parse_report`] when they produce a report.
//!
//! # Example
//!
//! ```
//! use p4session::report::{parse_report, Report};
//!
//! let text = "... depotFile //depot/a.c\n\n... depotFile //depot/b.c\n";
//! match parse_report(text).unwrap() {
//!     Report::Many(records) => assert_eq!(records.len(), 2),
//!     Report::Single(_) => unreachable!(),
//! }
//! ```

mod parser;
mod record;

pub use parser::{parse_report, ReportError};
pub use record::{FieldValue, Report, ReportRecord, OTHER_FIELD};
