//! Core library for editing `Collecting_*` probability tables.
//! Parses the enchant/item/premium sections of a collector resource file,
//! checks their totals and writes edits back without disturbing the rest of
//! the file.

mod document;
mod edit;
mod parse;
mod section;
mod serialize;
mod session;
pub mod statics;
mod table;
mod validate;

pub use document::{CollectorDocument, LineEnding, SourceEncoding};
pub use edit::{Edit, EntryRef, Redistribution, apply_edit, redistribute};
pub use parse::{ParsedCollector, parse_collector, parse_collector_strict};
pub use section::{SectionLayout, SectionMatch, SectionSpan, find_section, locate_sections};
pub use serialize::{SectionOutcome, SerializeOutcome, serialize, serialize_with_report};
pub use session::{EditSession, HistoryEntry};
pub use table::{Category, CollectorTable, EnchantEntry, ProbabilityEntry, Weighted};
pub use validate::{CollectionCheck, ValidationResult, validate};

use thiserror::Error;

/// A data line in a section body that could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{section}, line {line}: {kind}: `{text}`")]
pub struct FormatError {
    pub section: Category,
    /// 1-based line number in the whole file.
    pub line: usize,
    pub text: String,
    pub kind: FormatErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatErrorKind {
    #[error("missing numeric value")]
    MissingValue,
    #[error("`{0}` is not a non-negative integer")]
    InvalidInteger(String),
}

/// Error writing a table back into its original text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("{0} has entries but the file has no such section; add the section skeleton first")]
    MissingSection(Category),
    #[error("{0} has a malformed line; fix it in the file before editing this section")]
    MalformedSection(Category),
}

/// Why an edit was rejected. The table is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("editing is disabled")]
    EditingDisabled,
    #[error("{category}: index {index} out of range (len {len})")]
    IndexOutOfRange {
        category: Category,
        index: usize,
        len: usize,
    },
    #[error("item id must not be empty")]
    EmptyItemId,
    #[error("invalid item id `{0}` (needs the II_ prefix and no whitespace or comments)")]
    InvalidItemId(String),
    #[error("{0} holds enchant levels, not items")]
    NotAnItemCollection(Category),
    #[error("{category}: no entry with item id `{item_id}`")]
    UnknownItemId { category: Category, item_id: String },
}
