//! Writes a table back into the text it was parsed from.
//!
//! Only the bodies of sections whose entries changed are re-rendered; every
//! other byte of the original text is copied through unchanged.

use crate::SerializeError;
use crate::document::detect_line_ending;
use crate::parse::{ParsedCollector, parse_collector};
use crate::section::SectionSpan;
use crate::statics;
use crate::table::{Category, CollectorTable, EnchantEntry, ProbabilityEntry};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::debug;

/// What happened to one section when a table was written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionOutcome {
    /// Entries unchanged; original body kept byte-for-byte.
    Preserved,
    /// Body re-rendered from the table.
    Rewritten,
    /// Section not present in the original text and nothing to write.
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOutcome {
    pub text: String,
    pub sections: IndexMap<Category, SectionOutcome>,
}

impl SerializeOutcome {
    pub fn changed(&self) -> bool {
        self.sections
            .values()
            .any(|o| *o == SectionOutcome::Rewritten)
    }
}

/// Serialize `table` into `original`, returning the new file text.
pub fn serialize(table: &CollectorTable, original: &str) -> Result<String, SerializeError> {
    serialize_with_report(table, original).map(|outcome| outcome.text)
}

pub fn serialize_with_report(
    table: &CollectorTable,
    original: &str,
) -> Result<SerializeOutcome, SerializeError> {
    let baseline = parse_collector(original);
    serialize_against(table, original, &baseline)
}

/// Serialize using an already parsed `baseline` of `original`, which decides
/// which sections count as edited.
pub fn serialize_against(
    table: &CollectorTable,
    original: &str,
    baseline: &ParsedCollector,
) -> Result<SerializeOutcome, SerializeError> {
    let newline = detect_line_ending(original.as_bytes()).as_str();
    let mut sections = IndexMap::new();
    let mut rewrites: Vec<(Category, SectionSpan)> = Vec::new();

    for category in Category::ALL {
        let edited = !table.same_collection(&baseline.table, category);
        let outcome = match baseline.layout.get(category) {
            None if table.is_empty(category) => SectionOutcome::Absent,
            None => return Err(SerializeError::MissingSection(category)),
            Some(_) if !edited => SectionOutcome::Preserved,
            // Its collection was loaded empty; rendering it would drop the
            // lines that did parse.
            Some(_) if baseline.is_malformed(category) => {
                return Err(SerializeError::MalformedSection(category));
            }
            Some(span) => {
                rewrites.push((category, span));
                SectionOutcome::Rewritten
            }
        };
        sections.insert(category, outcome);
    }

    rewrites.sort_by_key(|(_, span)| span.body_start);

    let mut out = String::with_capacity(original.len());
    let mut cursor = 0;
    for (category, span) in &rewrites {
        out.push_str(&original[cursor..span.body_start]);
        render_body(&mut out, table, *category, span.body(original), newline);
        cursor = span.body_end;
        debug!(section = %category, entries = table.len(*category), "rewrote section");
    }
    out.push_str(&original[cursor..]);

    Ok(SerializeOutcome {
        text: out,
        sections,
    })
}

/// Render a replacement body: a leading newline, the original pure-comment
/// lines (trimmed), then one line per entry.
fn render_body(
    out: &mut String,
    table: &CollectorTable,
    category: Category,
    original_body: &str,
    newline: &str,
) {
    out.push_str(newline);
    for comment in original_body
        .split('\n')
        .map(str::trim)
        .filter(|line| line.starts_with(statics::COMMENT_MARKER))
    {
        out.push_str(comment);
        out.push_str(newline);
    }

    match category {
        Category::Enchant => {
            for entry in &table.enchant {
                write_enchant_line(out, entry);
                out.push_str(newline);
            }
        }
        _ => {
            for entry in table.item_entries(category).unwrap_or_default() {
                write_item_line(out, category, entry);
                out.push_str(newline);
            }
        }
    }
}

fn write_enchant_line(out: &mut String, entry: &EnchantEntry) {
    write!(out, "\t{}\t\t// {}", entry.chance, entry.level).ok();
}

/// Item columns differ per section, matching the files the game ships.
fn write_item_line(out: &mut String, category: Category, entry: &ProbabilityEntry) {
    let (id, value) = (&entry.item_id, entry.probability);
    match category {
        Category::Items => {
            let width = statics::ITEM_ID_COLUMN_WIDTH;
            write!(out, "\t{id:<width$}\t{value}").ok();
        }
        Category::PremiumItems => {
            write!(out, "\t{id}\t{value}").ok();
        }
        _ => {
            write!(out, "\t{id}\t\t{value}").ok();
        }
    }
}
