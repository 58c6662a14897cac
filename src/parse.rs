//! Line parser for the bodies of `Collecting_*` blocks.

use crate::section::{SectionLayout, locate_sections};
use crate::statics;
use crate::table::{Category, CollectorTable, EnchantEntry, ProbabilityEntry};
use crate::{FormatError, FormatErrorKind};
use tracing::{debug, warn};

/// Result of parsing a whole file with per-section recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCollector {
    pub table: CollectorTable,
    pub layout: SectionLayout,
    /// One entry per section whose body could not be parsed; that
    /// collection is left empty in `table`.
    pub warnings: Vec<FormatError>,
}

impl ParsedCollector {
    pub fn is_malformed(&self, category: Category) -> bool {
        self.warnings.iter().any(|w| w.section == category)
    }
}

/// Parse every section that is present. A malformed section is reported in
/// `warnings` and does not prevent the others from loading.
pub fn parse_collector(text: &str) -> ParsedCollector {
    let layout = locate_sections(text);
    let mut table = CollectorTable::default();
    let mut warnings = Vec::new();

    for category in Category::ALL {
        let Some(span) = layout.get(category) else {
            debug!(section = %category, "section absent");
            continue;
        };
        let body = span.body(text);
        let first_line = span.body_line(text);

        let outcome = match category {
            Category::Enchant => {
                parse_enchant_body(body, first_line).map(|entries| table.enchant = entries)
            }
            _ => parse_item_body(body, category, first_line).map(|entries| {
                if let Some(slot) = table.item_entries_mut(category) {
                    *slot = entries;
                }
            }),
        };

        match outcome {
            Ok(()) => debug!(
                section = %category,
                entries = table.len(category),
                total = table.total(category),
                "parsed section"
            ),
            Err(error) => {
                warn!(%error, "skipping malformed section");
                warnings.push(error);
            }
        }
    }

    ParsedCollector {
        table,
        layout,
        warnings,
    }
}

/// Parse a file, failing on the first malformed section.
pub fn parse_collector_strict(text: &str) -> Result<CollectorTable, FormatError> {
    let parsed = parse_collector(text);
    match parsed.warnings.into_iter().next() {
        Some(error) => Err(error),
        None => Ok(parsed.table),
    }
}

/// Lines of a body paired with their 1-based line number in the file.
fn numbered_lines(body: &str, first_line: usize) -> impl Iterator<Item = (usize, &str)> {
    body.split('\n')
        .enumerate()
        .map(move |(i, line)| (first_line + i, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with(statics::COMMENT_MARKER))
}

/// Split a trimmed line into its data part and the first comment segment.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut parts = line.split(statics::COMMENT_MARKER);
    let code = parts.next().unwrap_or_default().trim();
    (code, parts.next())
}

fn parse_value(
    token: &str,
    category: Category,
    line_no: usize,
    line: &str,
) -> Result<u32, FormatError> {
    token.parse::<u32>().map_err(|_| FormatError {
        section: category,
        line: line_no,
        text: line.to_string(),
        kind: FormatErrorKind::InvalidInteger(token.to_string()),
    })
}

fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits = &text[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Parse `<chance> [// <level> ...]` lines.
///
/// Lines that do not start with a digit are ignored. When the comment carries
/// no number the level is the entry's position among the data lines; it is
/// resolved here once and stored on the entry.
pub fn parse_enchant_body(body: &str, first_line: usize) -> Result<Vec<EnchantEntry>, FormatError> {
    let mut entries = Vec::new();

    for (line_no, line) in numbered_lines(body, first_line) {
        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        let (code, comment) = split_comment(line);
        let token = code.split_whitespace().next().unwrap_or_default();
        let chance = parse_value(token, Category::Enchant, line_no, line)?;
        let level = comment
            .and_then(first_number)
            .unwrap_or(u32::try_from(entries.len()).unwrap_or(u32::MAX));
        entries.push(EnchantEntry { level, chance });
    }

    Ok(entries)
}

/// Parse `<itemId> ... <probability> [// comment]` lines.
///
/// Only lines whose data part mentions the `II_` prefix are considered; the
/// probability is the last whitespace-separated token.
pub fn parse_item_body(
    body: &str,
    category: Category,
    first_line: usize,
) -> Result<Vec<ProbabilityEntry>, FormatError> {
    let mut entries = Vec::new();

    for (line_no, line) in numbered_lines(body, first_line) {
        let (code, _) = split_comment(line);
        if !code.contains(statics::ITEM_ID_PREFIX) {
            continue;
        }
        let tokens: Vec<&str> = code.split_whitespace().collect();
        let (Some(item_id), Some(last), true) = (tokens.first(), tokens.last(), tokens.len() > 1)
        else {
            return Err(FormatError {
                section: category,
                line: line_no,
                text: line.to_string(),
                kind: FormatErrorKind::MissingValue,
            });
        };
        let probability = parse_value(last, category, line_no, line)?;
        entries.push(ProbabilityEntry::new(*item_id, probability));
    }

    Ok(entries)
}
