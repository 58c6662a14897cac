//! Locates the `Collecting_*` blocks inside a collector file.
//!
//! The format has no nested braces, so a block is simply the keyword, any text
//! up to the first `{`, and everything up to the next `}`. The scanner walks
//! the text once and records the first complete block for each category.
//! Scanning resumes after each located block, so a keyword mentioned inside
//! another block's header or body never starts a block of its own.

use crate::statics;
use crate::table::Category;

/// Byte offsets of one block within the source text.
///
/// `header` is `keyword_start..body_start` and includes the opening brace;
/// `body` is `body_start..body_end`; the closing brace sits at `body_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub keyword_start: usize,
    pub body_start: usize,
    pub body_end: usize,
}

impl SectionSpan {
    pub fn header<'t>(&self, text: &'t str) -> &'t str {
        &text[self.keyword_start..self.body_start]
    }

    pub fn body<'t>(&self, text: &'t str) -> &'t str {
        &text[self.body_start..self.body_end]
    }

    /// Offset just past the closing brace.
    pub fn end(&self) -> usize {
        self.body_end + 1
    }

    /// 1-based line number on which the body starts.
    pub fn body_line(&self, text: &str) -> usize {
        text.as_bytes()[..self.body_start]
            .iter()
            .filter(|b| **b == b'\n')
            .count()
            + 1
    }
}

/// A located block, borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionMatch<'t> {
    pub span: SectionSpan,
    pub header: &'t str,
    pub body: &'t str,
}

/// Where each category's block lives in a file (if anywhere).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionLayout {
    spans: [Option<SectionSpan>; 4],
}

impl SectionLayout {
    pub fn get(&self, category: Category) -> Option<SectionSpan> {
        self.spans[slot(category)]
    }

    fn set(&mut self, category: Category, span: SectionSpan) {
        self.spans[slot(category)] = Some(span);
    }

    fn is_complete(&self) -> bool {
        self.spans.iter().all(Option::is_some)
    }
}

fn slot(category: Category) -> usize {
    match category {
        Category::Enchant => 0,
        Category::Items => 1,
        Category::PremiumItems => 2,
        Category::PremiumStatusItems => 3,
    }
}

/// Find the first block of every category in a single forward pass.
pub fn locate_sections(text: &str) -> SectionLayout {
    let bytes = text.as_bytes();
    let mut layout = SectionLayout::default();
    let mut pos = 0;

    while let Some(start) = find_prefix(bytes, pos) {
        let after = start + statics::KW_PREFIX.len();
        pos = after;

        let Some(category) = classify(bytes, after) else {
            continue;
        };
        if layout.get(category).is_some() {
            continue;
        }

        // No `{ ... }` after this keyword means none after any later one either.
        let Some(span) = enclose(bytes, start, after) else {
            break;
        };
        tracing::debug!(section = %category, offset = start, "located section");
        layout.set(category, span);
        pos = span.end();

        if layout.is_complete() {
            break;
        }
    }

    layout
}

/// Locate a single category's block.
pub fn find_section(text: &str, category: Category) -> Option<SectionMatch<'_>> {
    let span = locate_sections(text).get(category)?;
    Some(SectionMatch {
        span,
        header: span.header(text),
        body: span.body(text),
    })
}

fn find_prefix(bytes: &[u8], from: usize) -> Option<usize> {
    let prefix = statics::KW_PREFIX.as_bytes();
    if bytes.len() < prefix.len() {
        return None;
    }
    (from..=bytes.len() - prefix.len())
        .find(|&i| bytes[i..i + prefix.len()].eq_ignore_ascii_case(prefix))
}

fn starts_with_ignore_case(bytes: &[u8], at: usize, word: &str) -> bool {
    let word = word.as_bytes();
    bytes
        .get(at..at + word.len())
        .is_some_and(|s| s.eq_ignore_ascii_case(word))
}

/// Decide which block a keyword introduces from the text after `collecting_`.
fn classify(bytes: &[u8], at: usize) -> Option<Category> {
    if starts_with_ignore_case(bytes, at, statics::KW_PREMIUM_STATUS_ITEM) {
        return Some(Category::PremiumStatusItems);
    }
    if starts_with_ignore_case(bytes, at, statics::KW_PREMIUM_ITEM) {
        return Some(Category::PremiumItems);
    }
    if starts_with_ignore_case(bytes, at, statics::KW_ENCHANT) {
        return Some(Category::Enchant);
    }
    if starts_with_ignore_case(bytes, at, statics::KW_ITEM) {
        // `Collecting_Item_Foo` (optionally with whitespace before the
        // underscore) is a different keyword.
        let rest = &bytes[at + statics::KW_ITEM.len()..];
        let next = rest.iter().find(|b| !b.is_ascii_whitespace());
        if next == Some(&b'_') {
            return None;
        }
        return Some(Category::Items);
    }
    None
}

fn enclose(bytes: &[u8], keyword_start: usize, search_from: usize) -> Option<SectionSpan> {
    let open = search_from
        + bytes[search_from..]
            .iter()
            .position(|b| *b == statics::BRACE_OPEN)?;
    let body_start = open + 1;
    let body_end = body_start
        + bytes[body_start..]
            .iter()
            .position(|b| *b == statics::BRACE_CLOSE)?;
    Some(SectionSpan {
        keyword_start,
        body_start,
        body_end,
    })
}

#[cfg(test)]
mod tests {
    use super::{find_section, locate_sections};
    use crate::table::Category;

    #[test]
    fn finds_header_and_body_with_comment_before_brace() {
        let text = "// top\nCollecting_Item // Sum = 1000000\n   \n{\n\tII_A\t5\n}\ntrailer";
        let m = find_section(text, Category::Items).unwrap();
        assert_eq!(m.header, "Collecting_Item // Sum = 1000000\n   \n{");
        assert_eq!(m.body, "\n\tII_A\t5\n");
        assert_eq!(&text[m.span.end()..], "\ntrailer");
        assert_eq!(m.span.body_line(text), 4);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let text = "COLLECTING_ENCHANT { 10 }\ncollecting_premiumSTATUSitem { II_X 1 }";
        assert!(find_section(text, Category::Enchant).is_some());
        assert!(find_section(text, Category::PremiumStatusItems).is_some());
        assert!(find_section(text, Category::PremiumItems).is_none());
    }

    #[test]
    fn plain_item_does_not_capture_premium_sections() {
        let text = "Collecting_PremiumItem { II_X 500 }\nCollecting_PremiumStatusItem { II_Y 1 }";
        assert!(find_section(text, Category::Items).is_none());
        assert_eq!(
            find_section(text, Category::PremiumItems).unwrap().body,
            " II_X 500 "
        );
    }

    #[test]
    fn plain_item_skips_underscore_continuations() {
        let text = "Collecting_Item_Rare { II_R 1 }\nCollecting_Item _x { II_S 1 }\nCollecting_Item { II_A 2 }";
        let m = find_section(text, Category::Items).unwrap();
        assert_eq!(m.body, " II_A 2 ");
    }

    #[test]
    fn unterminated_section_is_absent() {
        let text = "Collecting_Enchant {\n 100\n";
        assert!(find_section(text, Category::Enchant).is_none());

        let text = "Collecting_Enchant without braces";
        assert!(find_section(text, Category::Enchant).is_none());
    }

    #[test]
    fn keyword_in_a_header_comment_is_not_a_section() {
        let text = "Collecting_Item // copied from Collecting_Enchant\n{\n\tII_A\t5\n}\nCollecting_Enchant\n{\n\t1000\n}\n";
        let layout = locate_sections(text);
        let items = layout.get(Category::Items).unwrap();
        let enchant = layout.get(Category::Enchant).unwrap();
        assert!(enchant.keyword_start > items.end());
        assert_eq!(enchant.body(text), "\n\t1000\n");
    }

    #[test]
    fn keyword_inside_a_body_is_not_a_section() {
        let text = "Collecting_Item\n{\n// see Collecting_PremiumItem\n\tII_A\t5\n}\n";
        let layout = locate_sections(text);
        assert!(layout.get(Category::Items).is_some());
        assert!(layout.get(Category::PremiumItems).is_none());
    }

    #[test]
    fn short_input_has_no_sections() {
        let layout = locate_sections("{}");
        assert!(Category::ALL.into_iter().all(|c| layout.get(c).is_none()));
    }
}
