use crate::parse::{ParsedCollector, parse_collector};
use crate::serialize::{SerializeOutcome, serialize_against};
use crate::statics;
use crate::table::CollectorTable;
use crate::validate::{ValidationResult, validate};
use crate::FormatError;
use anyhow::{Context, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// How the file's bytes were decoded; saving re-encodes the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    /// Fallback for legacy single-byte files: every byte maps to one char.
    Latin1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => statics::NL_LF,
            LineEnding::CrLf => statics::NL_CRLF,
        }
    }
}

/// A loaded collector file: the untouched original text plus the table
/// being edited.
///
/// The original is kept for the lifetime of the document so that saving only
/// rewrites edited sections and an unedited document saves byte-for-byte.
#[derive(Debug, Clone)]
pub struct CollectorDocument {
    pub source_path: Option<PathBuf>,
    pub encoding: SourceEncoding,
    pub line_ending: LineEnding,
    pub table: CollectorTable,
    pub dirty: bool,
    original_bytes: Vec<u8>,
    original_text: String,
    baseline: ParsedCollector,
}

impl CollectorDocument {
    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading {path:?}"))?;
        let mut doc = Self::from_bytes(bytes);
        doc.source_path = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            encoding = ?doc.encoding,
            warnings = doc.warnings().len(),
            "loaded collector file"
        );
        Ok(doc)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let (text, encoding) = decode(&bytes);
        Self::build(bytes, text, encoding)
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::build(text.as_bytes().to_vec(), text, SourceEncoding::Utf8)
    }

    fn build(bytes: Vec<u8>, text: String, encoding: SourceEncoding) -> Self {
        let line_ending = detect_line_ending(&bytes);
        let baseline = parse_collector(&text);
        Self {
            source_path: None,
            encoding,
            line_ending,
            table: baseline.table.clone(),
            dirty: false,
            original_bytes: bytes,
            original_text: text,
            baseline,
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn original_bytes(&self) -> &[u8] {
        &self.original_bytes
    }

    /// The table as parsed from the original text.
    pub fn parsed_table(&self) -> &CollectorTable {
        &self.baseline.table
    }

    /// Sections that failed to parse when the document was loaded.
    pub fn warnings(&self) -> &[FormatError] {
        &self.baseline.warnings
    }

    pub fn validation(&self) -> ValidationResult {
        validate(&self.table)
    }

    /// Swap in a new table (e.g. the result of an edit) and recompute `dirty`.
    pub fn replace_table(&mut self, table: CollectorTable) {
        self.table = table;
        self.refresh_dirty();
    }

    /// Recompute `dirty` by comparing the current table to the parsed original.
    /// Undoing every change therefore clears it again.
    pub fn refresh_dirty(&mut self) {
        self.dirty = self.table != self.baseline.table;
    }

    /// Render the current table into the original text.
    pub fn serialize(&self) -> anyhow::Result<SerializeOutcome> {
        Ok(serialize_against(
            &self.table,
            &self.original_text,
            &self.baseline,
        )?)
    }

    pub fn save_bytes(&self) -> anyhow::Result<Vec<u8>> {
        if !self.dirty {
            return Ok(self.original_bytes.clone());
        }
        let outcome = self.serialize()?;
        encode(&outcome.text, self.encoding)
    }

    /// Write the document and adopt the written text as the new original.
    pub fn save_to_path(&mut self, path: &Path) -> anyhow::Result<SerializeOutcome> {
        let outcome = self.serialize()?;
        let bytes = if self.dirty {
            encode(&outcome.text, self.encoding)?
        } else {
            self.original_bytes.clone()
        };
        fs::write(path, &bytes).with_context(|| format!("writing {path:?}"))?;
        info!(path = %path.display(), bytes = bytes.len(), "saved collector file");

        self.source_path = Some(path.to_path_buf());
        self.baseline = parse_collector(&outcome.text);
        self.original_text = outcome.text.clone();
        self.original_bytes = bytes;
        self.refresh_dirty();
        Ok(outcome)
    }
}

fn decode(bytes: &[u8]) -> (String, SourceEncoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), SourceEncoding::Utf8),
        Err(error) => {
            debug!(%error, "not UTF-8, decoding as Latin-1");
            let text = bytes.iter().map(|&b| char::from(b)).collect();
            (text, SourceEncoding::Latin1)
        }
    }
}

fn encode(text: &str, encoding: SourceEncoding) -> anyhow::Result<Vec<u8>> {
    match encoding {
        SourceEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
        SourceEncoding::Latin1 => {
            let mut out = Vec::with_capacity(text.len());
            for ch in text.chars() {
                let Ok(byte) = u8::try_from(u32::from(ch)) else {
                    bail!("character {ch:?} cannot be written to a Latin-1 file");
                };
                out.push(byte);
            }
            Ok(out)
        }
    }
}

pub(crate) fn detect_line_ending(text_bytes: &[u8]) -> LineEnding {
    // Count actual terminators; a file with a few stray CRLF lines is still LF.
    let mut lf_count = 0usize;
    let mut crlf_count = 0usize;

    for (i, b) in text_bytes.iter().enumerate() {
        if *b != b'\n' {
            continue;
        }
        if i > 0 && text_bytes[i - 1] == b'\r' {
            crlf_count += 1;
        } else {
            lf_count += 1;
        }
    }

    if crlf_count > lf_count {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    }
}
