//! Line format of dictionary files: `<source>\t<target>`, one pair per line.

use std::path::Path;

use crate::config::MalformedLinePolicy;
use crate::error::{DictError, Result};
use crate::model::entry::WordPair;

pub const SEPARATOR: char = '\t';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Blank,
    Pair {
        pair: WordPair,
        /// Fields after the second one, which are ignored
        extra_fields: usize,
    },
    Malformed,
}

pub fn parse_line(line: &str) -> ParsedLine {
    // a tab always means a pair, even when both words are whitespace
    if !line.contains(SEPARATOR) && line.trim().is_empty() {
        return ParsedLine::Blank;
    }

    let mut fields = line.split(SEPARATOR);
    let source = fields.next().unwrap_or_default();

    match fields.next() {
        Some(target) => ParsedLine::Pair {
            pair: WordPair::new(source, target),
            extra_fields: fields.count(),
        },
        None => ParsedLine::Malformed,
    }
}

pub fn encode_line(pair: &WordPair) -> String {
    format!("{}{SEPARATOR}{}", pair.source, pair.target)
}

/// Whether a word can be written without breaking the line format.
pub fn is_encodable(word: &str) -> bool {
    !word.contains([SEPARATOR, '\n', '\r'])
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub pairs: Vec<WordPair>,
    /// Malformed lines ignored under [`MalformedLinePolicy::Skip`]
    pub skipped: usize,
    pub line_count: usize,
}

/// Parses the whole decoded file. `path` is only used for diagnostics.
pub fn parse_lines(text: &str, path: &Path, policy: MalformedLinePolicy) -> Result<ParsedFile> {
    let mut parsed = ParsedFile::default();

    for (idx, line) in text.lines().enumerate() {
        parsed.line_count += 1;
        let line_number = idx + 1;

        match parse_line(line) {
            ParsedLine::Blank => {}
            ParsedLine::Pair { pair, extra_fields } => {
                if extra_fields > 0 {
                    tracing::warn!(
                        "{}:{line_number}: ignoring {extra_fields} extra field(s)",
                        path.display()
                    );
                }
                parsed.pairs.push(pair);
            }
            ParsedLine::Malformed => match policy {
                MalformedLinePolicy::Skip => {
                    tracing::warn!(
                        "{}:{line_number}: no tab separator, skipping {line:?}",
                        path.display()
                    );
                    parsed.skipped += 1;
                }
                MalformedLinePolicy::Reject => {
                    return Err(DictError::MalformedLine {
                        path: path.to_path_buf(),
                        line_number,
                        content: line.to_string(),
                    });
                }
            },
        }
    }

    Ok(parsed)
}
