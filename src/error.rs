use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by dictionary operations.
///
/// A missing or unreadable dictionary file is not an error: it is logged and
/// the dictionary is treated as empty.
#[derive(Debug, Error)]
pub enum DictError {
    /// A language identifier was empty
    #[error("{0} language must not be empty")]
    EmptyLanguage(&'static str),

    /// A language identifier cannot be part of a file name
    #[error("language '{0}' cannot be used in a dictionary file name")]
    InvalidLanguage(String),

    /// A word cannot be stored in the tab separated format
    #[error("word {0:?} contains a tab or line break")]
    InvalidWord(String),

    /// A line without a tab separator, under the reject policy
    #[error("malformed line {line_number} in {}: {content:?}", path.display())]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        content: String,
    },

    /// The file on disk is not UTF-8, appending would mix encodings
    #[error("dictionary {} is encoded as {encoding}, refusing to append UTF-8 lines", path.display())]
    UnsupportedEncoding { path: PathBuf, encoding: String },

    /// Appending to the dictionary file failed
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DictError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DictError>;
