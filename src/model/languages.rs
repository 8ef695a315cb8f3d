use serde::{Deserialize, Serialize};

use crate::error::{DictError, Result};

/// Source and target language of one dictionary.
///
/// Codes are not checked against any registry: an unknown code is accepted
/// and simply never matches an existing file. They only have to be usable
/// inside a file name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct LanguagePair {
    source: String,
    target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let target = target.into();

        check_language(&source, "source")?;
        check_language(&target, "target")?;

        Ok(Self { source, target })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// `dict_<source>_<target>`
    pub fn file_stem(&self) -> String {
        format!("dict_{}_{}", self.source, self.target)
    }

    pub fn file_name(&self) -> String {
        format!("{}.txt", self.file_stem())
    }
}

fn check_language(code: &str, role: &'static str) -> Result<()> {
    if code.is_empty() {
        return Err(DictError::EmptyLanguage(role));
    }

    let bad_char = code
        .chars()
        .any(|ch| ch == '/' || ch == '\\' || ch == ':' || ch.is_control());

    if bad_char || code.contains("..") {
        return Err(DictError::InvalidLanguage(code.to_string()));
    }

    Ok(())
}
