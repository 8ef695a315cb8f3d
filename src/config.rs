use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::languages::LanguagePair;

const DICTIONARIES_DIR: [&str; 2] = ["res", "Dictionaries"];

/// What to do with a dictionary line that has no tab separator.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MalformedLinePolicy {
    /// Log a warning and ignore the line
    #[default]
    Skip,
    /// Fail the load or persist call
    Reject,
}

impl FromStr for MalformedLinePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown malformed line policy: {other}")),
        }
    }
}

fn default_base_dir() -> PathBuf {
    env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DictionaryConfig {
    /// Directory under which `res/Dictionaries` lives
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    #[serde(default)]
    pub malformed_lines: MalformedLinePolicy,
}

impl DictionaryConfig {
    /// Reads `DICT_BASE_DIR` and `DICT_MALFORMED_LINES`, falling back to the
    /// current directory and [`MalformedLinePolicy::Skip`].
    pub fn new() -> Self {
        let base_dir = env::var("DICT_BASE_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_base_dir);

        let malformed_lines = match env::var("DICT_MALFORMED_LINES") {
            Ok(v) => v.parse().unwrap_or_else(|e| {
                tracing::warn!("{e}, using skip");
                MalformedLinePolicy::Skip
            }),
            Err(_) => MalformedLinePolicy::Skip,
        };

        Self {
            base_dir,
            malformed_lines,
        }
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            malformed_lines: MalformedLinePolicy::default(),
        }
    }

    pub fn malformed_lines(mut self, policy: MalformedLinePolicy) -> Self {
        self.malformed_lines = policy;
        self
    }

    pub fn dictionaries_dir(&self) -> PathBuf {
        DICTIONARIES_DIR
            .iter()
            .fold(self.base_dir.clone(), |p, part| p.join(part))
    }

    pub fn dictionary_path(&self, languages: &LanguagePair) -> PathBuf {
        self.dictionaries_dir().join(languages.file_name())
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self::new()
    }
}
