use serde::{Deserialize, Serialize};

/// One dictionary entry: a word and its translation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct WordPair {
    pub source: String,
    pub target: String,
}

impl WordPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Added in memory, not yet written to the dictionary file
    Pending,
    /// Known to be present in the dictionary file
    Persisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub pair: WordPair,
    pub state: EntryState,
}

impl DictEntry {
    pub fn pending(pair: WordPair) -> Self {
        Self {
            pair,
            state: EntryState::Pending,
        }
    }

    pub fn persisted(pair: WordPair) -> Self {
        Self {
            pair,
            state: EntryState::Persisted,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == EntryState::Pending
    }
}
