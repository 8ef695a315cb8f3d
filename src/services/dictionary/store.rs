use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::codec::{self, ParsedFile};
use super::normalize;
use crate::config::{DictionaryConfig, MalformedLinePolicy};
use crate::error::{DictError, Result};
use crate::model::entry::{DictEntry, EntryState, WordPair};
use crate::model::languages::LanguagePair;
use crate::services::encoding;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistReport {
    pub duplicates_removed: usize,
    /// Pending pairs found already written in the file
    pub already_on_disk: usize,
    pub appended: usize,
    /// Lines in the file before appending
    pub disk_lines: usize,
}

/// Word translations for one language pair, backed by
/// `res/Dictionaries/dict_<source>_<target>.txt`.
///
/// Pairs read from the file are `Persisted`, pairs added through
/// [`add_entry`](Self::add_entry) stay `Pending` until [`persist`](Self::persist)
/// appends them. There is no internal locking; callers share a store behind
/// their own `Mutex` if they need to.
#[derive(Debug)]
pub struct WordPairStore {
    languages: LanguagePair,
    path: PathBuf,
    malformed_lines: MalformedLinePolicy,
    entries: Vec<DictEntry>,
}

impl WordPairStore {
    /// Opens the dictionary using [`DictionaryConfig::new`].
    pub fn new(source_language: &str, target_language: &str) -> Result<Self> {
        Self::open(&DictionaryConfig::new(), source_language, target_language)
    }

    pub fn open(config: &DictionaryConfig, source_language: &str, target_language: &str) -> Result<Self> {
        let languages = LanguagePair::new(source_language, target_language)?;
        let path = config.dictionary_path(&languages);

        let mut store = Self {
            languages,
            path,
            malformed_lines: config.malformed_lines,
            entries: Vec::new(),
        };

        store.load()?;
        Ok(store)
    }

    /// Reads the dictionary file and appends its pairs as persisted entries.
    ///
    /// A missing or unreadable file leaves the dictionary as it was.
    pub fn load(&mut self) -> Result<LoadReport> {
        let name = self.languages.file_name();
        tracing::info!("Loading dictionary: {name}");

        let Some((parsed, _)) = self.read_disk()? else {
            tracing::info!("Dictionary {name} not loaded, starting empty");
            return Ok(LoadReport::default());
        };

        let report = LoadReport {
            loaded: parsed.pairs.len(),
            skipped: parsed.skipped,
        };

        self.entries
            .extend(parsed.pairs.into_iter().map(DictEntry::persisted));

        tracing::info!(
            "Dictionary loaded: {name} ({} entries, {} skipped)",
            report.loaded,
            report.skipped
        );
        Ok(report)
    }

    pub fn standardize(word: &str) -> String {
        normalize::standardize(word)
    }

    /// Queues a normalized pair. Duplicates are kept until the next
    /// [`remove_duplicates`](Self::remove_duplicates) or persist.
    pub fn add_entry(&mut self, source_word: &str, target_word: &str) -> Result<()> {
        for word in [source_word, target_word] {
            if !codec::is_encodable(word) {
                return Err(DictError::InvalidWord(word.to_string()));
            }
        }

        let pair = WordPair::new(
            Self::standardize(source_word),
            Self::standardize(target_word),
        );
        tracing::debug!("Queued entry {} -> {}", pair.source, pair.target);

        self.entries.push(DictEntry::pending(pair));
        Ok(())
    }

    /// Keeps the first occurrence of every pair. Returns how many were removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let (deduped, removed) = dedup(std::mem::take(&mut self.entries));
        self.entries = deduped;

        if removed > 0 {
            tracing::debug!("Removed {removed} duplicate entries from {}", self.languages.file_name());
        }

        removed
    }

    /// Appends every pending pair to the dictionary file.
    ///
    /// The file is re-read first so pairs that are already on disk are not
    /// written twice. Entries become persisted one line at a time: when a write
    /// fails, the pairs not yet written stay pending and the error is returned.
    /// Lines appended before the failure are not rolled back.
    pub fn persist(&mut self) -> Result<PersistReport> {
        let name = self.languages.file_name();
        let path = self.path.clone();
        tracing::info!("Updating dictionary: {name}");

        let mut report = PersistReport {
            duplicates_removed: self.remove_duplicates(),
            ..PersistReport::default()
        };

        let (on_disk, needs_newline) = match self.read_disk()? {
            Some((parsed, decoded)) => {
                if !decoded.accepts_utf8_append() {
                    return Err(DictError::UnsupportedEncoding {
                        path,
                        encoding: decoded.encoding,
                    });
                }
                report.disk_lines = parsed.line_count;

                let needs_newline = !decoded.text.is_empty() && !decoded.text.ends_with('\n');
                (parsed.pairs.into_iter().collect::<HashSet<_>>(), needs_newline)
            }
            None => {
                tracing::info!("File not found: {name}. Creating a new dictionary.");
                (HashSet::new(), false)
            }
        };

        for entry in self.entries.iter_mut().filter(|e| e.is_pending()) {
            if on_disk.contains(&entry.pair) {
                entry.state = EntryState::Persisted;
                report.already_on_disk += 1;
            }
        }

        if self.pending_count() == 0 {
            tracing::info!("Dictionary updated: {name} (nothing to append)");
            return Ok(report);
        }

        let mut file = open_for_append(&self.path).map_err(|e| DictError::write(&path, e))?;

        if needs_newline {
            file.write_all(b"\n")
                .map_err(|e| DictError::write(&path, e))?;
        }

        for entry in self.entries.iter_mut().filter(|e| e.is_pending()) {
            let line = codec::encode_line(&entry.pair);

            writeln!(file, "{line}").map_err(|e| DictError::write(&path, e))?;

            entry.state = EntryState::Persisted;
            report.appended += 1;
            tracing::debug!("Entry added: {line:?} to dictionary {name}");
        }

        file.flush().map_err(|e| DictError::write(&path, e))?;

        tracing::info!(
            "Dictionary updated: {name} ({} appended, {} already on disk)",
            report.appended,
            report.already_on_disk
        );
        Ok(report)
    }

    pub fn languages(&self) -> (&str, &str) {
        (self.languages.source(), self.languages.target())
    }

    pub fn language_pair(&self) -> &LanguagePair {
        &self.languages
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &WordPair> + '_ {
        self.entries.iter().map(|e| &e.pair)
    }

    /// Entries not yet written to the dictionary file.
    pub fn pending(&self) -> impl Iterator<Item = &WordPair> + '_ {
        self.entries
            .iter()
            .filter(|e| e.is_pending())
            .map(|e| &e.pair)
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fresh read of the backing file. `None` when it is missing or unreadable.
    fn read_disk(&self) -> Result<Option<(ParsedFile, encoding::DecodedText)>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!("File not found: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("failed to read {}: {e}", self.path.display());
                return Ok(None);
            }
        };

        let decoded = encoding::decode(&bytes);
        if decoded.had_errors {
            tracing::warn!(
                "{} contains bytes invalid for {}",
                self.path.display(),
                decoded.encoding
            );
        }

        let parsed = codec::parse_lines(&decoded.text, &self.path, self.malformed_lines)?;
        Ok(Some((parsed, decoded)))
    }
}

fn open_for_append(path: &Path) -> io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Order preserving; a duplicate of a persisted pair leaves the survivor persisted.
fn dedup(entries: Vec<DictEntry>) -> (Vec<DictEntry>, usize) {
    let mut index: HashMap<WordPair, usize> = HashMap::with_capacity(entries.len());
    let mut out: Vec<DictEntry> = Vec::with_capacity(entries.len());
    let mut removed = 0usize;

    for e in entries {
        match index.get(&e.pair) {
            None => {
                index.insert(e.pair.clone(), out.len());
                out.push(e);
            }
            Some(&pos) => {
                if e.state == EntryState::Persisted {
                    out[pos].state = EntryState::Persisted;
                }
                removed += 1;
            }
        }
    }

    (out, removed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn config(dir: &TempDir) -> DictionaryConfig {
        DictionaryConfig::with_base_dir(dir.path())
    }

    fn write_dict(dir: &TempDir, file_name: &str, content: &[u8]) -> PathBuf {
        let config = config(dir);
        let dicts = config.dictionaries_dir();
        fs::create_dir_all(&dicts).unwrap();
        let path = dicts.join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    fn pairs(store: &WordPairStore) -> Vec<(String, String)> {
        store
            .entries()
            .map(|p| (p.source.clone(), p.target.clone()))
            .collect()
    }

    fn pair_set(store: &WordPairStore) -> HashSet<WordPair> {
        store.entries().cloned().collect()
    }

    #[test]
    fn test_open_missing_file_starts_empty() {
        let dir = TempDir::new().unwrap();

        let store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        assert!(store.is_empty());
        assert_eq!(store.languages(), ("en", "fr"));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_open_rejects_empty_language() {
        let dir = TempDir::new().unwrap();

        let err = WordPairStore::open(&config(&dir), "", "fr").unwrap_err();
        assert!(matches!(err, DictError::EmptyLanguage("source")));
    }

    #[test]
    fn test_load_existing_file() {
        let dir = TempDir::new().unwrap();
        write_dict(&dir, "dict_en_fr.txt", b"hello\tbonjour\nCat\tChat\n");

        let store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        // loaded pairs are kept as written
        assert_eq!(
            pairs(&store),
            vec![
                ("hello".to_string(), "bonjour".to_string()),
                ("Cat".to_string(), "Chat".to_string()),
            ]
        );
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_load_ignores_other_language_pair() {
        let dir = TempDir::new().unwrap();
        write_dict(&dir, "dict_fr_en.txt", b"bonjour\thello\n");

        let store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_skips_malformed_lines_by_default() {
        let dir = TempDir::new().unwrap();
        write_dict(&dir, "dict_en_fr.txt", b"hello\tbonjour\nbroken\nworld\tmonde\n");

        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();
        assert_eq!(store.len(), 2);

        let report = store.load().unwrap();
        assert_eq!(report, LoadReport { loaded: 2, skipped: 1 });
    }

    #[test]
    fn test_load_reject_policy_fails() {
        let dir = TempDir::new().unwrap();
        write_dict(&dir, "dict_en_fr.txt", b"hello\tbonjour\nbroken\n");
        let config = config(&dir).malformed_lines(MalformedLinePolicy::Reject);

        let err = WordPairStore::open(&config, "en", "fr").unwrap_err();
        assert!(matches!(err, DictError::MalformedLine { line_number: 2, .. }));
    }

    #[test]
    fn test_load_utf8_bom_file() {
        let dir = TempDir::new().unwrap();
        let mut content = vec![0xEF, 0xBB, 0xBF];
        content.extend_from_slice("chien\tdog\r\n".as_bytes());
        write_dict(&dir, "dict_fr_en.txt", &content);

        let store = WordPairStore::open(&config(&dir), "fr", "en").unwrap();
        assert_eq!(pairs(&store), vec![("chien".to_string(), "dog".to_string())]);
    }

    #[test]
    fn test_add_entry_normalizes() {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        store.add_entry("World", "Monde").unwrap();

        assert_eq!(pairs(&store), vec![("world".to_string(), "monde".to_string())]);
        assert_eq!(store.pending_count(), 1);
        assert!(!store.path().exists());
    }

    #[rstest]
    #[case("tab\tword", "x")]
    #[case("x", "two\nlines")]
    #[case("x", "cr\r")]
    fn test_add_entry_rejects_unencodable(#[case] source: &str, #[case] target: &str) {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        let err = store.add_entry(source, target).unwrap_err();
        assert!(matches!(err, DictError::InvalidWord(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_entry_keeps_duplicates_until_dedup() {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        store.add_entry("cat", "chat").unwrap();
        store.add_entry("CAT", "Chat").unwrap();
        store.add_entry("dog", "chien").unwrap();
        assert_eq!(store.len(), 3);

        assert_eq!(store.remove_duplicates(), 1);
        assert_eq!(
            pair_set(&store),
            HashSet::from([WordPair::new("cat", "chat"), WordPair::new("dog", "chien")])
        );
    }

    #[test]
    fn test_remove_duplicates_same_source_different_target_kept() {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        store.add_entry("light", "lumière").unwrap();
        store.add_entry("light", "léger").unwrap();

        assert_eq!(store.remove_duplicates(), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let entries = vec![
            DictEntry::pending(WordPair::new("b", "2")),
            DictEntry::pending(WordPair::new("a", "1")),
            DictEntry::pending(WordPair::new("b", "2")),
            DictEntry::pending(WordPair::new("c", "3")),
            DictEntry::pending(WordPair::new("a", "1")),
        ];

        let (out, removed) = dedup(entries);

        assert_eq!(removed, 2);
        let order: Vec<&str> = out.iter().map(|e| e.pair.source.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_dedup_pending_duplicate_of_persisted_is_persisted() {
        let entries = vec![
            DictEntry::pending(WordPair::new("cat", "chat")),
            DictEntry::persisted(WordPair::new("cat", "chat")),
        ];

        let (out, removed) = dedup(entries);

        assert_eq!(removed, 1);
        assert_eq!(out[0].state, EntryState::Persisted);
    }

    #[test]
    fn test_persist_creates_file_and_directories() {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        store.add_entry("Hello", "Bonjour").unwrap();
        let report = store.persist().unwrap();

        assert_eq!(report.appended, 1);
        assert_eq!(report.disk_lines, 0);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "hello\tbonjour\n");
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn test_persist_twice_appends_nothing_second_time() {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        store.add_entry("cat", "chat").unwrap();
        store.add_entry("dog", "chien").unwrap();
        store.persist().unwrap();
        let second = store.persist().unwrap();

        assert_eq!(second.appended, 0);
        assert_eq!(second.disk_lines, 2);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "cat\tchat\ndog\tchien\n"
        );
    }

    #[test]
    fn test_persist_after_dedup_of_persisted_pair() {
        let dir = TempDir::new().unwrap();
        write_dict(&dir, "dict_en_fr.txt", b"cat\tchat\n");
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        // duplicate of a line already on disk, then a genuinely new one
        store.add_entry("Cat", "Chat").unwrap();
        store.add_entry("dog", "chien").unwrap();
        let report = store.persist().unwrap();

        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.appended, 1);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "cat\tchat\ndog\tchien\n"
        );
    }

    #[test]
    fn test_persist_skips_pairs_written_by_someone_else() {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();
        store.add_entry("cat", "chat").unwrap();
        store.add_entry("dog", "chien").unwrap();

        write_dict(&dir, "dict_en_fr.txt", b"cat\tchat\n");
        let report = store.persist().unwrap();

        assert_eq!(report.already_on_disk, 1);
        assert_eq!(report.appended, 1);
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "cat\tchat\ndog\tchien\n"
        );
    }

    #[test]
    fn test_persist_repairs_missing_trailing_newline() {
        let dir = TempDir::new().unwrap();
        write_dict(&dir, "dict_en_fr.txt", b"hello\tbonjour");
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();

        store.add_entry("world", "monde").unwrap();
        store.persist().unwrap();

        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "hello\tbonjour\nworld\tmonde\n"
        );
    }

    #[test]
    fn test_persist_refuses_utf16_file() {
        let dir = TempDir::new().unwrap();
        let mut content = vec![0xFF, 0xFE];
        for unit in "cat\tchat\n".encode_utf16() {
            content.extend_from_slice(&unit.to_le_bytes());
        }
        let path = write_dict(&dir, "dict_en_fr.txt", &content);
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();
        assert_eq!(store.len(), 1);

        store.add_entry("dog", "chien").unwrap();
        let err = store.persist().unwrap_err();

        assert!(matches!(err, DictError::UnsupportedEncoding { .. }));
        assert_eq!(fs::read(&path).unwrap(), content);
        assert_eq!(store.pending_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_write_failure_keeps_pending() {
        // a directory where the file should be makes the append fail
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let mut store = WordPairStore::open(&config, "en", "fr").unwrap();
        fs::create_dir_all(store.path()).unwrap();

        store.add_entry("cat", "chat").unwrap();
        let err = store.persist().unwrap_err();

        assert!(matches!(err, DictError::Write { .. }));
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn test_whitespace_words_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = WordPairStore::open(&config(&dir), "en", "fr").unwrap();
        store.add_entry(" ", "").unwrap();
        store.add_entry("", "").unwrap();
        store.persist().unwrap();

        let mut reopened = WordPairStore::open(&config(&dir), "en", "fr").unwrap();
        assert_eq!(
            pair_set(&reopened),
            HashSet::from([WordPair::new(" ", ""), WordPair::new("", "")])
        );

        // adding the same pair in a later session does not grow the file
        reopened.add_entry(" ", "").unwrap();
        let report = reopened.persist().unwrap();
        assert_eq!(report.appended, 0);
        assert_eq!(fs::read_to_string(reopened.path()).unwrap(), " \t\n\t\n");
    }

    #[test]
    fn test_persist_reject_policy_fails_on_malformed_disk_line() {
        let dir = TempDir::new().unwrap();
        let path = write_dict(&dir, "dict_en_fr.txt", b"hello\tbonjour\n");
        let config = config(&dir).malformed_lines(MalformedLinePolicy::Reject);
        let mut store = WordPairStore::open(&config, "en", "fr").unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"broken\n").unwrap();
        drop(file);

        store.add_entry("world", "monde").unwrap();
        let err = store.persist().unwrap_err();

        assert!(matches!(err, DictError::MalformedLine { line_number: 2, .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\tbonjour\nbroken\n");
        assert_eq!(store.pending_count(), 1);
    }

    #[test]
    fn test_open_unreadable_file_starts_empty() {
        // a directory in place of the file cannot be read
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let languages = LanguagePair::new("en", "fr").unwrap();
        fs::create_dir_all(config.dictionary_path(&languages)).unwrap();

        let store = WordPairStore::open(&config, "en", "fr").unwrap();

        assert!(store.is_empty());
        assert!(store.path().is_dir());
    }
}
