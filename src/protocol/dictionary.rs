use std::collections::HashMap;

use serde_json::{json, Value};

use super::command::Command;
use crate::config::DictionaryConfig;
use crate::model::entry::WordPair;
use crate::model::languages::LanguagePair;
use crate::services::dictionary::WordPairStore;

fn get_str<'a>(payload: &'a Value, key: &str) -> &'a str {
    payload.get(key).and_then(|v| v.as_str()).unwrap_or("")
}

fn languages_from_payload(payload: &Value) -> Result<LanguagePair, String> {
    let source_lang = get_str(payload, "source_lang");
    let target_lang = get_str(payload, "target_lang");

    if source_lang.is_empty() { return Err("payload.source_lang is required".into()); }
    if target_lang.is_empty() { return Err("payload.target_lang is required".into()); }

    LanguagePair::new(source_lang, target_lang).map_err(|e| e.to_string())
}

/// Returns the session store for the payload's language pair, loading it on first use.
fn store_for<'a>(
    stores: &'a mut HashMap<LanguagePair, WordPairStore>,
    config: &DictionaryConfig,
    payload: &Value,
) -> Result<&'a mut WordPairStore, String> {
    let languages = languages_from_payload(payload)?;

    if !stores.contains_key(&languages) {
        let store = WordPairStore::open(config, languages.source(), languages.target())
            .map_err(|e| e.to_string())?;
        stores.insert(languages.clone(), store);
    }

    stores
        .get_mut(&languages)
        .ok_or_else(|| "dictionary not open".to_string())
}

fn entries_json(store: &WordPairStore) -> Value {
    json!(store.entries().collect::<Vec<_>>())
}

pub(super) fn handle(
    cmd: Command,
    payload: &Value,
    stores: &mut HashMap<LanguagePair, WordPairStore>,
    config: &DictionaryConfig,
) -> Result<Value, String> {
    let store = store_for(stores, config, payload)?;

    match cmd {
        Command::DictOpen => Ok(json!({
            "languages": store.language_pair(),
            "path": store.path().to_string_lossy(),
            "entries": entries_json(store),
            "pending": store.pending_count(),
        })),

        Command::DictLanguages => {
            let (source, target) = store.languages();
            Ok(json!({ "source": source, "target": target }))
        }

        Command::DictEntries => Ok(json!({
            "entries": entries_json(store),
            "pending": store.pending().collect::<Vec<_>>(),
        })),

        Command::DictAdd => {
            let source = get_str(payload, "source");
            let target = get_str(payload, "target");

            if source.is_empty() { return Err("payload.source is required".into()); }
            if target.is_empty() { return Err("payload.target is required".into()); }

            store.add_entry(source, target).map_err(|e| e.to_string())?;

            let entry = WordPair::new(
                WordPairStore::standardize(source),
                WordPairStore::standardize(target),
            );
            Ok(json!({ "entry": entry, "count": store.len() }))
        }

        Command::DictDedupe => {
            let removed = store.remove_duplicates();
            Ok(json!({ "removed": removed, "count": store.len() }))
        }

        Command::DictPersist => {
            let report = store.persist().map_err(|e| e.to_string())?;
            Ok(json!({ "report": report }))
        }

        Command::Ping | Command::Unknown => Err("unknown command".into()),
    }
}
