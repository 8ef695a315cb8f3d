use std::collections::HashMap;

use serde_json::{json, Value};

use crate::config::DictionaryConfig;
use crate::model::languages::LanguagePair;
use crate::services::dictionary::WordPairStore;

mod command;
mod dictionary;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

/// One translation session: a dictionary per language pair, opened on first use
/// and kept until the process exits. Requests are handled one at a time.
#[derive(Debug)]
pub struct Session {
    config: DictionaryConfig,
    stores: HashMap<LanguagePair, WordPairStore>,
}

impl Session {
    pub fn new(config: DictionaryConfig) -> Self {
        Self {
            config,
            stores: HashMap::new(),
        }
    }

    /// Handles one request line and returns the response line.
    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        match Command::from(cmd_str) {
            Command::Ping => ok(id, json!({ "message": "dict-core alive" })),

            Command::Unknown => {
                tracing::debug!("unknown command: {cmd_str:?}");
                err(id, "unknown command")
            }

            cmd => match dictionary::handle(cmd, payload, &mut self.stores, &self.config) {
                Ok(v) => ok(id, v),
                Err(e) => {
                    tracing::warn!("{cmd_str} failed: {e}");
                    err(id, e)
                }
            },
        }
    }
}
