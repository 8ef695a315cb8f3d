use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use dict_core::protocol::Session;
use dict_core::DictionaryConfig;
use tracing_subscriber::EnvFilter;

fn main() {
    // stdout carries protocol responses
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let config = DictionaryConfig::new();
    tracing::info!("Dictionaries directory: {}", config.dictionaries_dir().display());

    let mut session = Session::new(config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!("failed to read request: {e}");
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| session.handle(&line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                tracing::error!("request handler panicked");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
