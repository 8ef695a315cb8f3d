//! Bilingual word dictionaries backed by tab separated text files.

pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod services;

pub use config::{DictionaryConfig, MalformedLinePolicy};
pub use error::{DictError, Result};
pub use model::entry::WordPair;
pub use services::dictionary::{LoadReport, PersistReport, WordPairStore};
