pub mod entry;
pub mod languages;
