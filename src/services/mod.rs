pub mod dictionary;
pub mod encoding;
