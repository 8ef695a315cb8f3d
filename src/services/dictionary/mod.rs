pub mod codec;
pub mod normalize;
pub mod store;

pub use store::{LoadReport, PersistReport, WordPairStore};
