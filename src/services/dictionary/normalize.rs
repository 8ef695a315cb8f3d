/// Canonical form of a dictionary word: Unicode lowercase.
pub fn standardize(word: &str) -> String {
    word.to_lowercase()
}
