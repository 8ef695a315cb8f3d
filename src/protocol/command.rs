#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    DictOpen,
    DictLanguages,
    DictEntries,
    DictAdd,
    DictDedupe,
    DictPersist,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "dict.open" => Command::DictOpen,
            "dict.languages" => Command::DictLanguages,
            "dict.entries" => Command::DictEntries,
            "dict.add" => Command::DictAdd,
            "dict.dedupe" => Command::DictDedupe,
            "dict.persist" | "dict.update" => Command::DictPersist,
            _ => Command::Unknown,
        }
    }
}
