use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One flashcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPhrase")]
pub struct Phrase {
    pub id: Uuid,
    pub word: String,
    pub phrase: String,
    pub usage: String,
}

/// Wire shape: ids are free-form strings and may be missing.
#[derive(Deserialize)]
struct RawPhrase {
    #[serde(default)]
    id: Option<serde_json::Value>,
    word: String,
    phrase: String,
    usage: String,
}

impl From<RawPhrase> for Phrase {
    fn from(raw: RawPhrase) -> Self {
        let id = raw
            .id
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);
        Self {
            id,
            word: raw.word,
            phrase: raw.phrase,
            usage: raw.usage,
        }
    }
}

impl Phrase {
    pub fn new(word: impl Into<String>, phrase: impl Into<String>, usage: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            word: word.into(),
            phrase: phrase.into(),
            usage: usage.into(),
        }
    }
}
