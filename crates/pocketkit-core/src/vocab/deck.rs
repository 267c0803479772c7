//! The phrase deck: loading, shuffling, bookmarks and sharing.

use std::collections::BTreeSet;
use std::path::Path;

use indoc::formatdoc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use super::account::AccountStore;
use super::phrase::Phrase;
use crate::error::{CoreError, Result, ValidationError};
use crate::storage::{Database, VocabConfig};

const BUNDLED_PHRASES: &str = include_str!("../../data/phrases.json");
const BOOKMARKS_KEY: &str = "bookmarked_phrases";

#[derive(Debug, Clone)]
pub struct PhraseDeck {
    phrases: Vec<Phrase>,
    current: Option<Uuid>,
}

impl PhraseDeck {
    pub fn new(phrases: Vec<Phrase>) -> Self {
        Self {
            phrases,
            current: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let phrases: Vec<Phrase> = serde_json::from_str(json)?;
        tracing::debug!(count = phrases.len(), "phrases loaded");
        Ok(Self::new(phrases))
    }

    /// The phrase list shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_PHRASES)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The configured phrase file, or the bundled list.
    pub fn load(config: &VocabConfig) -> Result<Self> {
        match &config.phrases_path {
            Some(path) => Self::from_path(Path::new(path)),
            None => Self::bundled(),
        }
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub fn get(&self, id: Uuid) -> Option<&Phrase> {
        self.phrases.iter().find(|p| p.id == id)
    }

    pub fn current(&self) -> Option<&Phrase> {
        self.current.and_then(|id| self.get(id))
    }

    /// Make `id` the current phrase, e.g. when restoring a previous run.
    pub fn set_current(&mut self, id: Uuid) -> Result<&Phrase> {
        let phrase = self.phrases.iter().find(|p| p.id == id).ok_or_else(|| {
            CoreError::from(ValidationError::UnknownItem {
                kind: "phrase",
                value: id.to_string(),
            })
        })?;
        self.current = Some(phrase.id);
        Ok(phrase)
    }

    /// Move to a random phrase other than the current one. A deck of one
    /// keeps showing that phrase.
    pub fn shuffle_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Phrase> {
        let current = self.current;
        let candidates: Vec<&Phrase> = if self.phrases.len() > 1 {
            self.phrases.iter().filter(|p| Some(p.id) != current).collect()
        } else {
            self.phrases.iter().collect()
        };
        let next = candidates.choose(rng)?.id;
        self.current = Some(next);
        self.get(next)
    }

    /// Pick any phrase at random.
    pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Phrase> {
        self.phrases.choose(rng)
    }

    /// Bookmarked phrases in deck order.
    pub fn bookmarked(&self, bookmarks: &BTreeSet<Uuid>) -> Vec<&Phrase> {
        self.phrases
            .iter()
            .filter(|p| bookmarks.contains(&p.id))
            .collect()
    }
}

/// Text handed to the share sheet.
pub fn share_text(phrase: &Phrase) -> String {
    formatdoc! {"
        📚 Word: {word}

        📝 Phrase: {phrase}

        💡 Usage: {usage}

        #VocabularyBuilder #Learning",
        word = phrase.word,
        phrase = phrase.phrase,
        usage = phrase.usage,
    }
}

/// Phrase bookmarks in the kv store, mirrored into the account while
/// signed in.
pub struct PhraseBookmarks<'a> {
    db: &'a Database,
}

impl<'a> PhraseBookmarks<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Current bookmarks. A signed-in account's bookmarks win over the
    /// local list.
    pub fn load(&self) -> Result<BTreeSet<Uuid>> {
        if let Some(account) = AccountStore::new(self.db).current()? {
            return Ok(account.bookmarks);
        }
        Ok(self
            .db
            .kv_get_json::<BTreeSet<Uuid>>(BOOKMARKS_KEY)?
            .unwrap_or_default())
    }

    pub fn save(&self, bookmarks: &BTreeSet<Uuid>) -> Result<()> {
        self.db.kv_set_json(BOOKMARKS_KEY, bookmarks)?;
        let accounts = AccountStore::new(self.db);
        if let Some(mut account) = accounts.current()? {
            account.bookmarks = bookmarks.clone();
            accounts.store(&account)?;
        }
        Ok(())
    }

    /// Flip one bookmark; returns whether it is bookmarked afterwards.
    pub fn toggle(&self, id: Uuid) -> Result<bool> {
        let mut bookmarks = self.load()?;
        let now_bookmarked = if bookmarks.remove(&id) {
            false
        } else {
            bookmarks.insert(id);
            true
        };
        self.save(&bookmarks)?;
        Ok(now_bookmarked)
    }

    pub fn clear(&self) -> Result<()> {
        self.db.kv_delete(BOOKMARKS_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn deck() -> PhraseDeck {
        PhraseDeck::new(vec![
            Phrase::new("Candid", "Truthful and straightforward.", "She gave a candid answer."),
            Phrase::new("Lucid", "Expressed clearly.", "A lucid explanation."),
            Phrase::new("Frugal", "Economical.", "A frugal lifestyle."),
        ])
    }

    #[test]
    fn bundled_deck_loads() {
        let deck = PhraseDeck::bundled().unwrap();
        assert!(deck.phrases().len() >= 20);
        let ids: BTreeSet<_> = deck.phrases().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), deck.phrases().len());
    }

    #[test]
    fn shuffle_never_repeats_current() {
        let mut deck = deck();
        let mut rng = StdRng::seed_from_u64(7);
        let mut previous = deck.shuffle_next(&mut rng).unwrap().id;
        for _ in 0..50 {
            let next = deck.shuffle_next(&mut rng).unwrap().id;
            assert_ne!(next, previous);
            previous = next;
        }
    }

    #[test]
    fn single_phrase_deck_repeats() {
        let only = Phrase::new("Lucid", "Expressed clearly.", "A lucid explanation.");
        let mut deck = PhraseDeck::new(vec![only.clone()]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(deck.shuffle_next(&mut rng).unwrap().id, only.id);
        assert_eq!(deck.shuffle_next(&mut rng).unwrap().id, only.id);
        assert!(PhraseDeck::new(Vec::new()).shuffle_next(&mut rng).is_none());
    }

    #[test]
    fn share_text_layout() {
        let p = Phrase::new("Lucid", "Expressed clearly.", "A lucid explanation.");
        assert_eq!(
            share_text(&p),
            "📚 Word: Lucid\n\n📝 Phrase: Expressed clearly.\n\n💡 Usage: A lucid explanation.\n\n#VocabularyBuilder #Learning"
        );
    }

    #[test]
    fn bookmarks_toggle_and_keep_deck_order() {
        let db = Database::open_memory().unwrap();
        let deck = deck();
        let store = PhraseBookmarks::new(&db);
        let last = deck.phrases()[2].id;
        let first = deck.phrases()[0].id;

        assert!(store.toggle(last).unwrap());
        assert!(store.toggle(first).unwrap());
        let bookmarks = store.load().unwrap();
        let words: Vec<_> = deck.bookmarked(&bookmarks).iter().map(|p| p.word.as_str()).collect();
        assert_eq!(words, vec!["Candid", "Frugal"]);

        assert!(!store.toggle(first).unwrap());
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn set_current_rejects_unknown_ids() {
        let mut deck = deck();
        assert!(deck.set_current(Uuid::new_v4()).is_err());
        let id = deck.phrases()[1].id;
        assert_eq!(deck.set_current(id).unwrap().word, "Lucid");
        assert_eq!(deck.current().unwrap().id, id);
    }
}
