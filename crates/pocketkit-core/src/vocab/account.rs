//! A purely local user account. Nothing leaves the device; the password is
//! only checked for presence.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::deck::PhraseBookmarks;
use crate::error::{AccountError, Result};
use crate::storage::Database;

const ACCOUNT_KEY: &str = "user_account";
const SIGNED_IN_KEY: &str = "is_signed_in";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub bookmarks: BTreeSet<Uuid>,
}

pub struct AccountStore<'a> {
    db: &'a Database,
}

fn require(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AccountError::MissingField(field).into());
    }
    Ok(())
}

impl<'a> AccountStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn is_signed_in(&self) -> Result<bool> {
        Ok(self.db.kv_get(SIGNED_IN_KEY)?.as_deref() == Some("true"))
    }

    /// The stored account, signed in or not.
    pub fn stored(&self) -> Result<Option<UserAccount>> {
        self.db.kv_get_json(ACCOUNT_KEY)
    }

    /// The account, only while signed in.
    pub fn current(&self) -> Result<Option<UserAccount>> {
        if !self.is_signed_in()? {
            return Ok(None);
        }
        self.stored()
    }

    pub(crate) fn store(&self, account: &UserAccount) -> Result<()> {
        self.db.kv_set_json(ACCOUNT_KEY, account)
    }

    fn set_signed_in(&self, signed_in: bool) -> Result<()> {
        self.db
            .kv_set(SIGNED_IN_KEY, if signed_in { "true" } else { "false" })
    }

    /// Create the account, carrying over the current bookmarks, and sign in.
    pub fn sign_up(
        &self,
        email: &str,
        name: &str,
        password: &str,
        bookmarks: BTreeSet<Uuid>,
    ) -> Result<UserAccount> {
        require(email, "email")?;
        require(name, "name")?;
        require(password, "password")?;

        let account = UserAccount {
            email: email.trim().to_string(),
            name: name.trim().to_string(),
            bookmarks,
        };
        self.store(&account)?;
        self.set_signed_in(true)?;
        tracing::info!(email = %account.email, "account created");
        Ok(account)
    }

    /// Sign in to the stored account with the same email.
    pub fn sign_in(&self, email: &str, password: &str) -> Result<UserAccount> {
        require(email, "email")?;
        require(password, "password")?;

        let account = self
            .stored()?
            .filter(|a| a.email.eq_ignore_ascii_case(email.trim()))
            .ok_or_else(|| AccountError::UnknownAccount {
                email: email.trim().to_string(),
            })?;
        self.set_signed_in(true)?;
        tracing::info!(email = %account.email, "signed in");
        Ok(account)
    }

    /// Forget the account and its bookmarks.
    pub fn sign_out(&self) -> Result<()> {
        self.db.kv_delete(ACCOUNT_KEY)?;
        PhraseBookmarks::new(self.db).clear()?;
        self.set_signed_in(false)?;
        tracing::info!("signed out");
        Ok(())
    }

    /// Copy `bookmarks` into the account.
    pub fn sync(&self, bookmarks: &BTreeSet<Uuid>) -> Result<UserAccount> {
        let mut account = self.current()?.ok_or(AccountError::NotSignedIn)?;
        account.bookmarks = bookmarks.clone();
        self.store(&account)?;
        tracing::debug!(count = bookmarks.len(), "bookmarks synced to account");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn sign_up_requires_every_field() {
        let db = Database::open_memory().unwrap();
        let store = AccountStore::new(&db);
        let err = store.sign_up("a@b.c", "", "pw", BTreeSet::new()).unwrap_err();
        assert!(matches!(err, CoreError::Account(AccountError::MissingField("name"))));
        assert!(!store.is_signed_in().unwrap());
    }

    #[test]
    fn sign_up_then_sign_in_again() {
        let db = Database::open_memory().unwrap();
        let store = AccountStore::new(&db);
        let id = Uuid::new_v4();
        store
            .sign_up("ada@example.com", "Ada", "secret", BTreeSet::from([id]))
            .unwrap();
        assert!(store.current().unwrap().is_some());

        // Sign-in only needs a matching email and some password.
        db.kv_set(SIGNED_IN_KEY, "false").unwrap();
        assert!(store.current().unwrap().is_none());
        assert!(store.sign_in("bob@example.com", "x").is_err());
        assert!(store.sign_in("ada@example.com", "").is_err());
        let account = store.sign_in("ADA@example.com", "anything").unwrap();
        assert_eq!(account.bookmarks, BTreeSet::from([id]));
    }

    #[test]
    fn bookmark_toggles_follow_the_account() {
        let db = Database::open_memory().unwrap();
        let store = AccountStore::new(&db);
        let bookmarks = PhraseBookmarks::new(&db);
        store
            .sign_up("ada@example.com", "Ada", "secret", BTreeSet::new())
            .unwrap();

        let id = Uuid::new_v4();
        bookmarks.toggle(id).unwrap();
        assert!(store.current().unwrap().unwrap().bookmarks.contains(&id));

        store.sign_out().unwrap();
        assert!(store.stored().unwrap().is_none());
        assert!(bookmarks.load().unwrap().is_empty());
    }

    #[test]
    fn sync_needs_a_session() {
        let db = Database::open_memory().unwrap();
        let store = AccountStore::new(&db);
        assert!(store.sync(&BTreeSet::new()).is_err());

        store.sign_up("ada@example.com", "Ada", "pw", BTreeSet::new()).unwrap();
        let id = Uuid::new_v4();
        let account = store.sync(&BTreeSet::from([id])).unwrap();
        assert!(account.bookmarks.contains(&id));
    }
}
