//! Persistence boundary for the directory.
//!
//! A [`ContactStore`] saves and loads the *whole* record set as one blob.
//! Three backends ship with the crate:
//!
//! - [`SqliteStore`]: key-value table in SQLite, transactional upsert
//! - [`JsonFileStore`]: one JSON file replaced via temp-file + rename
//! - [`MemoryStore`]: shared in-process buffer, with failure injection
//!
//! Contract shared by every backend:
//! - `save` either stores the full set or returns an error.
//! - `load` never fails: missing, unreadable or malformed data yields an
//!   empty collection. One malformed entry rejects the whole blob, and so
//!   does a repeated id or a repeated email (ignoring case).
//! - `clear` never fails: problems are logged and swallowed.

mod file;
mod memory;
mod sqlite;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::collections::HashSet;

use tracing::info;

use crate::config::{Backend, PersistenceConfig};
use crate::contact::{email_key, Contact};
use crate::error::{Result, RolodexError};

/// Save/load/clear capability over a durable (or not) key-value store.
pub trait ContactStore {
    /// Short backend name used in log fields.
    fn name(&self) -> &'static str;

    /// Durably store the full record set, replacing whatever was there.
    ///
    /// # Errors
    /// Returns [`RolodexError::PersistenceWrite`] (or a more specific
    /// variant) if the set could not be stored in full.
    fn save(&self, contacts: &[Contact]) -> Result<()>;

    /// Read back the last saved set, or an empty one.
    fn load(&self) -> Vec<Contact>;

    /// Remove all persisted data. Best-effort.
    fn clear(&self);
}

impl<S: ContactStore + ?Sized> ContactStore for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn save(&self, contacts: &[Contact]) -> Result<()> {
        (**self).save(contacts)
    }

    fn load(&self) -> Vec<Contact> {
        (**self).load()
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// Encode a record set as a JSON array.
///
/// # Errors
/// Returns [`RolodexError::Serialization`] if encoding fails.
pub fn encode_contacts(contacts: &[Contact]) -> Result<Vec<u8>> {
    serde_json::to_vec(contacts).map_err(|e| RolodexError::Serialization(e.to_string()))
}

/// Decode a JSON array of records. Any malformed entry fails the whole decode.
///
/// A set that repeats an id, or an email ignoring case, is malformed too.
///
/// # Errors
/// Returns [`RolodexError::Serialization`] on malformed input.
pub fn decode_contacts(data: &[u8]) -> Result<Vec<Contact>> {
    let contacts: Vec<Contact> =
        serde_json::from_slice(data).map_err(|e| RolodexError::Serialization(e.to_string()))?;

    let mut ids = HashSet::with_capacity(contacts.len());
    let mut emails = HashSet::with_capacity(contacts.len());
    for contact in &contacts {
        if !ids.insert(contact.id.as_str()) {
            return Err(RolodexError::Serialization(format!(
                "duplicate contact id {}",
                contact.id
            )));
        }
        if !emails.insert(email_key(&contact.email)) {
            return Err(RolodexError::Serialization(format!(
                "duplicate contact email {}",
                contact.email
            )));
        }
    }
    Ok(contacts)
}

/// Open the backend selected by `config`.
///
/// # Errors
/// Returns [`RolodexError::Database`] if the SQLite database cannot be opened.
pub fn open_store(config: &PersistenceConfig) -> Result<Box<dyn ContactStore>> {
    let store: Box<dyn ContactStore> = match config.backend {
        Backend::Sqlite => Box::new(SqliteStore::open(&config.path, config)?),
        Backend::Json => Box::new(JsonFileStore::new(&config.path)),
        Backend::Memory => Box::new(MemoryStore::new()),
    };
    info!(backend = store.name(), "Contact store ready");
    Ok(store)
}
