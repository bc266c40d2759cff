//! In-process contact store.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{decode_contacts, encode_contacts, ContactStore};
use crate::contact::Contact;
use crate::error::{Result, RolodexError};

#[derive(Debug, Default)]
struct Inner {
    blob: Option<Vec<u8>>,
    fail_saves: bool,
    save_count: usize,
}

/// Keeps the encoded directory in memory.
///
/// Clones share the same buffer, so a test can hand one clone to a
/// [`Directory`](crate::Directory) and inspect or sabotage it through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.inner.lock().fail_saves = fail;
    }

    /// Number of saves accepted so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.inner.lock().save_count
    }

    /// Install raw bytes as if they had been saved, bypassing encoding.
    pub fn seed_raw(&self, data: impl Into<Vec<u8>>) {
        self.inner.lock().blob = Some(data.into());
    }

    /// Whether any data is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().blob.is_none()
    }
}

impl ContactStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn save(&self, contacts: &[Contact]) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.fail_saves {
            return Err(RolodexError::PersistenceWrite(
                "memory store is rejecting writes".to_string(),
            ));
        }
        let blob = encode_contacts(contacts).map_err(RolodexError::write)?;
        debug!(contacts = contacts.len(), bytes = blob.len(), "Saved contacts");
        inner.blob = Some(blob);
        inner.save_count += 1;
        Ok(())
    }

    fn load(&self) -> Vec<Contact> {
        let inner = self.inner.lock();
        let Some(blob) = inner.blob.as_deref() else {
            return Vec::new();
        };
        decode_contacts(blob).unwrap_or_else(|e| {
            warn!(error = %e, "Malformed contacts in memory store, starting empty");
            Vec::new()
        })
    }

    fn clear(&self) {
        self.inner.lock().blob = None;
    }
}
