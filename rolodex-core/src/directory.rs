//! The directory manager: canonical collection, invariants, filtered view.
//!
//! [`Directory`] is the only owner of the record list. Each mutation runs
//! validate → mutate → persist → refilter. If the store rejects the save,
//! the mutation is reverted before the error is returned, so memory never
//! drifts ahead of what was last stored.

use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::contact::{Contact, ContactPatch, NewContact};
use crate::error::{Result, RolodexError};
use crate::metrics::{CounterSnapshot, DirectoryCounters};
use crate::persistence::{self, ContactStore};
use crate::search;
use crate::types::ContactId;

/// Single-user contact directory.
///
/// Not internally synchronised: one caller issues one operation at a time.
/// A multi-actor host must wrap the whole `Directory` in a lock so that
/// mutate-and-persist is observed atomically.
pub struct Directory {
    store: Box<dyn ContactStore>,
    contacts: Vec<Contact>,
    /// Canonical positions of the records in the filtered view.
    filtered: Vec<usize>,
    /// Normalised form of the last non-blank search.
    active_query: Option<String>,
    counters: DirectoryCounters,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("store", &self.store.name())
            .field("contacts", &self.contacts.len())
            .field("filtered", &self.filtered.len())
            .field("active_query", &self.active_query)
            .finish_non_exhaustive()
    }
}

impl Directory {
    /// Load the canonical collection from `store`. The filtered view starts
    /// out as the full collection.
    pub fn open(store: impl ContactStore + 'static) -> Self {
        Self::open_boxed(Box::new(store))
    }

    /// [`Directory::open`] for a store that is already boxed.
    ///
    /// A stored set that repeats an id or an email is rejected by the store's
    /// decoder, so the directory starts empty rather than broken.
    #[must_use]
    pub fn open_boxed(store: Box<dyn ContactStore>) -> Self {
        let contacts = store.load();
        info!(
            backend = store.name(),
            contacts = contacts.len(),
            "Directory opened"
        );
        let filtered = search::filter_indices(&contacts, None);
        Self {
            store,
            contacts,
            filtered,
            active_query: None,
            counters: DirectoryCounters::new(),
        }
    }

    /// Open the backend named in `config` and load from it.
    ///
    /// # Errors
    /// Returns [`RolodexError::Database`] if the backend cannot be opened.
    pub fn from_config(config: &PersistenceConfig) -> Result<Self> {
        Ok(Self::open_boxed(persistence::open_store(config)?))
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create a record and append it to the directory.
    ///
    /// # Errors
    /// - [`RolodexError::DuplicateEmail`] if any record already holds the
    ///   email, ignoring case. Nothing is stored.
    /// - [`RolodexError::PersistenceWrite`] if the save fails. The record is
    ///   removed again.
    pub fn add(&mut self, fields: NewContact) -> Result<Contact> {
        if self.find_by_email(&fields.email).is_some() {
            DirectoryCounters::inc(&self.counters.rejected_duplicates);
            return Err(RolodexError::DuplicateEmail { email: fields.email });
        }

        let mut contact = Contact::new(fields);
        while self.find_by_id(&contact.id).is_some() {
            warn!(id = %contact.id, "Generated contact id collides, regenerating");
            contact.id = ContactId::new();
        }

        let created = contact.clone();
        self.contacts.push(contact);
        if let Err(e) = self.persist() {
            self.contacts.pop();
            self.refilter();
            return Err(e);
        }
        self.refilter();

        DirectoryCounters::inc(&self.counters.contacts_added);
        debug!(id = %created.id, total = self.contacts.len(), "Contact added");
        Ok(created)
    }

    /// Apply `patch` to the record with `id`.
    ///
    /// # Errors
    /// - [`RolodexError::NotFound`] if no record has `id`.
    /// - [`RolodexError::DuplicateEmail`] if the patch sets an email that a
    ///   *different* record already holds, ignoring case.
    /// - [`RolodexError::PersistenceWrite`] if the save fails. The previous
    ///   field values are restored.
    pub fn update(&mut self, id: &ContactId, patch: ContactPatch) -> Result<Contact> {
        let idx = self
            .position(id)
            .ok_or_else(|| RolodexError::NotFound(id.clone()))?;

        if let Some(email) = &patch.email {
            let taken = self
                .contacts
                .iter()
                .any(|c| c.id != *id && c.email_matches(email));
            if taken {
                DirectoryCounters::inc(&self.counters.rejected_duplicates);
                return Err(RolodexError::DuplicateEmail {
                    email: email.clone(),
                });
            }
        }

        let previous = self.contacts[idx].clone();
        self.contacts[idx].apply_update(&patch);
        if let Err(e) = self.persist() {
            self.contacts[idx] = previous;
            self.refilter();
            return Err(e);
        }
        self.refilter();

        DirectoryCounters::inc(&self.counters.contacts_updated);
        debug!(id = %id, "Contact updated");
        Ok(self.contacts[idx].clone())
    }

    /// Remove the record with `id`.
    ///
    /// Returns `Ok(false)` without touching the store when no record has
    /// that id.
    ///
    /// # Errors
    /// [`RolodexError::PersistenceWrite`] if the save fails. The record is
    /// put back in its original position.
    pub fn delete(&mut self, id: &ContactId) -> Result<bool> {
        let Some(idx) = self.position(id) else {
            return Ok(false);
        };

        let removed = self.contacts.remove(idx);
        if let Err(e) = self.persist() {
            self.contacts.insert(idx, removed);
            self.refilter();
            return Err(e);
        }
        self.refilter();

        DirectoryCounters::inc(&self.counters.contacts_deleted);
        debug!(id = %id, total = self.contacts.len(), "Contact deleted");
        Ok(true)
    }

    /// Drop every record, in memory and in the store.
    ///
    /// The active query is kept.
    pub fn clear_all(&mut self) {
        let dropped = self.contacts.len();
        self.contacts.clear();
        self.filtered.clear();
        self.store.clear();
        info!(dropped, "Directory cleared");
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Set the active query and return the recomputed filtered view.
    ///
    /// A blank query resets the view to the whole directory.
    pub fn search(&mut self, query: &str) -> Vec<Contact> {
        self.active_query = search::normalize_query(query);
        self.refilter();
        DirectoryCounters::inc(&self.counters.searches);
        debug!(
            query = self.active_query.as_deref().unwrap_or(""),
            hits = self.filtered.len(),
            "Search applied"
        );
        self.filtered_contacts()
    }

    /// The normalised active query, if one is set.
    #[must_use]
    pub fn active_query(&self) -> Option<&str> {
        self.active_query.as_deref()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Look up a record by id.
    #[must_use]
    pub fn find_by_id(&self, id: &ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == *id)
    }

    /// Look up a record by email, ignoring case.
    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.email_matches(email))
    }

    /// Copy of the canonical collection, in insertion order.
    #[must_use]
    pub fn all_contacts(&self) -> Vec<Contact> {
        self.contacts.clone()
    }

    /// Copy of the filtered view, in canonical order.
    #[must_use]
    pub fn filtered_contacts(&self) -> Vec<Contact> {
        self.filtered_iter().cloned().collect()
    }

    /// Borrowing iterator over the filtered view.
    pub fn filtered_iter(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.filtered.iter().map(|&i| &self.contacts[i])
    }

    /// Number of records in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the directory holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Number of records in the filtered view.
    #[must_use]
    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// Operation counters since this directory was opened.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn position(&self, id: &ContactId) -> Option<usize> {
        self.contacts.iter().position(|c| c.id == *id)
    }

    fn persist(&self) -> Result<()> {
        match self.store.save(&self.contacts) {
            Ok(()) => {
                DirectoryCounters::inc(&self.counters.saves_completed);
                Ok(())
            }
            Err(e) => {
                DirectoryCounters::inc(&self.counters.save_failures);
                warn!(backend = self.store.name(), error = %e, "Save failed, rolling back");
                Err(e)
            }
        }
    }

    fn refilter(&mut self) {
        self.filtered = search::filter_indices(&self.contacts, self.active_query.as_deref());
    }
}
