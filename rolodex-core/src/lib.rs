//! # Rolodex Core Library
//!
//! In-memory contact directory with a pluggable persistence boundary.
//!
//! The [`Directory`] owns the canonical, insertion-ordered list of
//! [`Contact`] records and a derived filtered view driven by the active
//! search query. Every mutation is validated (case-insensitive email
//! uniqueness), persisted through a [`ContactStore`], and followed by a
//! recomputation of the filtered view.
//!
//! Backends:
//! - [`persistence::SqliteStore`]: single-key blob in an SQLite database
//! - [`persistence::JsonFileStore`]: one JSON file, atomically replaced
//! - [`persistence::MemoryStore`]: in-process stub for tests and previews
//!
//! The directory is single-actor: callers issue one operation at a time and
//! no internal locking is performed.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod contact;
pub mod directory;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod persistence;
pub mod search;
pub mod types;

pub use config::RolodexConfig;
pub use contact::{Contact, ContactPatch, NewContact};
pub use directory::Directory;
pub use error::RolodexError;
pub use persistence::ContactStore;
pub use types::*;
