//! JSON file contact store.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use super::{decode_contacts, encode_contacts, ContactStore};
use crate::contact::Contact;
use crate::error::{Result, RolodexError};

/// Stores the directory as a single JSON array in one file.
///
/// Saves go to a sibling `*.tmp` file which is synced and then renamed over
/// the target, so the file on disk is always a complete set. The parent
/// directory is synced after the rename so the new entry survives a crash.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Directory holding the file; `.` for a bare file name.
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Flush the directory entry written by the rename.
    #[cfg(unix)]
    fn sync_parent(&self) -> std::io::Result<()> {
        File::open(self.parent_dir())?.sync_all()
    }

    /// Directories cannot be opened for syncing here; the rename is left to the OS.
    #[cfg(not(unix))]
    fn sync_parent(&self) -> std::io::Result<()> {
        Ok(())
    }

    fn try_save(&self, contacts: &[Contact]) -> Result<usize> {
        let json = encode_contacts(contacts)?;
        fs::create_dir_all(self.parent_dir())?;

        let tmp = self.tmp_path();
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(&json)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        self.sync_parent()?;
        Ok(json.len())
    }
}

impl ContactStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "json"
    }

    fn save(&self, contacts: &[Contact]) -> Result<()> {
        let start = Instant::now();
        let bytes = self.try_save(contacts).map_err(RolodexError::write)?;
        debug!(
            path = %self.path.display(),
            contacts = contacts.len(),
            bytes,
            elapsed_us = start.elapsed().as_micros(),
            "Saved contacts"
        );
        Ok(())
    }

    fn load(&self) -> Vec<Contact> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Could not read contacts file, starting empty"
                );
                return Vec::new();
            }
        };

        match decode_contacts(&data) {
            Ok(contacts) => {
                debug!(path = %self.path.display(), contacts = contacts.len(), "Loaded contacts");
                contacts
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Malformed contacts file, starting empty"
                );
                Vec::new()
            }
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!(path = %self.path.display(), "Removed contacts file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove contacts file"
            ),
        }
    }
}
