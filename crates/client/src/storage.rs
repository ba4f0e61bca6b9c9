//! Durable credential persistence.
//!
//! Exactly one token is persisted: it is written on login, read on start and
//! removed on logout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use product_desk_core::Credential;
use thiserror::Error;
use tracing::debug;

/// Errors raised by credential storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("credential file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Somewhere the bearer token survives process restarts.
pub trait CredentialStorage: Send + Sync {
    /// Read the persisted credential. `Ok(None)` means nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store exists but cannot be read.
    fn load(&self) -> Result<Option<Credential>, StorageError>;

    /// Persist `credential`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn save(&self, credential: &Credential) -> Result<(), StorageError>;

    /// Remove the persisted credential. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be modified.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Token kept in a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStorage {
    path: PathBuf,
}

impl FileCredentialStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStorage for FileCredentialStorage {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| Credential::new(token)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            // Applies only when the file is created
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;

        // Tighten a file that already existed with a wider mode
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }
        file.write_all(credential.expose().as_bytes())
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "Credential persisted");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Credential removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// Process-local storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStorage {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `credential`.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStorage for MemoryCredentialStorage {
    fn load(&self) -> Result<Option<Credential>, StorageError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCredentialStorage::new(dir.path().join("nested").join("token"));

        assert!(storage.load().unwrap().is_none());

        storage.save(&Credential::new("tok-123")).unwrap();
        let loaded = storage.load().unwrap().unwrap();
        assert_eq!(loaded.expose(), "tok-123");

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_file_storage_clear_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileCredentialStorage::new(dir.path().join("token"));
        assert!(storage.clear().is_ok());
    }

    #[test]
    fn test_file_storage_blank_file_is_anonymous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();
        assert!(FileCredentialStorage::new(path).load().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileCredentialStorage::new(dir.path().join("token"));
        storage.save(&Credential::new("tok")).unwrap();

        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_storage_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "old-token-that-is-longer").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileCredentialStorage::new(&path);
        storage.save(&Credential::new("new")).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(storage.load().unwrap().unwrap().expose(), "new");
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryCredentialStorage::with_credential(Credential::new("abc"));
        assert_eq!(storage.load().unwrap().unwrap().expose(), "abc");
        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
    }
}
