//! License Persistence
//!
//! The host application owns storage. The client only needs a way to load
//! the current state and to save its serialized form, where `None` erases
//! the stored license.

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LicenseError, Result};
use crate::state::LicenseState;

/// Storage seam between the validator and the host
pub trait LicenseRepository: Send + Sync {
    /// Load the current license; `None` means the host has none to offer
    fn load(&self) -> Result<Option<LicenseState>>;

    /// Store the serialized license, or erase it when `None`
    fn save(&self, serialized: Option<String>) -> Result<()>;
}

/// In-memory repository (for development/testing)
pub struct MemoryLicenseRepository {
    stored: RwLock<Option<String>>,
    saves: AtomicUsize,
}

impl Default for MemoryLicenseRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLicenseRepository {
    pub const fn new() -> Self {
        Self {
            stored: RwLock::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    /// Seed with an existing license
    pub fn with_state(state: &LicenseState) -> Result<Self> {
        Ok(Self {
            stored: RwLock::new(Some(state.to_json()?)),
            saves: AtomicUsize::new(0),
        })
    }

    /// Raw stored document
    pub fn stored(&self) -> Result<Option<String>> {
        let stored = self.stored.read().map_err(|_| poisoned())?;
        Ok(stored.clone())
    }

    /// Number of `save` calls observed
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl LicenseRepository for MemoryLicenseRepository {
    fn load(&self) -> Result<Option<LicenseState>> {
        let stored = self.stored.read().map_err(|_| poisoned())?;
        stored.as_deref().map(LicenseState::from_json).transpose()
    }

    fn save(&self, serialized: Option<String>) -> Result<()> {
        let mut stored = self.stored.write().map_err(|_| poisoned())?;
        *stored = serialized;
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn poisoned() -> LicenseError {
    LicenseError::Storage("license repository lock poisoned".into())
}

/// Single JSON file on disk; erasing deletes the file
#[derive(Clone, Debug)]
pub struct FileLicenseRepository {
    path: PathBuf,
}

impl FileLicenseRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LicenseRepository for FileLicenseRepository {
    fn load(&self) -> Result<Option<LicenseState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        LicenseState::from_json(&content).map(Some)
    }

    fn save(&self, serialized: Option<String>) -> Result<()> {
        match serialized {
            Some(json) => {
                if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir)?;
                }
                std::fs::write(&self.path, json)?;
                tracing::debug!(path = %self.path.display(), "Saved license");
            }
            None => {
                if self.path.exists() {
                    std::fs::remove_file(&self.path)?;
                }
                tracing::debug!(path = %self.path.display(), "Erased license");
            }
        }
        Ok(())
    }
}

/// Adapter for hosts that expose storage as a pair of closures
pub struct CallbackRepository<L, S> {
    load: L,
    save: S,
}

impl<L, S> CallbackRepository<L, S>
where
    L: Fn() -> Option<LicenseState> + Send + Sync,
    S: Fn(Option<String>) + Send + Sync,
{
    pub const fn new(load: L, save: S) -> Self {
        Self { load, save }
    }
}

impl<L, S> LicenseRepository for CallbackRepository<L, S>
where
    L: Fn() -> Option<LicenseState> + Send + Sync,
    S: Fn(Option<String>) + Send + Sync,
{
    fn load(&self) -> Result<Option<LicenseState>> {
        Ok((self.load)())
    }

    fn save(&self, serialized: Option<String>) -> Result<()> {
        (self.save)(serialized);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_memory_repository() {
        let repo = MemoryLicenseRepository::new();
        assert!(repo.load().unwrap().is_none());

        let license = LicenseState::create("http://localhost", "STORE", "SKU", "KEY");
        repo.save(Some(license.to_json().unwrap())).unwrap();
        assert_eq!(repo.load().unwrap(), Some(license));
        assert_eq!(repo.save_count(), 1);

        repo.save(None).unwrap();
        assert!(repo.load().unwrap().is_none());
        assert_eq!(repo.save_count(), 2);
    }

    #[test]
    fn test_file_repository() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileLicenseRepository::new(dir.path().join("nested").join("license.json"));
        assert!(repo.load().unwrap().is_none());

        let license = LicenseState::create("http://localhost", "STORE", "SKU", "KEY");
        repo.save(Some(license.to_string())).unwrap();
        assert_eq!(repo.load().unwrap(), Some(license));

        repo.save(None).unwrap();
        assert!(!repo.path().exists());
        assert!(repo.load().unwrap().is_none());
    }

    #[test]
    fn test_callback_repository() {
        let saved = Mutex::new(Vec::new());
        let repo = CallbackRepository::new(
            || Some(LicenseState::create("u", "s", "k", "key")),
            |serialized| saved.lock().unwrap().push(serialized),
        );

        assert!(repo.load().unwrap().is_some());
        repo.save(None).unwrap();
        assert_eq!(saved.lock().unwrap().as_slice(), &[None]);
    }
}
