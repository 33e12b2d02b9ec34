//! File-backed credential store.
//!
//! Entries live in a flat JSON object at `<config_dir>/parley/credentials.json`.
//! The file is rewritten whole on every `set` and is readable only by the
//! owner on unix.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use parley_common::{CredentialError, CredentialStore};
use tracing::debug;

use crate::toml_loader::config_dir;

const CREDENTIALS_FILE: &str = "credentials.json";

pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at the platform default location.
    pub fn open_default() -> Result<Self, CredentialError> {
        let dir = config_dir().map_err(|e| CredentialError::Unavailable(e.to_string()))?;
        Ok(Self::new(dir.join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&data).map_err(|e| {
            CredentialError::Format(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CredentialError::Format(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        restrict_permissions(&tmp)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        debug!(key, path = %self.path.display(), "stored credential");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CredentialError> {
    Ok(())
}
