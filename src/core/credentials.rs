//! # Credential Storage
//!
//! Where the API token lives between runs. The app only needs
//! load/save/delete; [`FileCredentialStore`] keeps it in
//! `~/.folio/credentials.toml`, [`MemoryCredentialStore`] keeps it for the
//! lifetime of the process (used when the token comes from `FOLIO_TOKEN`).
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::api::Credential;

#[derive(Debug)]
pub enum CredentialError {
    Io(io::Error),
    Parse(String),
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialError::Io(e) => write!(f, "credential I/O error: {e}"),
            CredentialError::Parse(e) => write!(f, "credential file is malformed: {e}"),
        }
    }
}

impl std::error::Error for CredentialError {}

impl From<io::Error> for CredentialError {
    fn from(e: io::Error) -> Self {
        CredentialError::Io(e)
    }
}

pub trait CredentialStore: Send {
    /// `Ok(None)` means no token has been saved yet.
    fn load(&self) -> Result<Option<Credential>, CredentialError>;
    fn save(&self, credential: &Credential) -> Result<(), CredentialError>;
    fn delete(&self) -> Result<(), CredentialError>;
}

#[derive(Serialize, Deserialize, Debug)]
struct CredentialFile {
    token: String,
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `~/.folio/credentials.toml`, or `None` without a home directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".folio").join("credentials.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        if !self.path.exists() {
            debug!("No credential file at {}", self.path.display());
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let file: CredentialFile =
            toml::from_str(&contents).map_err(|e| CredentialError::Parse(e.to_string()))?;
        let credential = Credential::new(file.token);
        Ok((!credential.is_empty()).then_some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = CredentialFile {
            token: credential.as_str().to_string(),
        };
        let contents = toml::to_string(&file).map_err(|e| CredentialError::Parse(e.to_string()))?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        restrict_permissions(&tmp_path)?;
        fs::rename(&tmp_path, &self.path)?;
        info!("Saved credential to {}", self.path.display());
        Ok(())
    }

    fn delete(&self) -> Result<(), CredentialError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            info!("Deleted credential at {}", self.path.display());
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Process-lifetime store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new(initial: Option<Credential>) -> Self {
        Self {
            token: Mutex::new(initial),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Credential>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>, CredentialError> {
        Ok(self.slot().clone())
    }

    fn save(&self, credential: &Credential) -> Result<(), CredentialError> {
        *self.slot() = Some(credential.clone());
        Ok(())
    }

    fn delete(&self) -> Result<(), CredentialError> {
        *self.slot() = None;
        Ok(())
    }
}

/// Store for an interactive session. A `FOLIO_TOKEN` value shadows the file
/// without touching it.
pub fn session_store(env_token: Option<&str>, file_path: Option<PathBuf>) -> Box<dyn CredentialStore> {
    if let Some(token) = env_token {
        info!("Using token from FOLIO_TOKEN");
        return Box::new(MemoryCredentialStore::new(Some(Credential::new(token))));
    }
    match file_path {
        Some(path) => Box::new(FileCredentialStore::new(path)),
        None => {
            log::warn!("No home directory; the token will not persist");
            Box::new(MemoryCredentialStore::new(None))
        }
    }
}

/// Deletes the persisted token file, whether or not `FOLIO_TOKEN` is set.
///
/// Returns whether a file store was available.
pub fn forget_saved(file_path: Option<&Path>) -> Result<bool, CredentialError> {
    match file_path {
        Some(path) => {
            FileCredentialStore::new(path).delete()?;
            Ok(true)
        }
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileCredentialStore {
        let dir = std::env::temp_dir().join(format!("folio-cred-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        FileCredentialStore::new(dir.join("credentials.toml"))
    }

    #[test]
    fn test_file_store_missing_file_is_none() {
        let store = temp_store("missing");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_save_load_delete() {
        let store = temp_store("cycle");
        store.save(&Credential::new("Bearer abc")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Credential::new("Bearer abc")));
        assert!(!store.path().with_extension("tmp").exists());

        store.delete().unwrap();
        assert!(store.load().unwrap().is_none());
        // Deleting twice is fine
        store.delete().unwrap();
    }

    #[test]
    fn test_file_store_malformed_file() {
        let store = temp_store("malformed");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "token = ").unwrap();
        assert!(matches!(store.load(), Err(CredentialError::Parse(_))));
    }

    #[test]
    fn test_file_store_blank_token_is_none() {
        let store = temp_store("blank");
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "token = \"   \"\n").unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_env_token_shadows_file_but_forget_still_deletes_it() {
        let file = temp_store("logout-env");
        file.save(&Credential::new("saved")).unwrap();

        let session = session_store(Some("from-env"), Some(file.path().to_path_buf()));
        assert_eq!(session.load().unwrap(), Some(Credential::new("from-env")));
        // Session store never sees the file
        session.delete().unwrap();
        assert!(file.path().exists());

        assert!(forget_saved(Some(file.path())).unwrap());
        assert!(!file.path().exists());
    }

    #[test]
    fn test_forget_without_home_dir() {
        assert!(!forget_saved(None).unwrap());
        let session = session_store(None, None);
        assert!(session.load().unwrap().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::new(None);
        assert!(store.load().unwrap().is_none());
        store.save(&Credential::new("t")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Credential::new("t")));
        store.delete().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
