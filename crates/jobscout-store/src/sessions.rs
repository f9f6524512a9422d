use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use jobscout_core::types::AccountId;

use crate::error::Result;

/// Storage abstraction for opaque per-account platform session blobs
/// (auth keys, server salts — whatever the platform client needs to
/// reconnect without re-authenticating).
///
/// The store never interprets the bytes; that is the platform client's
/// job. Keeping the boundary opaque means swapping the underlying
/// platform client never touches this crate.
pub trait SessionStore: Send + Sync {
    fn load(&self, account_id: AccountId) -> Result<Option<Vec<u8>>>;
    fn save(&self, account_id: AccountId, blob: &[u8]) -> Result<()>;
    fn delete(&self, account_id: AccountId) -> Result<()>;
}

/// Default file-per-account session store.
///
/// Each account's blob lives at `{root}/{account_id}.session`. A `Mutex`
/// serialises writes so two tasks never interleave a partial write to
/// the same file; reads and writes of different accounts never block
/// each other at the OS level, but the single lock keeps the
/// implementation simple and matches the single-node deployment target.
pub struct FileSessionStore {
    root: PathBuf,
    lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, account_id: AccountId) -> PathBuf {
        self.root.join(format!("{account_id}.session"))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, account_id: AccountId) -> Result<Option<Vec<u8>>> {
        let _guard = self.lock.lock().unwrap();
        let path = self.path_for(account_id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, account_id: AccountId, blob: &[u8]) -> Result<()> {
        let _guard = self.lock.lock().unwrap();
        let path = self.path_for(account_id);
        let tmp = path.with_extension("session.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn delete(&self, account_id: AccountId) -> Result<()> {
        let _guard = self.lock.lock().unwrap();
        let path = self.path_for(account_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Root directory a `FileSessionStore` should be built against, creating
/// it if missing.
pub fn default_sessions_root(configured: &str) -> PathBuf {
    Path::new(configured).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        assert!(store.load(1).unwrap().is_none());
        store.save(1, b"auth-key-bytes").unwrap();
        assert_eq!(store.load(1).unwrap().unwrap(), b"auth-key-bytes");
    }

    #[test]
    fn delete_missing_account_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        store.delete(99).unwrap();
    }

    #[test]
    fn save_overwrites_existing_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        store.save(2, b"first").unwrap();
        store.save(2, b"second").unwrap();
        assert_eq!(store.load(2).unwrap().unwrap(), b"second");
    }
}
