use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use postboard_state::detail::{KeyValueStore, StorageError};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Key-value area backed by one file per key under the data directory.
#[derive(Debug)]
pub struct FileStore {
    pub dir: PathBuf,
}

impl FileStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        let dir = data_dir.join("comments");
        fs::create_dir_all(&dir)
            .map_err(|e| backend(format!("failed to create {}: {e}", dir.display())))?;
        info!(dir = %dir.display(), "opened comment store");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(backend(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    #[tracing::instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .map_err(|e| backend(format!("failed reading {}: {e}", path.display())))?;
        Ok(Some(raw))
    }

    #[tracing::instrument(skip(self, value))]
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        debug!(file = %path.display(), bytes = value.len(), "saving atomically");

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(|e| backend(e.to_string()))?;
        temp.write_all(value.as_bytes())
            .and_then(|()| temp.flush())
            .map_err(|e| backend(e.to_string()))?;
        temp.persist(&path)
            .map_err(|err| backend(format!("failed to persist {}: {}", path.display(), err)))?;
        Ok(())
    }
}

fn backend(message: String) -> StorageError {
    StorageError::Backend(message)
}
