//! File system-backed key-value store.
//!
//! Every key maps to one file inside the store directory. Writes follow the
//! write-to-temp-then-rename pattern so readers always see either the old or
//! the new value, never a partial write:
//!
//! 1. Write data to `.<key>.<pid>.<n>.tmp` in the same directory, unique per
//!    write so concurrent writers never share a temporary file
//! 2. `fsync` the temporary file
//! 3. Rename the temporary file over `<key>`

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{KeyValueStore, StorageError, StorageResult};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File system implementation of [`KeyValueStore`].
///
/// Keys are restricted to ASCII alphanumerics plus `.`, `_` and `-` and may
/// not start with `.`, so a key can never escape the store directory or
/// collide with a temporary file.
#[derive(Debug, Clone)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `directory`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open<P: AsRef<Path>>(directory: P) -> StorageResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::create_dir_all(&directory).await.map_err(|e| {
            StorageError::write(
                directory.display().to_string(),
                format!("failed to create store directory: {e}"),
            )
        })?;
        Ok(Self { directory })
    }

    /// Returns the directory holding the store's files.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn value_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.directory.join(key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.directory
            .join(format!(".{key}.{}.{n}.tmp", std::process::id()))
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.value_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::read(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let final_path = self.value_path(key)?;
        let temp_path = self.temp_path(key);

        let written = async {
            let mut file = fs::File::create(&temp_path)
                .await
                .map_err(|e| format!("create temp file: {e}"))?;
            file.write_all(value.as_bytes())
                .await
                .map_err(|e| format!("write temp file: {e}"))?;
            file.sync_all()
                .await
                .map_err(|e| format!("sync temp file: {e}"))?;
            drop(file);
            fs::rename(&temp_path, &final_path)
                .await
                .map_err(|e| format!("rename temp file: {e}"))
        }
        .await;

        if let Err(message) = written {
            // Best effort; the temp file may never have been created.
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::write(key, message));
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.value_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::write(key, e)),
        }
    }
}
