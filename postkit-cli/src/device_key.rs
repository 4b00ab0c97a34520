//! Device key persisted next to the app data.
//!
//! Desktop hosts have no hardware keystore, so the CLI keeps a hex-encoded
//! 32-byte key in `<data_dir>/device.key` and seals credentials with a
//! [`SoftwareKeystore`].

use std::io::ErrorKind;
use std::path::Path;

use eyre::{eyre, Result, WrapErr};
use postkit::storage::SoftwareKeystore;

pub const DEVICE_KEY_FILE: &str = "device.key";

/// Loads the device key from `data_dir`, generating and saving one on first use.
pub async fn load_or_create(data_dir: &Path) -> Result<SoftwareKeystore> {
    let path = data_dir.join(DEVICE_KEY_FILE);
    match tokio::fs::read_to_string(&path).await {
        Ok(encoded) => {
            let bytes = hex::decode(encoded.trim())
                .wrap_err_with(|| format!("device key at {} is not hex", path.display()))?;
            let key: [u8; 32] = bytes
                .try_into()
                .map_err(|_| eyre!("device key at {} must be 32 bytes", path.display()))?;
            Ok(SoftwareKeystore::from_key(key))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tokio::fs::create_dir_all(data_dir)
                .await
                .wrap_err("failed to create data directory")?;
            let keystore = SoftwareKeystore::generate();
            tokio::fs::write(&path, hex::encode(keystore.key_bytes()))
                .await
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            restrict_permissions(&path).await?;
            tracing::info!(path = %path.display(), "generated new device key");
            Ok(keystore)
        }
        Err(e) => Err(e).wrap_err_with(|| format!("failed to read {}", path.display())),
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .wrap_err("failed to restrict device key permissions")
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_key_is_stable_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let first = load_or_create(dir.path()).await.unwrap();
        let second = load_or_create(dir.path()).await.unwrap();
        assert_eq!(first.key_bytes(), second.key_bytes());
    }

    #[tokio::test]
    async fn test_rejects_malformed_key() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEVICE_KEY_FILE), "abcd").unwrap();
        assert!(load_or_create(dir.path()).await.is_err());
    }
}
