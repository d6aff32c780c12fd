use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

use crate::constants::FIRMWARE_FILE_NAME;
use crate::error::AppError;

/// Holds at most one firmware image on disk under a fixed name.
///
/// Uploads land in a temporary file first and are renamed over the live
/// image, so a failed write leaves the previous image in place.
pub struct FirmwareStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FirmwareStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(FIRMWARE_FILE_NAME)
    }

    pub async fn store(&self, bytes: &[u8]) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let path = self.path();
        let tmp_path = self.dir.join(format!("{FIRMWARE_FILE_NAME}.tmp"));

        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        if let Err(error) = fs::write(&tmp_path, bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(AppError::Storage(anyhow::Error::new(error).context(format!(
                "Failed writing {}",
                tmp_path.display()
            ))));
        }
        fs::rename(&tmp_path, &path).await.with_context(|| {
            format!(
                "Failed renaming {} -> {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        info!("Stored firmware image {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    pub async fn fetch(&self) -> Result<Vec<u8>, AppError> {
        let path = self.path();
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == ErrorKind::NotFound => Err(AppError::NotFound),
            Err(error) => Err(AppError::Storage(
                anyhow::Error::new(error).context(format!("Failed reading {}", path.display())),
            )),
        }
    }
}

#[cfg(test)]
pub(crate) fn scratch_dir(label: &str) -> PathBuf {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    std::env::temp_dir().join(format!(
        "well-relay-{label}-{}-{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    ))
}
