//! Two-slot asset store for the generated skybox.
//!
//! The store owns one directory holding at most two files: the `current`
//! asset (what the Unity client loads) and the `previous` one. A swap demotes
//! `current` to `previous` and installs the new bytes as `current`.
//!
//! Swaps are serialized through an async mutex, and the new bytes must be
//! validated and staged on disk before anything is rotated. `current` is
//! replaced by a single rename, so readers never observe an empty slot and a
//! rejected or interrupted update never removes the last good `current`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::media;

/// File name of the `current` slot used by the Unity project.
pub const DEFAULT_CURRENT_NAME: &str = "new.jpg";
/// File name of the `previous` slot used by the Unity project.
pub const DEFAULT_PREVIOUS_NAME: &str = "old.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Current,
    Previous,
}

/// Result of a successful [`AssetStore::swap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub bytes_written: usize,
    /// `true` when an existing `current` was demoted to `previous`.
    pub rotated: bool,
}

#[derive(Debug)]
pub struct AssetStore {
    dir: PathBuf,
    current_name: String,
    previous_name: String,
    rotation: Mutex<()>,
}

impl AssetStore {
    pub fn new(
        dir: impl Into<PathBuf>,
        current_name: impl Into<String>,
        previous_name: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            current_name: current_name.into(),
            previous_name: previous_name.into(),
            rotation: Mutex::new(()),
        }
    }

    /// Store using the `new.jpg` / `old.jpg` naming.
    pub fn with_default_names(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, DEFAULT_CURRENT_NAME, DEFAULT_PREVIOUS_NAME)
    }

    pub fn path(&self, slot: Slot) -> PathBuf {
        match slot {
            Slot::Current => self.dir.join(&self.current_name),
            Slot::Previous => self.dir.join(&self.previous_name),
        }
    }

    /// Read a slot, returning `None` if it is empty.
    pub async fn read(&self, slot: Slot) -> Result<Option<Vec<u8>>, CoreError> {
        match fs::read(self.path(slot)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the `current` asset; an empty slot is [`CoreError::NotFound`].
    pub async fn read_current(&self) -> Result<Vec<u8>, CoreError> {
        self.read(Slot::Current).await?.ok_or_else(|| {
            CoreError::NotFound(format!("{} not found", self.path(Slot::Current).display()))
        })
    }

    /// Install `bytes` as the new `current` asset.
    ///
    /// The bytes must sniff as a supported image. They are written to a
    /// staging file first. Under the rotation lock `previous` is then
    /// replaced by a link to (or copy of) `current`, and the staging file is
    /// renamed over `current`.
    pub async fn swap(&self, bytes: &[u8]) -> Result<SwapOutcome, CoreError> {
        media::sniff_image(bytes)?;

        fs::create_dir_all(&self.dir).await?;
        let staging = self.dir.join(format!(
            ".{}.{}.partial",
            self.current_name,
            uuid::Uuid::new_v4().simple()
        ));
        fs::write(&staging, bytes).await?;

        let result = self.rotate_into_place(&staging).await;
        if result.is_err() {
            // Best effort: the staging file is ours alone.
            let _ = fs::remove_file(&staging).await;
        }
        let rotated = result?;

        tracing::debug!(
            dir = %self.dir.display(),
            bytes = bytes.len(),
            rotated,
            "Asset swapped"
        );

        Ok(SwapOutcome {
            bytes_written: bytes.len(),
            rotated,
        })
    }

    async fn rotate_into_place(&self, staging: &Path) -> Result<bool, CoreError> {
        let _guard = self.rotation.lock().await;

        let current = self.path(Slot::Current);
        let previous = self.path(Slot::Previous);

        let rotated = if fs::try_exists(&current).await? {
            remove_if_exists(&previous).await?;
            if let Err(e) = fs::hard_link(&current, &previous).await {
                tracing::debug!(error = %e, "Hard link failed, copying previous asset");
                fs::copy(&current, &previous).await?;
            }
            true
        } else {
            false
        };

        // Atomic replace: `current` always names a whole file.

        fs::rename(staging, &current).await?;
        Ok(rotated)
    }
}

async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
