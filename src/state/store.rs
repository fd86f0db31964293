//! Sync state persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use fs4::fs_std::FileExt;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::state::model::SyncState;

/// Storage medium for [`SyncState`].
///
/// The whole document is read at run start and replaced at run end.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Read the persisted state. An absent store yields an empty state, which
    /// is persisted immediately so the store exists after first use.
    async fn load(&self) -> Result<SyncState>;

    /// Replace the persisted state.
    async fn save(&self, state: &SyncState) -> Result<()>;
}

/// JSON document on local disk.
///
/// Holds an exclusive advisory lock on `<file>.lock` for its whole lifetime,
/// so two runs can never write the same state concurrently.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Lock is released when the handle is closed.
    _lock_file: std::fs::File,
}

impl JsonFileStore {
    /// Open the store at `path`, taking the advisory lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let lock_path = sibling_path(&path, "lock");
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        lock_file
            .try_lock_exclusive()
            .map_err(|e| lock_error(e, &lock_path))?;

        tracing::debug!("Acquired state lock {}", lock_path.display());

        Ok(Self {
            path,
            _lock_file: lock_file,
        })
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> Result<SyncState> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                tracing::info!("Loading sync state from {}", self.path.display());
                Ok(serde_json::from_str(&content)?)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("Sync state not found, initializing empty state");
                let state = SyncState::default();
                self.save(&state).await?;
                Ok(state)
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn save(&self, state: &SyncState) -> Result<()> {
        tracing::info!("Saving sync state to {}", self.path.display());

        let content = serde_json::to_string_pretty(state)?;
        let tmp_path = sibling_path(&self.path, "tmp");

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

/// In-process store, used when the state should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<SyncState>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    /// An empty store, as on first use.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `state`.
    pub fn with_state(state: SyncState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            saves: AtomicUsize::new(0),
        }
    }

    /// The currently persisted state, if any.
    pub async fn snapshot(&self) -> Option<SyncState> {
        self.state.lock().await.clone()
    }

    /// Number of times `save` has been called.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> Result<SyncState> {
        let existing = self.state.lock().await.clone();
        match existing {
            Some(state) => Ok(state),
            None => {
                let state = SyncState::default();
                self.save(&state).await?;
                Ok(state)
            }
        }
    }

    async fn save(&self, state: &SyncState) -> Result<()> {
        *self.state.lock().await = Some(state.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Contention on the lock means another run holds it; anything else is a
/// plain I/O failure.
fn lock_error(err: std::io::Error, lock_path: &Path) -> Error {
    if err.kind() == ErrorKind::WouldBlock
        || err.raw_os_error() == fs4::lock_contended_error().raw_os_error()
    {
        Error::StateLocked(lock_path.display().to_string())
    } else {
        Error::Io(err)
    }
}

/// `<dir>/<name>.<suffix>` next to `path`.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
