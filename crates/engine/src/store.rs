//! Ledger persistence and the single-writer store.
//!
//! [`LedgerStore`] is the only owner of the live [`Ledger`]. Reads get a
//! snapshot clone; writes go through [`LedgerStore::mutate`], which applies
//! the change to a working copy, persists it and only then publishes it.

use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use tokio::sync::Mutex;

use crate::{EngineError, Ledger, ResultEngine};

/// Where ledger snapshots live.
///
/// Implementations are blocking; the store calls them on the blocking pool
/// with a timeout.
pub trait SnapshotStorage: Send + Sync + 'static {
    /// `Ok(None)` when nothing was saved yet.
    fn load(&self) -> ResultEngine<Option<Ledger>>;
    fn save(&self, ledger: &Ledger) -> ResultEngine<()>;
}

/// Pretty-printed JSON file, replaced atomically on save.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Keeps an unreadable file around instead of overwriting it on the next
    /// save.
    fn preserve_corrupt(&self) {
        let aside = self.path.with_extension("json.corrupt");
        match fs::copy(&self.path, &aside) {
            Ok(_) => tracing::error!(
                path = %self.path.display(),
                copy = %aside.display(),
                "ledger file is corrupt; kept a copy and starting empty"
            ),
            Err(err) => tracing::error!(
                path = %self.path.display(),
                "ledger file is corrupt and could not be copied aside: {err}"
            ),
        }
    }
}

impl SnapshotStorage for JsonFileStorage {
    fn load(&self) -> ResultEngine<Option<Ledger>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_slice::<Ledger>(&bytes) {
            Ok(ledger) => Ok(Some(ledger)),
            Err(err) => {
                self.preserve_corrupt();
                Err(EngineError::Persistence(format!("corrupt ledger file: {err}")))
            }
        }
    }

    fn save(&self, ledger: &Ledger) -> ResultEngine<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(ledger)
            .map_err(|err| EngineError::Persistence(format!("serialize failed: {err}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        match fs::rename(&tmp, &self.path) {
            Ok(()) => Ok(()),
            Err(_) => {
                fs::copy(&tmp, &self.path)?;
                let _ = fs::remove_file(&tmp);
                Ok(())
            }
        }
    }
}

/// Keeps the serialized snapshot in memory. Handy for tests and dry runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    bytes: Arc<StdMutex<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved snapshot, byte for byte.
    pub fn saved_bytes(&self) -> Option<Vec<u8>> {
        self.bytes.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> ResultEngine<Option<Ledger>> {
        let Some(bytes) = self.saved_bytes() else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| EngineError::Persistence(format!("corrupt snapshot: {err}")))
    }

    fn save(&self, ledger: &Ledger) -> ResultEngine<()> {
        let json = serde_json::to_vec_pretty(ledger)
            .map_err(|err| EngineError::Persistence(format!("serialize failed: {err}")))?;
        let mut guard = self
            .bytes
            .lock()
            .map_err(|_| EngineError::Persistence("memory storage poisoned".to_string()))?;
        *guard = Some(json);
        Ok(())
    }
}

pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct LedgerStore {
    ledger: Arc<Mutex<Ledger>>,
    storage: Arc<dyn SnapshotStorage>,
    io_timeout: Duration,
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore")
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

impl LedgerStore {
    /// Return a builder for `LedgerStore`. Help to build the struct.
    pub fn builder() -> LedgerStoreBuilder {
        LedgerStoreBuilder::default()
    }

    /// A clone of the current ledger.
    pub async fn snapshot(&self) -> Ledger {
        self.ledger.lock().await.clone()
    }

    /// Runs `f` against a working copy and commits it.
    ///
    /// The change is published only after it was persisted. If `f` fails, or
    /// the save fails or times out, the live ledger stays as it was.
    ///
    /// A timed out save still holds the lock until the write finishes, so no
    /// later save can be overtaken by it. If the late write did land, the
    /// published ledger is written back over it.
    pub async fn mutate<T, F>(&self, f: F) -> ResultEngine<T>
    where
        F: FnOnce(&mut Ledger) -> ResultEngine<T>,
    {
        let mut guard = self.ledger.lock().await;
        let mut working = guard.clone();
        let value = f(&mut working)?;

        let storage = Arc::clone(&self.storage);
        let mut task = tokio::task::spawn_blocking(move || -> ResultEngine<Ledger> {
            storage.save(&working)?;
            Ok(working)
        });
        let saved = match tokio::time::timeout(self.io_timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(EngineError::Persistence(format!("save task failed: {join}"))),
            Err(_) => {
                if matches!(task.await, Ok(Ok(_))) {
                    self.rewrite(guard.clone()).await;
                }
                Err(EngineError::Persistence(format!(
                    "save timed out after {:?}",
                    self.io_timeout
                )))
            }
        };
        match saved {
            Ok(committed) => {
                *guard = committed;
                Ok(value)
            }
            Err(err) => {
                tracing::error!("ledger save failed, change discarded: {err}");
                Err(err)
            }
        }
    }

    /// Puts `published` back on disk after a discarded change was written late.
    async fn rewrite(&self, published: Ledger) {
        let storage = Arc::clone(&self.storage);
        match tokio::task::spawn_blocking(move || storage.save(&published)).await {
            Ok(Ok(())) => tracing::warn!("late save overwritten with the published ledger"),
            Ok(Err(err)) => {
                tracing::error!("could not restore the published ledger on disk: {err}")
            }
            Err(join) => tracing::error!("restore task failed: {join}"),
        }
    }
}

/// The builder for `LedgerStore`
pub struct LedgerStoreBuilder {
    storage: Arc<dyn SnapshotStorage>,
    io_timeout: Duration,
}

impl Default for LedgerStoreBuilder {
    fn default() -> Self {
        Self {
            storage: Arc::new(MemoryStorage::new()),
            io_timeout: DEFAULT_IO_TIMEOUT,
        }
    }
}

impl LedgerStoreBuilder {
    /// Pass the snapshot storage. Defaults to [`MemoryStorage`].
    pub fn storage(mut self, storage: impl SnapshotStorage) -> LedgerStoreBuilder {
        self.storage = Arc::new(storage);
        self
    }

    pub fn io_timeout(mut self, timeout: Duration) -> LedgerStoreBuilder {
        self.io_timeout = timeout;
        self
    }

    /// Loads the last snapshot and constructs `LedgerStore`.
    ///
    /// A missing or unreadable snapshot yields an empty ledger.
    pub async fn build(self) -> LedgerStore {
        let storage = Arc::clone(&self.storage);
        let loaded = tokio::time::timeout(
            self.io_timeout,
            tokio::task::spawn_blocking(move || storage.load()),
        )
        .await;

        let ledger = match loaded {
            Ok(Ok(Ok(Some(mut ledger)))) => {
                ledger.normalize();
                if let Err(err) = ledger.validate() {
                    tracing::warn!("loaded ledger has inconsistencies: {err}");
                }
                tracing::info!(
                    purchases = ledger.purchases().len(),
                    sales = ledger.sales().len(),
                    "ledger loaded"
                );
                ledger
            }
            Ok(Ok(Ok(None))) => {
                tracing::info!("no ledger snapshot yet, starting empty");
                Ledger::default()
            }
            Ok(Ok(Err(err))) => {
                tracing::error!("ledger load failed, starting empty: {err}");
                Ledger::default()
            }
            Ok(Err(join)) => {
                tracing::error!("ledger load task failed, starting empty: {join}");
                Ledger::default()
            }
            Err(_) => {
                tracing::error!("ledger load timed out, starting empty");
                Ledger::default()
            }
        };

        LedgerStore {
            ledger: Arc::new(Mutex::new(ledger)),
            storage: self.storage,
            io_timeout: self.io_timeout,
        }
    }
}
