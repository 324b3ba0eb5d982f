// Read-only access to the on-disk key-value store.
//
// The scan only needs ordered (key, value) pairs, so storage sits behind
// `RecordSource`. `LevelDbStore` reads an application database directory;
// `MemoryStore` keeps records in a sorted map with the same bytewise order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One raw key/value pair read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Boxed iterator returned by [`RecordSource::records`].
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record, StoreError>> + 'a>;

/// Anything that can yield every record in ascending key order.
pub trait RecordSource {
    /// Start a full forward scan.
    fn records(&mut self) -> Result<RecordIter<'_>, StoreError>;
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be opened.
    #[error("cannot open store {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    /// The store opened but a scan could not be started or continued.
    #[error("store iteration failed: {0}")]
    Iterate(String),
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Sorted in-memory records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> &mut Self {
        self.records.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<K: Into<Vec<u8>>, V: Into<Vec<u8>>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            records: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl RecordSource for MemoryStore {
    fn records(&mut self) -> Result<RecordIter<'_>, StoreError> {
        Ok(Box::new(self.records.iter().map(|(key, value)| {
            Ok(Record {
                key: key.clone(),
                value: value.clone(),
            })
        })))
    }
}

// ---------------------------------------------------------------------------
// LevelDB store
// ---------------------------------------------------------------------------

#[cfg(feature = "leveldb")]
pub use self::leveldb::LevelDbStore;

#[cfg(feature = "leveldb")]
mod leveldb {
    use super::*;

    use rusty_leveldb::{DB, DBIterator, LdbIterator, Options};

    /// An existing LevelDB directory opened for scanning.
    ///
    /// Records are only ever read. The database lock is held until drop.
    pub struct LevelDbStore {
        db: DB,
        path: PathBuf,
    }

    impl LevelDbStore {
        /// Open the database at `path`. A missing database is an error.
        pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
            let path = path.as_ref().to_path_buf();
            let mut opts = Options::default();
            opts.create_if_missing = false;
            let db = DB::open(&path, opts).map_err(|e| StoreError::Open {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            log::info!("opened store {}", path.display());
            Ok(Self { db, path })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl std::fmt::Debug for LevelDbStore {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("LevelDbStore")
                .field("path", &self.path)
                .finish_non_exhaustive()
        }
    }

    impl RecordSource for LevelDbStore {
        fn records(&mut self) -> Result<RecordIter<'_>, StoreError> {
            let iter = self
                .db
                .new_iter()
                .map_err(|e| StoreError::Iterate(e.to_string()))?;
            Ok(Box::new(LevelDbRecords { iter }))
        }
    }

    struct LevelDbRecords {
        iter: DBIterator,
    }

    impl Iterator for LevelDbRecords {
        type Item = Result<Record, StoreError>;

        fn next(&mut self) -> Option<Self::Item> {
            if !LdbIterator::advance(&mut self.iter) {
                return None;
            }
            let mut key = Vec::new();
            let mut value = Vec::new();
            if !LdbIterator::current(&self.iter, &mut key, &mut value) {
                return None;
            }
            Some(Ok(Record { key, value }))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
