//! # MinterStore: Durable Minter State
//!
//! Persists a minter between process runs on sled's embedded key-value
//! store. Everything lives in one `minter` tree:
//!
//! | Key                 | Value                  |
//! |---------------------|------------------------|
//! | `config`            | `bincode(MinterConfig)` |
//! | `state`             | `bincode(MinterState)`  |
//! | `ledger`            | `bincode(L)`            |
//! | `event/` + seq (8B BE) | `bincode(MinterEvent)` |
//!
//! ## Atomicity
//!
//! A save writes config, state, ledger and any new events in a single
//! `Batch` on that one tree, so a crash mid-save leaves either the old
//! snapshot or the new one. A redemption is never half persisted.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Batch, Db, Tree};
use std::path::Path;
use tracing::debug;

use crate::events::MinterEvent;
use crate::state::{MinterConfig, MinterState};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store is not initialized")]
    NotInitialized,

    #[error("store is already initialized")]
    AlreadyInitialized,
}

pub type StoreResult<T> = Result<T, StoreError>;

const KEY_CONFIG: &[u8] = b"config";
const KEY_STATE: &[u8] = b"state";
const KEY_LEDGER: &[u8] = b"ledger";
const EVENT_PREFIX: &[u8] = b"event/";

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn event_key(seq: u64) -> Vec<u8> {
    let mut key = EVENT_PREFIX.to_vec();
    key.extend_from_slice(&seq.to_be_bytes());
    key
}

// ---------------------------------------------------------------------------
// MinterStore
// ---------------------------------------------------------------------------

/// A persisted minter: config, state, ledger and event history.
#[derive(Debug, Clone)]
pub struct MinterStore {
    db: Db,
    minter: Tree,
}

/// Everything needed to rebuild a minter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<L> {
    pub config: MinterConfig,
    pub state: MinterState,
    pub ledger: L,
}

impl MinterStore {
    /// Open or create a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_db(sled::open(path)?)
    }

    /// A store that lives in memory and vanishes on drop.
    pub fn open_temporary() -> StoreResult<Self> {
        Self::from_db(sled::Config::new().temporary(true).open()?)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let minter = db.open_tree("minter")?;
        Ok(Self { db, minter })
    }

    pub fn is_initialized(&self) -> StoreResult<bool> {
        Ok(self.minter.contains_key(KEY_CONFIG)?)
    }

    /// Writes the first snapshot. Fails if one exists already.
    pub fn initialize<L: Serialize>(&self, snapshot: &Snapshot<L>) -> StoreResult<()> {
        if self.is_initialized()? {
            return Err(StoreError::AlreadyInitialized);
        }
        self.save(snapshot, &[])
    }

    /// Atomically replaces the snapshot and appends `events`.
    pub fn save<L: Serialize>(
        &self,
        snapshot: &Snapshot<L>,
        events: &[MinterEvent],
    ) -> StoreResult<()> {
        let mut batch = Batch::default();
        batch.insert(KEY_CONFIG, encode(&snapshot.config)?);
        batch.insert(KEY_STATE, encode(&snapshot.state)?);
        batch.insert(KEY_LEDGER, encode(&snapshot.ledger)?);

        let mut seq = self.event_count() as u64;
        for event in events {
            batch.insert(event_key(seq), encode(event)?);
            seq += 1;
        }

        self.minter.apply_batch(batch)?;
        self.db.flush()?;
        debug!(events = events.len(), "minter snapshot saved");
        Ok(())
    }

    pub fn load<L: DeserializeOwned>(&self) -> StoreResult<Snapshot<L>> {
        let fetch = |key: &[u8]| -> StoreResult<sled::IVec> {
            self.minter.get(key)?.ok_or(StoreError::NotInitialized)
        };
        Ok(Snapshot {
            config: decode(&fetch(KEY_CONFIG)?)?,
            state: decode(&fetch(KEY_STATE)?)?,
            ledger: decode(&fetch(KEY_LEDGER)?)?,
        })
    }

    /// All persisted events in emission order.
    pub fn events(&self) -> StoreResult<Vec<MinterEvent>> {
        let mut events = Vec::new();
        for entry in self.minter.scan_prefix(EVENT_PREFIX) {
            let (_key, value) = entry?;
            events.push(decode(&value)?);
        }
        Ok(events)
    }

    pub fn event_count(&self) -> usize {
        self.minter.scan_prefix(EVENT_PREFIX).count()
    }
}
