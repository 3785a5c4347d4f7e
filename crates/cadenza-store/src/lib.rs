//! cadenza-store
//!
//! Deterministic in-memory ledger for CADENZA:
//! - append-only record map with content-addressed identifiers
//! - canonical JSON bytes (recursively key-sorted objects) for id derivation
//! - a `LedgerAdapter` implementation with lookup counting
//!
//! Intended for tests, development, and embedding. Production deployments
//! implement `LedgerAdapter` against their real ledger; this crate never
//! performs network or filesystem I/O.
//!
//! Record ids are `hex(sha256(domain || signer || canonical payload))`, so a
//! stable input always yields a stable id. The fulfillment flag is stored
//! alongside the record and is not part of the id: this store does not
//! implement signature verification, it only reports the flag it was given.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use cadenza_core::ledger::{LedgerAdapter, LedgerError, PublicKey, RecordId, SignedRecord};
use cadenza_core::model::v1::EntityV1;

/// Domain label mixed into every record id.
const RECORD_DOMAIN: &str = "cadenza.v1.record";

/// Failures specific to the in-memory store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already present: {0}")]
    DuplicateRecord(RecordId),

    #[error("payload serialization failed: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// An append-only, content-addressed record store.
#[derive(Default)]
pub struct MemoryLedger {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    records: BTreeMap<RecordId, SignedRecord>,
    lookups: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its content-addressed id.
    ///
    /// Records are immutable once inserted; appending an identical
    /// payload/signer pair again is rejected as a duplicate.
    pub fn append(
        &self,
        payload: Value,
        signer: PublicKey,
        fulfilled: bool,
    ) -> StoreResult<RecordId> {
        let id = record_id(&payload, &signer)?;
        let mut inner = self.inner.write();
        if inner.records.contains_key(&id) {
            return Err(StoreError::DuplicateRecord(id));
        }
        inner.records.insert(
            id.clone(),
            SignedRecord {
                payload,
                signer,
                fulfilled,
            },
        );
        Ok(id)
    }

    /// Append a typed entity, serializing it to its wire payload (with the
    /// in-band kind tag) first.
    pub fn append_entity(
        &self,
        entity: &EntityV1,
        signer: &PublicKey,
        fulfilled: bool,
    ) -> StoreResult<RecordId> {
        let payload = entity
            .to_payload()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.append(payload, signer.clone(), fulfilled)
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().records.is_empty()
    }

    /// Total number of `resolve` calls served, successful or not.
    pub fn lookup_count(&self) -> u64 {
        self.inner.read().lookups
    }
}

impl LedgerAdapter for MemoryLedger {
    fn resolve(&self, id: &RecordId) -> Result<SignedRecord, LedgerError> {
        let mut inner = self.inner.write();
        inner.lookups += 1;
        inner
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownId(id.clone()))
    }
}

/// Content-address a record.
fn record_id(payload: &Value, signer: &PublicKey) -> StoreResult<RecordId> {
    let mut hasher = Sha256::new();
    hasher.update(RECORD_DOMAIN.as_bytes());
    hasher.update(signer.as_str().as_bytes());
    hasher.update(&canonical_bytes(payload)?);
    Ok(RecordId::new(hex::encode(hasher.finalize())))
}

/// Canonical JSON bytes: objects re-serialized with keys in sorted order,
/// arrays in place, no added whitespace.
fn canonical_bytes(value: &Value) -> StoreResult<Vec<u8>> {
    serde_json::to_vec(&canonical_value(value))
        .map_err(|e| StoreError::Serialization(e.to_string()))
}

fn canonical_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<(&String, &Value)> = map.iter().collect();
            sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
            let mut out = Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), canonical_value(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_value).collect()),
        other => other.clone(),
    }
}
