//! The ledger adapter boundary.
//!
//! CADENZA reads immutable signed records from an append-only ledger through
//! a single seam: [`LedgerAdapter::resolve`]. The adapter owns lookup, retry,
//! consensus, and persistence; this crate only consumes its answers.
//!
//! The dependency graph is assumed acyclic by ledger construction (records
//! are append-only and reference only prior records). The validation engine
//! performs no cycle detection; an adapter that ever served a cyclic graph
//! would make recursive validation non-terminating.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier of a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public key of a record's signer, as reported by the ledger adapter.
///
/// The engine never interprets the key material; it only compares keys for
/// equality. In practice this is the base58 text form the ledger serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A record as it arrives from the ledger: raw payload, signer key, and the
/// fulfillment flag for its cryptographic signing condition.
///
/// An unfulfilled record's payload must not be trusted, regardless of content.
#[derive(Debug, Clone)]
pub struct SignedRecord {
    pub payload: serde_json::Value,
    pub signer: PublicKey,
    pub fulfilled: bool,
}

/// Failures reported by a ledger adapter.
#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("unknown record id: {0}")]
    UnknownId(RecordId),

    #[error("ledger unreachable: {0}")]
    Unreachable(String),
}

/// Resolves an opaque identifier to a signed record.
///
/// Implementations are synchronous; each validation call blocks on every
/// lookup before descending further. Adapters are expected to be cheap to
/// call repeatedly within one validation (the engine memoizes per call, but
/// separate calls re-resolve from scratch).
pub trait LedgerAdapter {
    fn resolve(&self, id: &RecordId) -> Result<SignedRecord, LedgerError>;
}
