//! Error types for cadenza-core.
//!
//! The taxonomy is closed: each variant is a distinct failure kind the
//! embedding service can match on. Failures that occur while crossing an edge
//! of the dependency graph are tagged with the entity kind being resolved at
//! the time, so a caller can tell where in the graph validation stopped.
//!
//! Propagation policy: validation returns the first error encountered. There
//! is no aggregation, no partial success, and no retry here; retry/backoff
//! belongs to the ledger adapter.

use thiserror::Error;

use crate::ledger::{LedgerError, RecordId};
use crate::model::EntityKind;

/// Result alias used throughout cadenza-core.
pub type CadenzaResult<T> = Result<T, CadenzaError>;

/// Validation failure kinds.
#[derive(Debug, Error)]
pub enum CadenzaError {
    /// The identifier did not resolve in the ledger. The adapter failure is
    /// carried verbatim as the source.
    #[error("lookup failed for {kind} {id}")]
    LookupFailed {
        kind: EntityKind,
        id: RecordId,
        #[source]
        source: LedgerError,
    },

    /// The record's cryptographic signing condition is not satisfied. Its
    /// payload must not be trusted.
    #[error("{kind} {id} has an unsatisfied signing condition")]
    UnfulfilledRecord { kind: EntityKind, id: RecordId },

    /// The payload fails structural schema validation for its declared kind.
    #[error("malformed {kind}: {reason}")]
    MalformedEntity { kind: EntityKind, reason: String },

    /// The signer's key matches no role permitted to author this entity kind.
    #[error("unauthorized signer: {reason}")]
    UnauthorizedSigner { reason: String },

    /// Signer key mismatch in a context requiring exact identity.
    #[error("invalid key: {reason}")]
    InvalidKey { reason: String },

    /// A business-rule invariant failed. The reason names the invariant.
    #[error("criteria not met: {reason}")]
    CriteriaNotMet { reason: String },
}

impl CadenzaError {
    pub fn lookup_failed(kind: EntityKind, id: &RecordId, source: LedgerError) -> Self {
        Self::LookupFailed {
            kind,
            id: id.clone(),
            source,
        }
    }

    pub fn unfulfilled(kind: EntityKind, id: &RecordId) -> Self {
        Self::UnfulfilledRecord {
            kind,
            id: id.clone(),
        }
    }

    pub fn malformed(kind: EntityKind, reason: impl Into<String>) -> Self {
        Self::MalformedEntity {
            kind,
            reason: reason.into(),
        }
    }

    pub fn unauthorized_signer(reason: impl Into<String>) -> Self {
        Self::UnauthorizedSigner {
            reason: reason.into(),
        }
    }

    pub fn invalid_key(reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            reason: reason.into(),
        }
    }

    pub fn criteria_not_met(reason: impl Into<String>) -> Self {
        Self::CriteriaNotMet {
            reason: reason.into(),
        }
    }
}
