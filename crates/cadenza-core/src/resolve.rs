//! Entity resolution.
//!
//! Resolving an identifier as a given entity kind is the single choke point
//! for crossing an edge of the dependency graph: ledger lookup, fulfillment
//! gate, then schema check. No other component talks to the ledger adapter
//! or the schema layer directly.
//!
//! Each failure is tagged with the kind that was expected at the time, so a
//! caller can tell where in the graph validation stopped.

use serde_json::Value;

use crate::errors::{CadenzaError, CadenzaResult};
use crate::ledger::{LedgerAdapter, PublicKey, RecordId};
use crate::model::v1::EntityV1;
use crate::model::EntityKind;
use crate::schema;

/// A record resolved through the ledger and shape-checked: the typed payload
/// plus the public key that signed it.
#[derive(Debug, Clone)]
pub struct ResolvedEntity {
    pub entity: EntityV1,
    pub signer: PublicKey,
}

/// Resolve `id` as `kind`: ledger lookup, fulfillment check, schema check.
pub fn resolve_entity(
    ledger: &dyn LedgerAdapter,
    id: &RecordId,
    kind: EntityKind,
) -> CadenzaResult<ResolvedEntity> {
    let record = ledger
        .resolve(id)
        .map_err(|source| CadenzaError::lookup_failed(kind, id, source))?;

    if !record.fulfilled {
        return Err(CadenzaError::unfulfilled(kind, id));
    }

    let entity = decode_payload(kind, &record.payload)?;
    Ok(ResolvedEntity {
        entity,
        signer: record.signer,
    })
}

/// Shape-check an already-resolved payload as `kind`.
///
/// Used by the validation entry points that accept a pre-resolved
/// (payload, signer key) pair instead of an identifier.
pub fn decode_payload(kind: EntityKind, payload: &Value) -> CadenzaResult<EntityV1> {
    schema::decode(kind, payload).map_err(|e| CadenzaError::malformed(kind, e.to_string()))
}
