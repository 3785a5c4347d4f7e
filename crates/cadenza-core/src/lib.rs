//! cadenza-core
//!
//! Core primitives for CADENZA:
//! - Entity models for signed rights records (v1)
//! - Structural schema validation for ledger payloads
//! - The ledger adapter boundary (resolve an identifier to a signed record)
//! - The provenance validation engine (chain-of-custody checks over the
//!   dependency graph of compositions, recordings, and licenses)
//!
//! The engine never fetches, stores, signs, or constructs records, and it
//! implements no cryptographic primitives. It asks the ledger adapter whether
//! a record's signing condition is fulfilled and which public key authored
//! it, then enforces the authorship and rights-consistency rules across the
//! record's transitive dependencies.

pub mod errors;
pub mod ledger;
pub mod model;
pub mod resolve;
pub mod schema;
pub mod validate;

pub use crate::errors::{CadenzaError, CadenzaResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::errors::{CadenzaError, CadenzaResult};
    pub use crate::ledger::{LedgerAdapter, LedgerError, PublicKey, RecordId, SignedRecord};
    pub use crate::model::v1::{
        AgentV1, CompositionV1, EntityV1, PublishingLicenseV1, RecordingLicenseV1, RecordingV1,
        RightV1,
    };
    pub use crate::model::EntityKind;
    pub use crate::resolve::{resolve_entity, ResolvedEntity};
    pub use crate::validate::ProvenanceValidator;
}
