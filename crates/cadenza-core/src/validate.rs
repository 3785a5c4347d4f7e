//! The provenance validation engine.
//!
//! Five mutually-recursive validation routines, one per entity kind. Each
//! walks the dependency graph depth-first through the entity resolver,
//! enforces the authorship and rights-consistency invariants for its kind,
//! and returns the validated payload, or the first error encountered, with
//! no aggregation and no partial results.
//!
//! Entry points come in pairs: by identifier (resolve first) and
//! pre-resolved (the caller already holds the payload and its signer key and
//! must not pay a second ledger round trip for the record itself).
//!
//! Each top-level call owns a fresh memo table keyed by record id. An entity
//! validated once within a call is not re-resolved or re-validated when the
//! graph reaches it again; failures are never memoized, so a transient
//! ledger fault is retried by the next call. Nothing is shared between
//! calls, which keeps validation idempotent and free of hidden state.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, trace};

use crate::errors::{CadenzaError, CadenzaResult};
use crate::ledger::{LedgerAdapter, PublicKey, RecordId};
use crate::model::v1::{
    AgentV1, CompositionV1, EntityV1, PublishingLicenseV1, RecordingLicenseV1, RecordingV1,
};
use crate::model::EntityKind;
use crate::resolve::{decode_payload, resolve_entity, ResolvedEntity};

/// Per-call memo of successfully validated records.
type Memo = BTreeMap<RecordId, ResolvedEntity>;

/// Validates chain-of-custody for rights records against a ledger.
///
/// The validator borrows the adapter and holds no other state; it is cheap
/// to construct per call or to keep around.
pub struct ProvenanceValidator<'a> {
    ledger: &'a dyn LedgerAdapter,
}

impl<'a> ProvenanceValidator<'a> {
    pub fn new(ledger: &'a dyn LedgerAdapter) -> Self {
        Self { ledger }
    }

    // ---- agents ----

    /// Validate an agent by identifier. Leaf case: resolution plus schema
    /// check, no further invariants.
    pub fn validate_agent_by_id(&self, id: &RecordId) -> CadenzaResult<AgentV1> {
        debug!(%id, "validating agent");
        let mut memo = Memo::new();
        Ok(self.agent_by_id(&mut memo, id)?.0)
    }

    /// Validate an already-resolved agent payload. The signer key carries no
    /// constraint for agents; it is accepted for interface symmetry.
    pub fn validate_agent(&self, payload: &Value, _signer: &PublicKey) -> CadenzaResult<AgentV1> {
        decode_payload(EntityKind::Agent, payload)?.into_agent()
    }

    // ---- compositions ----

    /// Validate a composition by identifier, including its composer,
    /// publisher, and every right holder.
    pub fn validate_composition_by_id(&self, id: &RecordId) -> CadenzaResult<CompositionV1> {
        debug!(%id, "validating composition");
        let mut memo = Memo::new();
        self.composition_by_id(&mut memo, id)
    }

    /// Validate an already-resolved composition payload and its signer key.
    pub fn validate_composition(
        &self,
        payload: &Value,
        signer: &PublicKey,
    ) -> CadenzaResult<CompositionV1> {
        let composition = decode_payload(EntityKind::Composition, payload)?.into_composition()?;
        let mut memo = Memo::new();
        self.check_composition(&mut memo, &composition, signer)?;
        Ok(composition)
    }

    // ---- recordings ----

    /// Validate a recording by identifier, including the full re-validation
    /// of its referenced composition.
    pub fn validate_recording_by_id(&self, id: &RecordId) -> CadenzaResult<RecordingV1> {
        debug!(%id, "validating recording");
        let mut memo = Memo::new();
        self.recording_by_id(&mut memo, id)
    }

    /// Validate an already-resolved recording payload and its signer key.
    pub fn validate_recording(
        &self,
        payload: &Value,
        signer: &PublicKey,
    ) -> CadenzaResult<RecordingV1> {
        let recording = decode_payload(EntityKind::Recording, payload)?.into_recording()?;
        let mut memo = Memo::new();
        self.check_recording(&mut memo, &recording, signer)?;
        Ok(recording)
    }

    // ---- publishing licenses ----

    /// Validate a publishing license by identifier.
    pub fn validate_publishing_license_by_id(
        &self,
        id: &RecordId,
    ) -> CadenzaResult<PublishingLicenseV1> {
        debug!(%id, "validating publishing license");
        let mut memo = Memo::new();
        let resolved = resolve_entity(self.ledger, id, EntityKind::PublishingLicense)?;
        let license = resolved.entity.into_publishing_license()?;
        self.check_publishing_license(&mut memo, &license, &resolved.signer)?;
        Ok(license)
    }

    /// Validate an already-resolved publishing license payload and the key
    /// that signed the license record.
    pub fn validate_publishing_license(
        &self,
        payload: &Value,
        signer: &PublicKey,
    ) -> CadenzaResult<PublishingLicenseV1> {
        let license =
            decode_payload(EntityKind::PublishingLicense, payload)?.into_publishing_license()?;
        let mut memo = Memo::new();
        self.check_publishing_license(&mut memo, &license, signer)?;
        Ok(license)
    }

    // ---- recording licenses ----

    /// Validate a recording license by identifier.
    pub fn validate_recording_license_by_id(
        &self,
        id: &RecordId,
    ) -> CadenzaResult<RecordingLicenseV1> {
        debug!(%id, "validating recording license");
        let mut memo = Memo::new();
        let resolved = resolve_entity(self.ledger, id, EntityKind::RecordingLicense)?;
        let license = resolved.entity.into_recording_license()?;
        self.check_recording_license(&mut memo, &license, &resolved.signer)?;
        Ok(license)
    }

    /// Validate an already-resolved recording license payload and the key
    /// that signed the license record.
    pub fn validate_recording_license(
        &self,
        payload: &Value,
        signer: &PublicKey,
    ) -> CadenzaResult<RecordingLicenseV1> {
        let license =
            decode_payload(EntityKind::RecordingLicense, payload)?.into_recording_license()?;
        let mut memo = Memo::new();
        self.check_recording_license(&mut memo, &license, signer)?;
        Ok(license)
    }

    // ---- recursive internals ----

    fn agent_by_id(&self, memo: &mut Memo, id: &RecordId) -> CadenzaResult<(AgentV1, PublicKey)> {
        if let Some(hit) = memo.get(id) {
            if let EntityV1::Agent(agent) = &hit.entity {
                trace!(%id, "memo hit: agent");
                return Ok((agent.clone(), hit.signer.clone()));
            }
        }
        let resolved = resolve_entity(self.ledger, id, EntityKind::Agent)?;
        let agent = resolved.entity.clone().into_agent()?;
        let signer = resolved.signer.clone();
        memo.insert(id.clone(), resolved);
        Ok((agent, signer))
    }

    fn composition_by_id(&self, memo: &mut Memo, id: &RecordId) -> CadenzaResult<CompositionV1> {
        if let Some(hit) = memo.get(id) {
            if let EntityV1::Composition(composition) = &hit.entity {
                trace!(%id, "memo hit: composition");
                return Ok(composition.clone());
            }
        }
        let resolved = resolve_entity(self.ledger, id, EntityKind::Composition)?;
        let composition = resolved.entity.clone().into_composition()?;
        self.check_composition(memo, &composition, &resolved.signer)?;
        memo.insert(id.clone(), resolved);
        Ok(composition)
    }

    fn recording_by_id(&self, memo: &mut Memo, id: &RecordId) -> CadenzaResult<RecordingV1> {
        if let Some(hit) = memo.get(id) {
            if let EntityV1::Recording(recording) = &hit.entity {
                trace!(%id, "memo hit: recording");
                return Ok(recording.clone());
            }
        }
        let resolved = resolve_entity(self.ledger, id, EntityKind::Recording)?;
        let recording = resolved.entity.clone().into_recording()?;
        self.check_recording(memo, &recording, &resolved.signer)?;
        memo.insert(id.clone(), resolved);
        Ok(recording)
    }

    /// Composer and publisher must be valid agents, the record must be
    /// signed by one of them, and every right holder must be a valid agent.
    fn check_composition(
        &self,
        memo: &mut Memo,
        composition: &CompositionV1,
        signer: &PublicKey,
    ) -> CadenzaResult<()> {
        let (_, composer_key) = self.agent_by_id(memo, &composition.composer)?;
        let (_, publisher_key) = self.agent_by_id(memo, &composition.publisher)?;

        if *signer != composer_key && *signer != publisher_key {
            return Err(CadenzaError::unauthorized_signer(
                "composition must be signed by composer or publisher",
            ));
        }

        for right in &composition.rights {
            trace!(holder = %right.holder, "validating composition right holder");
            self.agent_by_id(memo, &right.holder)?;
        }
        Ok(())
    }

    /// The referenced composition is fully re-validated; the signer must be
    /// the label or the performer and must hold rights in that composition;
    /// the producer must be a valid agent but is not required to be a right
    /// holder or signer.
    fn check_recording(
        &self,
        memo: &mut Memo,
        recording: &RecordingV1,
        signer: &PublicKey,
    ) -> CadenzaResult<()> {
        let composition = self.composition_by_id(memo, &recording.composition)?;
        let holders: BTreeSet<&RecordId> =
            composition.rights.iter().map(|r| &r.holder).collect();

        let (_, label_key) = self.agent_by_id(memo, &recording.label)?;
        let (_, performer_key) = self.agent_by_id(memo, &recording.performer)?;
        self.agent_by_id(memo, &recording.producer)?;

        let (role, role_id) = if *signer == label_key {
            ("label", &recording.label)
        } else if *signer == performer_key {
            ("performer", &recording.performer)
        } else {
            return Err(CadenzaError::unauthorized_signer(
                "recording must be signed by label or performer",
            ));
        };

        if !holders.contains(role_id) {
            return Err(CadenzaError::criteria_not_met(format!(
                "{role} is not composition right holder"
            )));
        }

        for right in &recording.rights {
            trace!(holder = %right.holder, "validating recording right holder");
            self.agent_by_id(memo, &right.holder)?;
        }
        Ok(())
    }

    /// The licenser must hold rights in the referenced composition (a pure
    /// identifier-set test, checked before the licenser's record is ever
    /// resolved), and the license must be signed by exactly the licenser's
    /// key.
    fn check_publishing_license(
        &self,
        memo: &mut Memo,
        license: &PublishingLicenseV1,
        signer: &PublicKey,
    ) -> CadenzaResult<()> {
        let composition = self.composition_by_id(memo, &license.composition)?;
        let holders: BTreeSet<&RecordId> =
            composition.rights.iter().map(|r| &r.holder).collect();

        if !holders.contains(&license.licenser) {
            return Err(CadenzaError::criteria_not_met(
                "licenser is not a composition right holder",
            ));
        }

        let (_, licenser_key) = self.agent_by_id(memo, &license.licenser)?;
        if *signer != licenser_key {
            return Err(CadenzaError::invalid_key("license is not signed by its licenser"));
        }

        self.agent_by_id(memo, &license.licensee)?;
        Ok(())
    }

    /// Same structure as publishing licenses, anchored on a recording and
    /// its right-holder set.
    fn check_recording_license(
        &self,
        memo: &mut Memo,
        license: &RecordingLicenseV1,
        signer: &PublicKey,
    ) -> CadenzaResult<()> {
        let recording = self.recording_by_id(memo, &license.recording)?;
        let holders: BTreeSet<&RecordId> = recording.rights.iter().map(|r| &r.holder).collect();

        if !holders.contains(&license.licenser) {
            return Err(CadenzaError::criteria_not_met(
                "licenser is not a recording right holder",
            ));
        }

        let (_, licenser_key) = self.agent_by_id(memo, &license.licenser)?;
        if *signer != licenser_key {
            return Err(CadenzaError::invalid_key("license is not signed by its licenser"));
        }

        self.agent_by_id(memo, &license.licensee)?;
        Ok(())
    }
}
