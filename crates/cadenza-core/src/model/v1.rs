//! Version 1 entity models.
//!
//! Payload layout notes:
//! - Field names are camelCase on the wire.
//! - Every payload carries its declared kind in-band under the `kind` key.
//!   The tag is handled by `crate::schema` and [`EntityV1::to_payload`], not
//!   by the structs themselves.
//! - Unknown fields are preserved in `extra` so a validated payload keeps
//!   its full content.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CadenzaError, CadenzaResult};
use crate::ledger::RecordId;
use crate::model::EntityKind;

/// An identity record. Leaf of the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentV1 {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A rights share embedded in a composition or recording. Not independently
/// stored; the holder is a ledger reference to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RightV1 {
    pub holder: RecordId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A musical work. Signed by its composer or its publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionV1 {
    pub composer: RecordId,
    pub publisher: RecordId,
    #[serde(default)]
    pub rights: Vec<RightV1>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A recorded performance of a composition. Signed by its label or its
/// performer, who must also hold rights in the referenced composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingV1 {
    pub composition: RecordId,
    pub label: RecordId,
    pub performer: RecordId,
    pub producer: RecordId,
    #[serde(default)]
    pub rights: Vec<RightV1>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A license over a composition, granted by one of its right holders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingLicenseV1 {
    pub composition: RecordId,
    pub licenser: RecordId,
    pub licensee: RecordId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A license over a recording, granted by one of its right holders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingLicenseV1 {
    pub recording: RecordId,
    pub licenser: RecordId,
    pub licensee: RecordId,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The tagged variant the entity resolver returns. Validation routines match
/// on the kind they expect and fail closed on mismatch.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityV1 {
    Agent(AgentV1),
    Composition(CompositionV1),
    Recording(RecordingV1),
    PublishingLicense(PublishingLicenseV1),
    RecordingLicense(RecordingLicenseV1),
}

impl EntityV1 {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Agent(_) => EntityKind::Agent,
            Self::Composition(_) => EntityKind::Composition,
            Self::Recording(_) => EntityKind::Recording,
            Self::PublishingLicense(_) => EntityKind::PublishingLicense,
            Self::RecordingLicense(_) => EntityKind::RecordingLicense,
        }
    }

    /// Serialize back to the wire payload, with the `kind` tag in-band.
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        let mut value = match self {
            Self::Agent(e) => serde_json::to_value(e)?,
            Self::Composition(e) => serde_json::to_value(e)?,
            Self::Recording(e) => serde_json::to_value(e)?,
            Self::PublishingLicense(e) => serde_json::to_value(e)?,
            Self::RecordingLicense(e) => serde_json::to_value(e)?,
        };
        if let Value::Object(map) = &mut value {
            map.insert("kind".to_string(), Value::String(self.kind().tag().to_string()));
        }
        Ok(value)
    }

    pub fn into_agent(self) -> CadenzaResult<AgentV1> {
        match self {
            Self::Agent(e) => Ok(e),
            other => Err(mismatch(EntityKind::Agent, other.kind())),
        }
    }

    pub fn into_composition(self) -> CadenzaResult<CompositionV1> {
        match self {
            Self::Composition(e) => Ok(e),
            other => Err(mismatch(EntityKind::Composition, other.kind())),
        }
    }

    pub fn into_recording(self) -> CadenzaResult<RecordingV1> {
        match self {
            Self::Recording(e) => Ok(e),
            other => Err(mismatch(EntityKind::Recording, other.kind())),
        }
    }

    pub fn into_publishing_license(self) -> CadenzaResult<PublishingLicenseV1> {
        match self {
            Self::PublishingLicense(e) => Ok(e),
            other => Err(mismatch(EntityKind::PublishingLicense, other.kind())),
        }
    }

    pub fn into_recording_license(self) -> CadenzaResult<RecordingLicenseV1> {
        match self {
            Self::RecordingLicense(e) => Ok(e),
            other => Err(mismatch(EntityKind::RecordingLicense, other.kind())),
        }
    }
}

fn mismatch(expected: EntityKind, got: EntityKind) -> CadenzaError {
    CadenzaError::malformed(expected, format!("expected {expected} payload, got {got}"))
}
