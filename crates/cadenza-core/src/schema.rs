//! Structural schema validation for ledger payloads.
//!
//! Given an opaque payload and the entity kind the caller expects, this
//! module checks the shape and field types and produces the typed v1 model.
//! It performs no cross-entity logic and no I/O; reference fields are checked
//! for presence and non-blankness only, never resolved here.
//!
//! Shape rules per kind:
//! - every payload is a JSON object carrying its kind in-band under `kind`
//! - the declared kind must match the expected kind
//! - agents require a non-empty `name`; `email`, if present, must look like
//!   an address
//! - every reference field (`composer`, `publisher`, `label`, ...) must be a
//!   non-blank identifier
//! - every right must carry a non-blank `holder` identifier

use serde_json::Value;
use thiserror::Error;

use crate::ledger::RecordId;
use crate::model::v1::{AgentV1, EntityV1, RightV1};
use crate::model::EntityKind;

/// Structural validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload is missing the kind tag")]
    MissingKind,

    #[error("unknown entity kind: {0}")]
    UnknownKind(String),

    #[error("declared kind {declared} does not match expected {expected}")]
    KindMismatch {
        declared: EntityKind,
        expected: EntityKind,
    },

    #[error("payload failed to decode as {kind}: {reason}")]
    Decode { kind: EntityKind, reason: String },

    #[error("{field} must be a non-blank identifier")]
    BlankReference { field: String },

    #[error("agent name must be a non-empty string")]
    BlankName,

    #[error("agent email is not a plausible address: {0}")]
    BadEmail(String),
}

/// Decode a payload as the expected kind, enforcing shape rules.
pub fn decode(kind: EntityKind, payload: &Value) -> Result<EntityV1, SchemaError> {
    let obj = payload.as_object().ok_or(SchemaError::NotAnObject)?;

    let tag = obj
        .get("kind")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingKind)?;
    let declared =
        EntityKind::parse(tag).ok_or_else(|| SchemaError::UnknownKind(tag.to_string()))?;
    if declared != kind {
        return Err(SchemaError::KindMismatch {
            declared,
            expected: kind,
        });
    }

    // The tag is not part of the model structs; strip it before decoding so
    // it does not end up in the flattened extras.
    let mut body = obj.clone();
    body.remove("kind");
    let body = Value::Object(body);

    let entity = match kind {
        EntityKind::Agent => EntityV1::Agent(decode_body(kind, body)?),
        EntityKind::Composition => EntityV1::Composition(decode_body(kind, body)?),
        EntityKind::Recording => EntityV1::Recording(decode_body(kind, body)?),
        EntityKind::PublishingLicense => EntityV1::PublishingLicense(decode_body(kind, body)?),
        EntityKind::RecordingLicense => EntityV1::RecordingLicense(decode_body(kind, body)?),
    };

    check(&entity)?;
    Ok(entity)
}

fn decode_body<T: serde::de::DeserializeOwned>(
    kind: EntityKind,
    body: Value,
) -> Result<T, SchemaError> {
    serde_json::from_value(body).map_err(|e| SchemaError::Decode {
        kind,
        reason: e.to_string(),
    })
}

fn check(entity: &EntityV1) -> Result<(), SchemaError> {
    match entity {
        EntityV1::Agent(a) => check_agent(a),
        EntityV1::Composition(c) => {
            require_ref("composition.composer", &c.composer)?;
            require_ref("composition.publisher", &c.publisher)?;
            check_rights("composition", &c.rights)
        }
        EntityV1::Recording(r) => {
            require_ref("recording.composition", &r.composition)?;
            require_ref("recording.label", &r.label)?;
            require_ref("recording.performer", &r.performer)?;
            require_ref("recording.producer", &r.producer)?;
            check_rights("recording", &r.rights)
        }
        EntityV1::PublishingLicense(l) => {
            require_ref("publishingLicense.composition", &l.composition)?;
            require_ref("publishingLicense.licenser", &l.licenser)?;
            require_ref("publishingLicense.licensee", &l.licensee)
        }
        EntityV1::RecordingLicense(l) => {
            require_ref("recordingLicense.recording", &l.recording)?;
            require_ref("recordingLicense.licenser", &l.licenser)?;
            require_ref("recordingLicense.licensee", &l.licensee)
        }
    }
}

fn check_agent(agent: &AgentV1) -> Result<(), SchemaError> {
    if agent.name.trim().is_empty() {
        return Err(SchemaError::BlankName);
    }
    if let Some(email) = &agent.email {
        if !email.contains('@') {
            return Err(SchemaError::BadEmail(email.clone()));
        }
    }
    Ok(())
}

fn require_ref(field: &str, id: &RecordId) -> Result<(), SchemaError> {
    if id.is_blank() {
        return Err(SchemaError::BlankReference {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn check_rights(owner: &str, rights: &[RightV1]) -> Result<(), SchemaError> {
    for (idx, right) in rights.iter().enumerate() {
        if right.holder.is_blank() {
            return Err(SchemaError::BlankReference {
                field: format!("{owner}.rights[{idx}].holder"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agent_decodes_with_extras_preserved() {
        let payload = json!({
            "kind": "agent",
            "name": "Ada",
            "email": "ada@example.com",
            "socialMedia": "https://example.com/ada"
        });
        let entity = decode(EntityKind::Agent, &payload).unwrap();
        let EntityV1::Agent(agent) = entity else {
            panic!("expected agent");
        };
        assert_eq!(agent.name, "Ada");
        assert_eq!(
            agent.extra.get("socialMedia"),
            Some(&json!("https://example.com/ada"))
        );
    }

    #[test]
    fn missing_kind_tag_is_rejected() {
        let payload = json!({ "name": "Ada" });
        assert_eq!(
            decode(EntityKind::Agent, &payload),
            Err(SchemaError::MissingKind)
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let payload = json!({ "kind": "playlist", "name": "Mix" });
        assert_eq!(
            decode(EntityKind::Agent, &payload),
            Err(SchemaError::UnknownKind("playlist".to_string()))
        );
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let payload = json!({ "kind": "agent", "name": "Ada" });
        let err = decode(EntityKind::Composition, &payload).unwrap_err();
        assert_eq!(
            err,
            SchemaError::KindMismatch {
                declared: EntityKind::Agent,
                expected: EntityKind::Composition,
            }
        );
    }

    #[test]
    fn blank_agent_name_is_rejected() {
        let payload = json!({ "kind": "agent", "name": "   " });
        assert_eq!(
            decode(EntityKind::Agent, &payload),
            Err(SchemaError::BlankName)
        );
    }

    #[test]
    fn implausible_email_is_rejected() {
        let payload = json!({ "kind": "agent", "name": "Ada", "email": "not-an-address" });
        assert_eq!(
            decode(EntityKind::Agent, &payload),
            Err(SchemaError::BadEmail("not-an-address".to_string()))
        );
    }

    #[test]
    fn composition_requires_composer_and_publisher() {
        let payload = json!({
            "kind": "composition",
            "composer": "composer-1",
            "rights": []
        });
        let err = decode(EntityKind::Composition, &payload).unwrap_err();
        assert!(matches!(err, SchemaError::Decode { .. }));
    }

    #[test]
    fn blank_right_holder_is_rejected() {
        let payload = json!({
            "kind": "composition",
            "composer": "composer-1",
            "publisher": "publisher-1",
            "rights": [ { "holder": "composer-1" }, { "holder": "" } ]
        });
        let err = decode(EntityKind::Composition, &payload).unwrap_err();
        assert_eq!(
            err,
            SchemaError::BlankReference {
                field: "composition.rights[1].holder".to_string(),
            }
        );
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert_eq!(
            decode(EntityKind::Agent, &json!("agent")),
            Err(SchemaError::NotAnObject)
        );
    }

    #[test]
    fn recording_shape_is_enforced() {
        let payload = json!({
            "kind": "recording",
            "composition": "comp-1",
            "label": "label-1",
            "performer": "performer-1",
            "producer": "",
            "rights": []
        });
        let err = decode(EntityKind::Recording, &payload).unwrap_err();
        assert_eq!(
            err,
            SchemaError::BlankReference {
                field: "recording.producer".to_string(),
            }
        );
    }
}
