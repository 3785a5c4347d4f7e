//! End-to-end provenance validation over the in-memory ledger.
//!
//! These tests build real dependency graphs through `cadenza-store` (records
//! are content-addressed, so identical graphs always get identical ids) and
//! drive the engine through its public entry points.

use proptest::prelude::*;
use serde_json::Map;

use cadenza_core::prelude::*;
use cadenza_store::MemoryLedger;

struct Scenario {
    ledger: MemoryLedger,
    composer: RecordId,
    performer: RecordId,
    composition: RecordId,
    recording: RecordId,
}

fn agent(name: &str) -> EntityV1 {
    EntityV1::Agent(AgentV1 {
        name: name.to_string(),
        email: None,
        extra: Map::new(),
    })
}

fn right(holder: &RecordId) -> RightV1 {
    RightV1 {
        holder: holder.clone(),
        extra: Map::new(),
    }
}

/// The baseline graph: composition C signed by composer A with rights
/// [A, B]; recording R referencing C, signed by performer B, with label L,
/// producer P, rights [B]. Seven records in total; `unfulfilled` marks one
/// of them (in append order) as unfulfilled.
fn build_scenario(unfulfilled: Option<usize>) -> Scenario {
    let ledger = MemoryLedger::new();
    let ok = |i: usize| unfulfilled != Some(i);

    let composer = ledger
        .append_entity(&agent("Composer A"), &PublicKey::new("key-a"), ok(0))
        .unwrap();
    let performer = ledger
        .append_entity(&agent("Performer B"), &PublicKey::new("key-b"), ok(1))
        .unwrap();
    let publisher = ledger
        .append_entity(&agent("Publisher"), &PublicKey::new("key-pub"), ok(2))
        .unwrap();
    let label = ledger
        .append_entity(&agent("Label L"), &PublicKey::new("key-l"), ok(3))
        .unwrap();
    let producer = ledger
        .append_entity(&agent("Producer P"), &PublicKey::new("key-p"), ok(4))
        .unwrap();

    let composition = ledger
        .append_entity(
            &EntityV1::Composition(CompositionV1 {
                composer: composer.clone(),
                publisher,
                rights: vec![right(&composer), right(&performer)],
                extra: Map::new(),
            }),
            &PublicKey::new("key-a"),
            ok(5),
        )
        .unwrap();

    let recording = ledger
        .append_entity(
            &EntityV1::Recording(RecordingV1 {
                composition: composition.clone(),
                label,
                performer: performer.clone(),
                producer,
                rights: vec![right(&performer)],
                extra: Map::new(),
            }),
            &PublicKey::new("key-b"),
            ok(6),
        )
        .unwrap();

    Scenario {
        ledger,
        composer,
        performer,
        composition,
        recording,
    }
}

#[test]
fn recording_validates_against_the_full_graph() {
    let s = build_scenario(None);
    let validator = ProvenanceValidator::new(&s.ledger);

    let recording = validator.validate_recording_by_id(&s.recording).unwrap();
    assert_eq!(recording.composition, s.composition);
    assert_eq!(recording.performer, s.performer);

    // Memoization: seven distinct records, one lookup each, even though the
    // composer and performer are reachable through several edges.
    assert_eq!(s.ledger.lookup_count(), 7);
}

#[test]
fn licenses_validate_end_to_end() {
    let s = build_scenario(None);

    let licensee = s
        .ledger
        .append_entity(&agent("Licensee"), &PublicKey::new("key-lic"), true)
        .unwrap();
    let publishing = s
        .ledger
        .append_entity(
            &EntityV1::PublishingLicense(PublishingLicenseV1 {
                composition: s.composition.clone(),
                licenser: s.composer.clone(),
                licensee: licensee.clone(),
                extra: Map::new(),
            }),
            &PublicKey::new("key-a"),
            true,
        )
        .unwrap();
    let recording_license = s
        .ledger
        .append_entity(
            &EntityV1::RecordingLicense(RecordingLicenseV1 {
                recording: s.recording.clone(),
                licenser: s.performer.clone(),
                licensee,
                extra: Map::new(),
            }),
            &PublicKey::new("key-b"),
            true,
        )
        .unwrap();

    let validator = ProvenanceValidator::new(&s.ledger);
    let lic = validator
        .validate_publishing_license_by_id(&publishing)
        .unwrap();
    assert_eq!(lic.licenser, s.composer);

    let lic = validator
        .validate_recording_license_by_id(&recording_license)
        .unwrap();
    assert_eq!(lic.licenser, s.performer);
}

#[test]
fn validated_payload_keeps_extra_content() {
    let s = build_scenario(None);

    let mut extra = Map::new();
    extra.insert("title".to_string(), serde_json::json!("Live at the Forum"));
    let annotated = s
        .ledger
        .append_entity(
            &EntityV1::Recording(RecordingV1 {
                composition: s.composition.clone(),
                label: s
                    .ledger
                    .append_entity(&agent("Other Label"), &PublicKey::new("key-ol"), true)
                    .unwrap(),
                performer: s.performer.clone(),
                producer: s
                    .ledger
                    .append_entity(&agent("Other Producer"), &PublicKey::new("key-op"), true)
                    .unwrap(),
                rights: vec![right(&s.performer)],
                extra,
            }),
            &PublicKey::new("key-b"),
            true,
        )
        .unwrap();

    let validator = ProvenanceValidator::new(&s.ledger);
    let recording = validator.validate_recording_by_id(&annotated).unwrap();
    assert_eq!(
        recording.extra.get("title"),
        Some(&serde_json::json!("Live at the Forum"))
    );
}

proptest! {
    /// Flipping any single dependency's fulfillment flag to false must flip
    /// the top-level result to failure.
    #[test]
    fn flipping_any_fulfillment_flag_fails_validation(flip in 0usize..7) {
        let s = build_scenario(Some(flip));
        let validator = ProvenanceValidator::new(&s.ledger);
        prop_assert!(validator.validate_recording_by_id(&s.recording).is_err());
    }

    /// Validating the same identifier twice with no ledger change yields the
    /// same result.
    #[test]
    fn validation_is_idempotent(flip in proptest::option::of(0usize..7)) {
        let s = build_scenario(flip);
        let validator = ProvenanceValidator::new(&s.ledger);
        let first = validator
            .validate_recording_by_id(&s.recording)
            .map_err(|e| e.to_string());
        let second = validator
            .validate_recording_by_id(&s.recording)
            .map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    }
}
