//! CADENZA data models.
//!
//! This module defines the strongly-typed Rust representations for the rights
//! records stored in the ledger. It is intentionally versioned: each wire
//! format is isolated under a `vN` module so that upgrades can be introduced
//! without breaking existing users.
//!
//! Models are mostly "dumb" data. Cross-entity rules (authorship, rights
//! membership) live in `crate::validate`; shape rules live in
//! `crate::schema`.

use std::fmt;

pub mod v1;

pub use v1::{
    AgentV1, CompositionV1, EntityV1, PublishingLicenseV1, RecordingLicenseV1, RecordingV1,
    RightV1,
};

/// The closed set of entity kinds a ledger record can declare.
///
/// Every dispatch over kinds matches exhaustively, so adding a kind is a
/// compile-time-forced update to each site rather than a silently-skipped
/// case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    Agent,
    Composition,
    Recording,
    PublishingLicense,
    RecordingLicense,
}

impl EntityKind {
    /// Parse the in-band `kind` tag carried by payloads. Unknown tags return
    /// `None`; the schema layer reports them as malformed.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agent" => Some(Self::Agent),
            "composition" => Some(Self::Composition),
            "recording" => Some(Self::Recording),
            "publishingLicense" => Some(Self::PublishingLicense),
            "recordingLicense" => Some(Self::RecordingLicense),
            _ => None,
        }
    }

    /// The wire tag written into payloads.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Composition => "composition",
            Self::Recording => "recording",
            Self::PublishingLicense => "publishingLicense",
            Self::RecordingLicense => "recordingLicense",
        }
    }

    /// Stable lowercase name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Composition => "composition",
            Self::Recording => "recording",
            Self::PublishingLicense => "publishing-license",
            Self::RecordingLicense => "recording-license",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
