//! Family records and the session-local member handle.
//!
//! # Responsibility
//! - Mirror the family payloads served by `GET /families/{id}`.
//! - Define `FormKey`, the in-session identity of one member row.
//!
//! # Invariants
//! - Snapshot structs deserialize the server JSON field-for-field.
//! - `FormKey` values never leave an editing session except inside
//!   create payloads, where the server pairs members through them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Server-assigned family identifier.
pub type FamilyId = i64;

/// Server-assigned member identifier.
pub type MemberId = i64;

/// Server-assigned couple correlation number.
pub type CoupleNo = i64;

/// Session-local identity of one couple widget.
pub type CoupleDraftId = uuid::Uuid;

/// Session-local handle for one member row.
///
/// Members present at load time keep their snapshot ordinal (`0..N-1` for a
/// family of `N`); rows added during the session draw fresh values from a
/// counter seeded at `N`. The numeric value alone therefore tells a persisted
/// member (`value < N`) from a new one, independent of list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormKey(pub u64);

impl FormKey {
    /// Raw counter value behind this handle.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Member record as served by the family endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSnapshot {
    pub id: MemberId,
    pub name: String,
    /// Historically `DD-MM-YYYY`; newer records carry ISO `YYYY-MM-DD`.
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_id: Option<String>,
    /// Symbolic key such as `A_POSITIVE`; see [`crate::model::keys`].
    #[serde(default)]
    pub blood_group: Option<String>,
    #[serde(default)]
    pub is_family_head: bool,
    #[serde(default)]
    pub couple_no: Option<CoupleNo>,
}

/// Couple record as served by the family endpoint.
///
/// Spouses are referenced by member id; a spouse id that no longer resolves
/// against `familyMembers` is skipped when the session loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleSnapshot {
    pub couple_no: CoupleNo,
    pub spouse1_id: MemberId,
    pub spouse2_id: MemberId,
    #[serde(default)]
    pub anniversary_date: Option<NaiveDate>,
}

/// Family record as served by `GET /families/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySnapshot {
    pub id: FamilyId,
    pub address: String,
    /// Symbolic prayer-unit key, e.g. `ST_THOMAS`. Keys outside the local
    /// catalog are kept verbatim.
    pub unit: String,
    #[serde(default)]
    pub house_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub family_members: Vec<MemberSnapshot>,
    #[serde(default)]
    pub couples: Vec<CoupleSnapshot>,
}

/// In-memory photo payload staged for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
