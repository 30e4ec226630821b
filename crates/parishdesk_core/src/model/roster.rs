//! Roster records: positions, prayer units, committees and representatives.
//!
//! # Responsibility
//! - Mirror the roster payloads served by `/positions`, `/unit`,
//!   `/committees` and `/unit-representatives`.
//!
//! # Invariants
//! - Template cards carry every position a board can assign; assignment
//!   records may cover only a subset of them.

use serde::{Deserialize, Serialize};

use crate::model::family::MemberId;

/// Server-assigned committee identifier.
pub type CommitteeId = i64;

/// Server-assigned position identifier.
pub type PositionId = i64;

/// Server-assigned prayer-unit identifier.
pub type UnitId = i64;

/// Server-assigned representative-template identifier.
pub type TemplateId = i64;

/// Server-assigned template-card identifier.
pub type CardId = i64;

/// Responsibility position record (`/positions`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub name: String,
}

/// Prayer-unit record (`/unit`).
///
/// Distinct from the symbolic keys in [`crate::model::keys`]: these rows are
/// the server-side administrative records the roster pages manage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub id: UnitId,
    pub name: String,
}

/// Committee list row (`/committees`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    pub id: CommitteeId,
    pub name: String,
}

/// One assignable position inside a template card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePosition {
    pub id: PositionId,
    pub name: String,
}

/// One card of a representative template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCard {
    pub id: CardId,
    pub title: String,
    pub positions: Vec<TemplatePosition>,
}

/// Representative template (`GET /unit-representatives/templates`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepresentativeTemplate {
    pub id: TemplateId,
    pub name: String,
    pub cards: Vec<TemplateCard>,
}

/// One assigned position inside a stored unit assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedPosition {
    pub position_id: PositionId,
    #[serde(default)]
    pub member_id: Option<MemberId>,
    #[serde(default)]
    pub member_name: Option<String>,
}

/// One card of a stored unit assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedCard {
    pub title: String,
    pub positions: Vec<AssignedPosition>,
}

/// Stored representative assignment for one unit
/// (`GET /unit-representatives/{unitId}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRepresentatives {
    #[serde(default)]
    pub cards: Vec<AssignedCard>,
    #[serde(default)]
    pub cover_photo_url: Option<String>,
    #[serde(default)]
    pub inner_cover_photo_url: Option<String>,
}
