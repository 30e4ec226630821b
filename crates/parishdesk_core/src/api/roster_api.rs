//! Roster endpoints and their request bodies.
//!
//! # Responsibility
//! - Define [`RosterApi`], the collaborator behind position, unit, committee
//!   and representative administration.
//!
//! # Invariants
//! - `cardPositionMemberMap` includes unassigned positions as null entries;
//!   the server clears an assignment by reading the null.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::ApiResult;
use crate::model::family::{MemberId, PhotoUpload};
use crate::model::roster::{
    CardId, Committee, CommitteeId, Position, PositionId, RepresentativeTemplate, TemplateId,
    UnitId, UnitRecord, UnitRepresentatives,
};

/// Body shared by create/rename calls that carry only a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamePayload {
    pub name: String,
}

/// One position row inside a committee card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteeCardPosition {
    pub position_id: PositionId,
    /// Vacant seats submit as null.
    pub member_id: Option<MemberId>,
}

/// One card inside `POST /committees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeCard {
    pub title: String,
    pub positions: Vec<CommitteeCardPosition>,
}

/// Body of `POST /committees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCommitteeRequest {
    pub name: String,
    pub cards: Vec<CommitteeCard>,
}

/// Position reference inside a template card, `{id}` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplatePositionRef {
    pub id: PositionId,
}

/// One card inside `POST /unit-representatives/templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTemplateCard {
    pub title: String,
    pub positions: Vec<TemplatePositionRef>,
}

/// Body of `POST /unit-representatives/templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub cards: Vec<CreateTemplateCard>,
}

/// JSON `data` part of the multipart representative-assignment call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRepresentativesRequest {
    pub unit_id: UnitId,
    pub template_id: TemplateId,
    /// Card id to position id to member id; unassigned positions carry null.
    pub card_position_member_map: BTreeMap<CardId, BTreeMap<PositionId, Option<MemberId>>>,
}

/// Roster endpoints consumed by the dashboard core.
pub trait RosterApi {
    /// `GET /positions`.
    fn list_positions(&self) -> ApiResult<Vec<Position>>;

    /// `POST /positions`.
    fn create_position(&self, request: &NamePayload) -> ApiResult<()>;

    /// `PUT /positions/{id}`.
    fn update_position(&self, id: PositionId, request: &NamePayload) -> ApiResult<()>;

    /// `DELETE /positions/{id}`.
    fn delete_position(&self, id: PositionId) -> ApiResult<()>;

    /// `GET /unit`.
    fn list_units(&self) -> ApiResult<Vec<UnitRecord>>;

    /// `GET /unit/{id}`.
    fn get_unit(&self, id: UnitId) -> ApiResult<UnitRecord>;

    /// `POST /unit`.
    fn create_unit(&self, request: &NamePayload) -> ApiResult<()>;

    /// `PUT /unit/{id}`.
    fn update_unit(&self, id: UnitId, request: &NamePayload) -> ApiResult<()>;

    /// `DELETE /unit/{id}`.
    fn delete_unit(&self, id: UnitId) -> ApiResult<()>;

    /// `GET /committees`.
    fn list_committees(&self) -> ApiResult<Vec<Committee>>;

    /// `POST /committees`.
    fn create_committee(&self, request: &CreateCommitteeRequest) -> ApiResult<()>;

    /// `PUT /committees/{id}`, rename only.
    fn rename_committee(&self, id: CommitteeId, request: &NamePayload) -> ApiResult<()>;

    /// `DELETE /committees/{id}`.
    fn delete_committee(&self, id: CommitteeId) -> ApiResult<()>;

    /// `GET /unit-representatives/templates`.
    fn list_templates(&self) -> ApiResult<Vec<RepresentativeTemplate>>;

    /// `POST /unit-representatives/templates`.
    fn create_template(&self, request: &CreateTemplateRequest) -> ApiResult<()>;

    /// `GET /unit-representatives/{unitId}`; `Ok(None)` when the unit has no
    /// stored assignment yet.
    fn get_unit_representatives(&self, unit_id: UnitId) -> ApiResult<Option<UnitRepresentatives>>;

    /// `POST /unit-representatives/assign`, multipart with optional cover
    /// photos.
    fn assign_representatives(
        &self,
        request: &AssignRepresentativesRequest,
        cover_photo: Option<&PhotoUpload>,
        inner_cover_photo: Option<&PhotoUpload>,
    ) -> ApiResult<()>;
}
