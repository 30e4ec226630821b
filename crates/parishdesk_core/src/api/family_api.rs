//! Family endpoints and their request bodies.
//!
//! # Responsibility
//! - Define [`FamilyApi`], the collaborator behind family load/save flows.
//! - Shape the update and create payloads the reconciliation step emits.
//!
//! # Invariants
//! - `UpdateFamilyRequest` contains only the keys the endpoint reads; absent
//!   optional keys on new members stay absent, they are not sent as null.
//! - `anniversaryDates` carries dated couples only; map keys serialize as
//!   strings because JSON objects require it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::ApiResult;
use crate::model::family::{CoupleNo, FamilyId, FamilySnapshot, FormKey, MemberId, PhotoUpload};
use crate::search::filter::{FamilySearchRow, MemberSearchRow, SearchRequest};

/// One existing member inside `PUT /families/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub id: MemberId,
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email_id: Option<String>,
    /// Symbolic key such as `A_POSITIVE`.
    pub blood_group: Option<String>,
    pub is_family_head: bool,
    /// Current couple membership; null when unpaired or paired into a couple
    /// the server has not numbered yet.
    pub couple_no: Option<CoupleNo>,
}

/// One member created during an update, inside `familyMembersToAdd`.
///
/// Doubles as the member entry of `POST /families`, where the pairing keys
/// never apply and therefore never serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub dob: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email_id: Option<String>,
    pub blood_group: Option<String>,
    pub is_family_head: bool,
    pub couple_no: Option<CoupleNo>,
    /// Present only when this member enters a dated couple this save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anniversary_date: Option<NaiveDate>,
    /// Present only when the partner already exists server-side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<MemberId>,
}

/// Couple-number/date pair used by the removal and anniversary-update lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoupleDateEntry {
    pub couple_no: CoupleNo,
    pub anniversary_date: Option<NaiveDate>,
}

/// Body of `PUT /families/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFamilyRequest {
    pub address: String,
    /// Symbolic prayer-unit key.
    pub unit: String,
    pub house_name: Option<String>,
    /// Every persisted member still in the family, full current state.
    pub family_members: Vec<MemberUpdate>,
    pub family_members_to_remove: Vec<MemberId>,
    pub couples_to_be_removed: Vec<CoupleDateEntry>,
    /// Couples whose date moved away from its load-time value.
    pub couples_that_need_update: Vec<CoupleDateEntry>,
    /// Authoritative post-save dates for every surviving dated couple.
    pub anniversary_dates: BTreeMap<CoupleNo, NaiveDate>,
    pub family_members_to_add: Vec<NewMember>,
}

/// One couple inside `POST /families`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCouple {
    /// Serial number assigned at submit time, starting at 1.
    pub couple_no: CoupleNo,
    /// Session member handles; the server correlates them against the
    /// `coupleNo` fields backfilled onto `familyMembers`.
    pub member_ids: Vec<FormKey>,
    pub anniversary_date: Option<NaiveDate>,
}

/// Body of `POST /families`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    pub address: String,
    pub unit: String,
    pub house_name: Option<String>,
    pub family_members: Vec<NewMember>,
    pub couples: Vec<NewCouple>,
    pub anniversary_dates: BTreeMap<CoupleNo, NaiveDate>,
}

/// Family endpoints consumed by the dashboard core.
///
/// Implementors translate these calls into HTTP against the directory
/// server; [`crate::api::memory::InMemoryDirectory`] emulates them for tests
/// and smoke probes.
pub trait FamilyApi {
    /// `GET /families/{id}`.
    fn get_family(&self, id: FamilyId) -> ApiResult<FamilySnapshot>;

    /// `PUT /families/{id}`.
    fn update_family(&self, id: FamilyId, request: &UpdateFamilyRequest) -> ApiResult<()>;

    /// `POST /families`; returns the created record.
    fn create_family(&self, request: &CreateFamilyRequest) -> ApiResult<FamilySnapshot>;

    /// `DELETE /families/{id}`.
    fn delete_family(&self, id: FamilyId) -> ApiResult<()>;

    /// `POST /families/{id}/upload-photo`, multipart.
    fn upload_family_photo(&self, id: FamilyId, photo: &PhotoUpload) -> ApiResult<()>;

    /// `DELETE /families/{id}/delete-photo`.
    fn delete_family_photo(&self, id: FamilyId) -> ApiResult<()>;

    /// `POST /families/searchFamilyMembers`, one page of directory rows.
    fn search_families(&self, request: &SearchRequest) -> ApiResult<Vec<FamilySearchRow>>;

    /// Paged member search backing the representative pickers.
    fn search_members(&self, request: &SearchRequest) -> ApiResult<Vec<MemberSearchRow>>;
}
