//! In-memory directory server used by tests and smoke probes.
//!
//! # Responsibility
//! - Implement [`FamilyApi`] and [`RosterApi`] against plain maps.
//! - Emulate the server-side effects of the reconciliation payloads so save
//!   flows can be verified end to end, reload included.
//!
//! # Invariants
//! - Handles are cheap clones over one shared state; a clone kept by a test
//!   observes everything a service did through its own clone.
//! - Injected failures fire exactly once.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::family_api::{CreateFamilyRequest, FamilyApi, UpdateFamilyRequest};
use crate::api::roster_api::{
    AssignRepresentativesRequest, CommitteeCard, CreateCommitteeRequest, CreateTemplateRequest,
    NamePayload, RosterApi,
};
use crate::api::{ApiError, ApiResult};
use crate::model::family::{
    CoupleSnapshot, FamilyId, FamilySnapshot, MemberId, MemberSnapshot, PhotoUpload,
};
use crate::model::roster::{
    AssignedCard, AssignedPosition, Committee, CommitteeId, Position, PositionId,
    RepresentativeTemplate, TemplateCard, TemplatePosition, UnitId, UnitRecord,
    UnitRepresentatives,
};
use crate::search::filter::{
    FamilySearchRow, FilterNode, FilterOperation, MemberSearchRow, SearchRequest,
};

#[derive(Debug, Default)]
struct DirectoryState {
    next_id: i64,
    families: BTreeMap<FamilyId, FamilySnapshot>,
    photos: BTreeMap<FamilyId, PhotoUpload>,
    positions: BTreeMap<PositionId, Position>,
    units: BTreeMap<UnitId, UnitRecord>,
    committees: BTreeMap<CommitteeId, Committee>,
    committee_cards: BTreeMap<CommitteeId, Vec<CommitteeCard>>,
    templates: Vec<RepresentativeTemplate>,
    representatives: BTreeMap<UnitId, UnitRepresentatives>,
    last_update: Option<UpdateFamilyRequest>,
    last_assignment: Option<AssignRepresentativesRequest>,
    fail_get_family: Option<ApiError>,
    fail_update: Option<ApiError>,
    fail_photo_upload: Option<ApiError>,
    fail_photo_delete: Option<ApiError>,
}

impl DirectoryState {
    fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn reserve_id(&mut self, id: i64) {
        if id > self.next_id {
            self.next_id = id;
        }
    }

    fn member_name(&self, id: MemberId) -> Option<String> {
        self.families
            .values()
            .flat_map(|family| family.family_members.iter())
            .find(|member| member.id == id)
            .map(|member| member.name.clone())
    }
}

/// Shared-state fake of the directory server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        InMemoryDirectory::default()
    }

    fn state(&self) -> MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seeds one family record, photo url and ids taken as given.
    pub fn insert_family(&self, family: FamilySnapshot) {
        let mut state = self.state();
        state.reserve_id(family.id);
        for member in &family.family_members {
            state.reserve_id(member.id);
        }
        state.families.insert(family.id, family);
    }

    pub fn insert_position(&self, position: Position) {
        let mut state = self.state();
        state.reserve_id(position.id);
        state.positions.insert(position.id, position);
    }

    pub fn insert_unit(&self, unit: UnitRecord) {
        let mut state = self.state();
        state.reserve_id(unit.id);
        state.units.insert(unit.id, unit);
    }

    pub fn insert_template(&self, template: RepresentativeTemplate) {
        let mut state = self.state();
        state.reserve_id(template.id);
        for card in &template.cards {
            state.reserve_id(card.id);
            for position in &card.positions {
                state.reserve_id(position.id);
            }
        }
        state.templates.push(template);
    }

    pub fn insert_representatives(&self, unit_id: UnitId, stored: UnitRepresentatives) {
        self.state().representatives.insert(unit_id, stored);
    }

    /// Current stored state of one family.
    pub fn family(&self, id: FamilyId) -> Option<FamilySnapshot> {
        self.state().families.get(&id).cloned()
    }

    /// Photo bytes currently stored for one family.
    pub fn stored_photo(&self, id: FamilyId) -> Option<PhotoUpload> {
        self.state().photos.get(&id).cloned()
    }

    /// Last `PUT /families/{id}` body received.
    pub fn last_update_request(&self) -> Option<UpdateFamilyRequest> {
        self.state().last_update.clone()
    }

    /// Last representative-assignment body received.
    pub fn last_assignment(&self) -> Option<AssignRepresentativesRequest> {
        self.state().last_assignment.clone()
    }

    pub fn representatives_for(&self, unit_id: UnitId) -> Option<UnitRepresentatives> {
        self.state().representatives.get(&unit_id).cloned()
    }

    pub fn committee_cards(&self, id: CommitteeId) -> Option<Vec<CommitteeCard>> {
        self.state().committee_cards.get(&id).cloned()
    }

    /// Makes the next family fetch fail with `error`.
    pub fn fail_next_get_family(&self, error: ApiError) {
        self.state().fail_get_family = Some(error);
    }

    /// Makes the next family update fail with `error`.
    pub fn fail_next_update(&self, error: ApiError) {
        self.state().fail_update = Some(error);
    }

    /// Makes the next photo upload fail with `error`.
    pub fn fail_next_photo_upload(&self, error: ApiError) {
        self.state().fail_photo_upload = Some(error);
    }

    /// Makes the next photo delete fail with `error`.
    pub fn fail_next_photo_delete(&self, error: ApiError) {
        self.state().fail_photo_delete = Some(error);
    }
}

/// Pulls the unit EQUALS value and name STARTS_WITH prefix out of a filter
/// tree, ignoring anything else.
fn extract_filters(node: &FilterNode) -> (Option<String>, Option<String>) {
    let mut unit = None;
    let mut name_prefix = None;
    if let FilterNode::Criteria { filters, .. } = node {
        for filter in filters {
            if let FilterNode::Field {
                field_name,
                operation,
                values,
            } = filter
            {
                let value = values.first().cloned();
                match (field_name.as_str(), operation) {
                    ("unit", FilterOperation::Equals) => unit = value,
                    ("name", FilterOperation::StartsWith) => name_prefix = value,
                    _ => {}
                }
            }
        }
    }
    (unit, name_prefix)
}

fn page_slice<T: Clone>(rows: Vec<T>, request: &SearchRequest) -> Vec<T> {
    let page_size = request.page_size.max(1) as usize;
    let page = request.offset.max(1) as usize;
    rows.chunks(page_size)
        .nth(page - 1)
        .map(|chunk| chunk.to_vec())
        .unwrap_or_default()
}

fn head_of(family: &FamilySnapshot) -> Option<&MemberSnapshot> {
    family
        .family_members
        .iter()
        .find(|member| member.is_family_head)
        .or_else(|| family.family_members.first())
}

impl FamilyApi for InMemoryDirectory {
    fn get_family(&self, id: FamilyId) -> ApiResult<FamilySnapshot> {
        let mut state = self.state();
        if let Some(error) = state.fail_get_family.take() {
            return Err(error);
        }
        state
            .families
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("family {id}")))
    }

    fn update_family(&self, id: FamilyId, request: &UpdateFamilyRequest) -> ApiResult<()> {
        let mut state = self.state();
        if let Some(error) = state.fail_update.take() {
            return Err(error);
        }
        state.last_update = Some(request.clone());
        {
            let family = state
                .families
                .get_mut(&id)
                .ok_or_else(|| ApiError::NotFound(format!("family {id}")))?;
            family.address = request.address.clone();
            family.unit = request.unit.clone();
            family.house_name = request.house_name.clone();
            family
                .family_members
                .retain(|member| !request.family_members_to_remove.contains(&member.id));
            family.couples.retain(|couple| {
                request
                    .couples_to_be_removed
                    .iter()
                    .all(|entry| entry.couple_no != couple.couple_no)
            });
            for update in &request.family_members {
                if let Some(member) = family
                    .family_members
                    .iter_mut()
                    .find(|member| member.id == update.id)
                {
                    member.name = update.name.clone();
                    member.dob = update.dob.map(|date| date.format("%Y-%m-%d").to_string());
                    member.phone_number = update.phone_number.clone();
                    member.email_id = update.email_id.clone();
                    member.blood_group = update.blood_group.clone();
                    member.is_family_head = update.is_family_head;
                    member.couple_no = update.couple_no;
                }
            }
            for entry in &request.couples_that_need_update {
                if let Some(couple) = family
                    .couples
                    .iter_mut()
                    .find(|couple| couple.couple_no == entry.couple_no)
                {
                    couple.anniversary_date = entry.anniversary_date;
                }
            }
        }
        for added in &request.family_members_to_add {
            let member_id = state.alloc_id();
            let family = state
                .families
                .get_mut(&id)
                .ok_or_else(|| ApiError::NotFound(format!("family {id}")))?;
            let mut couple_no = added.couple_no;
            if let Some(partner_id) = added.partner_id {
                let next_no = family
                    .couples
                    .iter()
                    .map(|couple| couple.couple_no)
                    .max()
                    .unwrap_or(0)
                    + 1;
                let assigned = couple_no.unwrap_or(next_no);
                couple_no = Some(assigned);
                family.couples.push(CoupleSnapshot {
                    couple_no: assigned,
                    spouse1_id: partner_id,
                    spouse2_id: member_id,
                    anniversary_date: added.anniversary_date,
                });
                if let Some(partner) = family
                    .family_members
                    .iter_mut()
                    .find(|member| member.id == partner_id)
                {
                    partner.couple_no = Some(assigned);
                }
            }
            family.family_members.push(MemberSnapshot {
                id: member_id,
                name: added.name.clone(),
                dob: added.dob.map(|date| date.format("%Y-%m-%d").to_string()),
                phone_number: added.phone_number.clone(),
                email_id: added.email_id.clone(),
                blood_group: added.blood_group.clone(),
                is_family_head: added.is_family_head,
                couple_no,
            });
        }
        Ok(())
    }

    fn create_family(&self, request: &CreateFamilyRequest) -> ApiResult<FamilySnapshot> {
        let mut state = self.state();
        let family_id = state.alloc_id();
        let mut members = Vec::with_capacity(request.family_members.len());
        for member in &request.family_members {
            let member_id = state.alloc_id();
            members.push(MemberSnapshot {
                id: member_id,
                name: member.name.clone(),
                dob: member.dob.map(|date| date.format("%Y-%m-%d").to_string()),
                phone_number: member.phone_number.clone(),
                email_id: member.email_id.clone(),
                blood_group: member.blood_group.clone(),
                is_family_head: member.is_family_head,
                couple_no: member.couple_no,
            });
        }
        // Pair spouses through the coupleNo values backfilled on the members.
        let mut couples = Vec::new();
        for couple in &request.couples {
            let spouse_ids: Vec<MemberId> = members
                .iter()
                .filter(|member| member.couple_no == Some(couple.couple_no))
                .map(|member| member.id)
                .collect();
            if let [first, second] = spouse_ids[..] {
                couples.push(CoupleSnapshot {
                    couple_no: couple.couple_no,
                    spouse1_id: first,
                    spouse2_id: second,
                    anniversary_date: couple.anniversary_date,
                });
            }
        }
        let family = FamilySnapshot {
            id: family_id,
            address: request.address.clone(),
            unit: request.unit.clone(),
            house_name: request.house_name.clone(),
            photo_url: None,
            family_members: members,
            couples,
        };
        state.families.insert(family_id, family.clone());
        Ok(family)
    }

    fn delete_family(&self, id: FamilyId) -> ApiResult<()> {
        let mut state = self.state();
        if state.families.remove(&id).is_none() {
            return Err(ApiError::NotFound(format!("family {id}")));
        }
        state.photos.remove(&id);
        Ok(())
    }

    fn upload_family_photo(&self, id: FamilyId, photo: &PhotoUpload) -> ApiResult<()> {
        let mut state = self.state();
        if let Some(error) = state.fail_photo_upload.take() {
            return Err(error);
        }
        let family = state
            .families
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("family {id}")))?;
        family.photo_url = Some(format!("memory://families/{id}/photo"));
        state.photos.insert(id, photo.clone());
        Ok(())
    }

    fn delete_family_photo(&self, id: FamilyId) -> ApiResult<()> {
        let mut state = self.state();
        if let Some(error) = state.fail_photo_delete.take() {
            return Err(error);
        }
        let family = state
            .families
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("family {id}")))?;
        family.photo_url = None;
        state.photos.remove(&id);
        Ok(())
    }

    fn search_families(&self, request: &SearchRequest) -> ApiResult<Vec<FamilySearchRow>> {
        let state = self.state();
        let (unit, name_prefix) = extract_filters(&request.node);
        let prefix = name_prefix.unwrap_or_default().to_lowercase();
        let rows: Vec<FamilySearchRow> = state
            .families
            .values()
            .filter(|family| unit.as_deref().map_or(true, |key| family.unit == key))
            .filter_map(|family| {
                let head = head_of(family)?;
                if !head.name.to_lowercase().starts_with(&prefix) {
                    return None;
                }
                Some(FamilySearchRow {
                    id: family.id,
                    name: head.name.clone(),
                    unit: family.unit.clone(),
                    contact: head.phone_number.clone(),
                    email: head.email_id.clone(),
                })
            })
            .collect();
        Ok(page_slice(rows, request))
    }

    fn search_members(&self, request: &SearchRequest) -> ApiResult<Vec<MemberSearchRow>> {
        let state = self.state();
        let (_, name_prefix) = extract_filters(&request.node);
        let prefix = name_prefix.unwrap_or_default().to_lowercase();
        let rows: Vec<MemberSearchRow> = state
            .families
            .values()
            .flat_map(|family| family.family_members.iter())
            .filter(|member| member.name.to_lowercase().starts_with(&prefix))
            .map(|member| MemberSearchRow {
                id: member.id,
                name: member.name.clone(),
            })
            .collect();
        Ok(page_slice(rows, request))
    }
}

impl RosterApi for InMemoryDirectory {
    fn list_positions(&self) -> ApiResult<Vec<Position>> {
        Ok(self.state().positions.values().cloned().collect())
    }

    fn create_position(&self, request: &NamePayload) -> ApiResult<()> {
        let mut state = self.state();
        let id = state.alloc_id();
        state.positions.insert(
            id,
            Position {
                id,
                name: request.name.clone(),
            },
        );
        Ok(())
    }

    fn update_position(&self, id: PositionId, request: &NamePayload) -> ApiResult<()> {
        let mut state = self.state();
        let position = state
            .positions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("position {id}")))?;
        position.name = request.name.clone();
        Ok(())
    }

    fn delete_position(&self, id: PositionId) -> ApiResult<()> {
        self.state()
            .positions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("position {id}")))
    }

    fn list_units(&self) -> ApiResult<Vec<UnitRecord>> {
        Ok(self.state().units.values().cloned().collect())
    }

    fn get_unit(&self, id: UnitId) -> ApiResult<UnitRecord> {
        self.state()
            .units
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("unit {id}")))
    }

    fn create_unit(&self, request: &NamePayload) -> ApiResult<()> {
        let mut state = self.state();
        let id = state.alloc_id();
        state.units.insert(
            id,
            UnitRecord {
                id,
                name: request.name.clone(),
            },
        );
        Ok(())
    }

    fn update_unit(&self, id: UnitId, request: &NamePayload) -> ApiResult<()> {
        let mut state = self.state();
        let unit = state
            .units
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("unit {id}")))?;
        unit.name = request.name.clone();
        Ok(())
    }

    fn delete_unit(&self, id: UnitId) -> ApiResult<()> {
        self.state()
            .units
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("unit {id}")))
    }

    fn list_committees(&self) -> ApiResult<Vec<Committee>> {
        Ok(self.state().committees.values().cloned().collect())
    }

    fn create_committee(&self, request: &CreateCommitteeRequest) -> ApiResult<()> {
        let mut state = self.state();
        let id = state.alloc_id();
        state.committees.insert(
            id,
            Committee {
                id,
                name: request.name.clone(),
            },
        );
        state.committee_cards.insert(id, request.cards.clone());
        Ok(())
    }

    fn rename_committee(&self, id: CommitteeId, request: &NamePayload) -> ApiResult<()> {
        let mut state = self.state();
        let committee = state
            .committees
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("committee {id}")))?;
        committee.name = request.name.clone();
        Ok(())
    }

    fn delete_committee(&self, id: CommitteeId) -> ApiResult<()> {
        let mut state = self.state();
        let removed = state.committees.remove(&id);
        state.committee_cards.remove(&id);
        removed
            .map(|_| ())
            .ok_or_else(|| ApiError::NotFound(format!("committee {id}")))
    }

    fn list_templates(&self) -> ApiResult<Vec<RepresentativeTemplate>> {
        Ok(self.state().templates.clone())
    }

    fn create_template(&self, request: &CreateTemplateRequest) -> ApiResult<()> {
        let mut state = self.state();
        let template_id = state.alloc_id();
        let mut cards = Vec::with_capacity(request.cards.len());
        for card in &request.cards {
            let card_id = state.alloc_id();
            let positions = card
                .positions
                .iter()
                .map(|reference| TemplatePosition {
                    id: reference.id,
                    name: state
                        .positions
                        .get(&reference.id)
                        .map(|position| position.name.clone())
                        .unwrap_or_else(|| format!("position {}", reference.id)),
                })
                .collect();
            cards.push(TemplateCard {
                id: card_id,
                title: card.title.clone(),
                positions,
            });
        }
        state.templates.push(RepresentativeTemplate {
            id: template_id,
            name: request.name.clone(),
            cards,
        });
        Ok(())
    }

    fn get_unit_representatives(&self, unit_id: UnitId) -> ApiResult<Option<UnitRepresentatives>> {
        Ok(self.state().representatives.get(&unit_id).cloned())
    }

    fn assign_representatives(
        &self,
        request: &AssignRepresentativesRequest,
        cover_photo: Option<&PhotoUpload>,
        inner_cover_photo: Option<&PhotoUpload>,
    ) -> ApiResult<()> {
        let mut state = self.state();
        state.last_assignment = Some(request.clone());
        let template = state
            .templates
            .iter()
            .find(|template| template.id == request.template_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("template {}", request.template_id)))?;
        let previous = state.representatives.get(&request.unit_id).cloned();
        let cards = template
            .cards
            .iter()
            .map(|card| {
                let assignments = request.card_position_member_map.get(&card.id);
                let positions = card
                    .positions
                    .iter()
                    .map(|position| {
                        let member_id = assignments
                            .and_then(|by_position| by_position.get(&position.id))
                            .copied()
                            .flatten();
                        AssignedPosition {
                            position_id: position.id,
                            member_id,
                            member_name: member_id.and_then(|id| state.member_name(id)),
                        }
                    })
                    .collect();
                AssignedCard {
                    title: card.title.clone(),
                    positions,
                }
            })
            .collect();
        let cover_photo_url = if cover_photo.is_some() {
            Some(format!("memory://units/{}/cover", request.unit_id))
        } else {
            previous.as_ref().and_then(|stored| stored.cover_photo_url.clone())
        };
        let inner_cover_photo_url = if inner_cover_photo.is_some() {
            Some(format!("memory://units/{}/inner-cover", request.unit_id))
        } else {
            previous.and_then(|stored| stored.inner_cover_photo_url)
        };
        state.representatives.insert(
            request.unit_id,
            UnitRepresentatives {
                cards,
                cover_photo_url,
                inner_cover_photo_url,
            },
        );
        Ok(())
    }
}
