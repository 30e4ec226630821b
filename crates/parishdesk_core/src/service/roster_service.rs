//! Roster administration: positions, units, committees, representatives.
//!
//! # Responsibility
//! - Validate roster drafts and drive the CRUD endpoints.
//! - Merge the representative template with a unit's stored assignment into
//!   one editable board and submit it back.
//!
//! # Invariants
//! - Board cards keep the template's card and position order.
//! - Submitting a board sends every position of every card; unassigned ones
//!   carry null.

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use log::info;

use crate::api::roster_api::{
    AssignRepresentativesRequest, CommitteeCard, CommitteeCardPosition, CreateCommitteeRequest,
    CreateTemplateCard, CreateTemplateRequest, NamePayload, RosterApi, TemplatePositionRef,
};
use crate::api::ApiError;
use crate::model::family::{MemberId, PhotoUpload};
use crate::model::roster::{
    CardId, Committee, CommitteeId, Position, PositionId, RepresentativeTemplate, TemplateId,
    TemplatePosition, UnitId, UnitRecord,
};
use crate::search::filter::MemberSearchRow;

/// Roster administration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Display name is blank after trimming.
    InvalidName,
    /// A card is missing its title.
    MissingCardTitle,
    /// A card row has no position selected.
    MissingPosition { card: String },
    /// No representative template exists yet.
    NoTemplateAvailable,
    /// The board has no such card/position slot.
    SlotNotFound {
        card_id: CardId,
        position_id: PositionId,
    },
    /// Collaborator failure.
    Api(ApiError),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::InvalidName => write!(f, "name must not be blank"),
            RosterError::MissingCardTitle => write!(f, "every card needs a title"),
            RosterError::MissingPosition { card } => {
                write!(f, "card '{card}' has a row without a position")
            }
            RosterError::NoTemplateAvailable => {
                write!(f, "no representative template has been created yet")
            }
            RosterError::SlotNotFound {
                card_id,
                position_id,
            } => write!(f, "no slot for position {position_id} on card {card_id}"),
            RosterError::Api(err) => write!(f, "directory call failed: {err}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RosterError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for RosterError {
    fn from(err: ApiError) -> Self {
        RosterError::Api(err)
    }
}

/// Trims a display name; blank input is rejected.
fn normalize_name(value: &str) -> Result<String, RosterError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RosterError::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// One seat row of a committee card draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitteeRowDraft {
    pub position_id: Option<PositionId>,
    /// Vacant seats are allowed and submit as null.
    pub member_id: Option<MemberId>,
}

/// One card of a committee draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitteeCardDraft {
    pub title: String,
    pub rows: Vec<CommitteeRowDraft>,
}

/// Composable committee payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitteeDraft {
    pub name: String,
    pub cards: Vec<CommitteeCardDraft>,
}

impl CommitteeDraft {
    /// Checks the draft and produces the create body.
    pub fn build(&self) -> Result<CreateCommitteeRequest, RosterError> {
        let name = normalize_name(&self.name)?;
        let mut cards = Vec::with_capacity(self.cards.len());
        for card in &self.cards {
            let title = card.title.trim();
            if title.is_empty() {
                return Err(RosterError::MissingCardTitle);
            }
            let mut positions = Vec::with_capacity(card.rows.len());
            for row in &card.rows {
                let position_id = row.position_id.ok_or_else(|| RosterError::MissingPosition {
                    card: title.to_string(),
                })?;
                positions.push(CommitteeCardPosition {
                    position_id,
                    member_id: row.member_id,
                });
            }
            cards.push(CommitteeCard {
                title: title.to_string(),
                positions,
            });
        }
        Ok(CreateCommitteeRequest { name, cards })
    }
}

/// One card of a template draft.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateCardDraft {
    pub title: String,
    pub position_ids: Vec<PositionId>,
}

/// Composable representative-template payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateDraft {
    pub name: String,
    pub cards: Vec<TemplateCardDraft>,
}

impl TemplateDraft {
    /// Checks the draft and produces the create body.
    pub fn build(&self) -> Result<CreateTemplateRequest, RosterError> {
        let name = normalize_name(&self.name)?;
        let mut cards = Vec::with_capacity(self.cards.len());
        for card in &self.cards {
            let title = card.title.trim();
            if title.is_empty() {
                return Err(RosterError::MissingCardTitle);
            }
            cards.push(CreateTemplateCard {
                title: title.to_string(),
                positions: card
                    .position_ids
                    .iter()
                    .map(|id| TemplatePositionRef { id: *id })
                    .collect(),
            });
        }
        Ok(CreateTemplateRequest { name, cards })
    }
}

/// One assignable slot on the representative board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSlot {
    pub position: TemplatePosition,
    pub member_id: Option<MemberId>,
}

/// One card of the representative board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCard {
    pub card_id: CardId,
    pub title: String,
    pub slots: Vec<BoardSlot>,
}

/// Editable representative assignment for one unit.
///
/// Built by merging the template with the unit's stored assignment; slot
/// edits follow the same pure-transition style as family sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeBoard {
    pub unit: UnitRecord,
    pub template_id: TemplateId,
    pub cards: Vec<BoardCard>,
    pub cover_photo_url: Option<String>,
    pub inner_cover_photo_url: Option<String>,
    /// Members referenced by the stored assignment, for picker seeding.
    pub assigned_members: Vec<MemberSearchRow>,
}

impl RepresentativeBoard {
    /// Puts `member_id` into one slot, or clears it with `None`.
    pub fn with_member(
        &self,
        card_id: CardId,
        position_id: PositionId,
        member_id: Option<MemberId>,
    ) -> Result<Self, RosterError> {
        let mut next = self.clone();
        let slot = next
            .cards
            .iter_mut()
            .find(|card| card.card_id == card_id)
            .and_then(|card| {
                card.slots
                    .iter_mut()
                    .find(|slot| slot.position.id == position_id)
            })
            .ok_or(RosterError::SlotNotFound {
                card_id,
                position_id,
            })?;
        slot.member_id = member_id;
        Ok(next)
    }

    /// Builds the submit body; every slot appears, unassigned ones as null.
    pub fn assignment_request(&self) -> AssignRepresentativesRequest {
        let mut card_position_member_map = BTreeMap::new();
        for card in &self.cards {
            let by_position: BTreeMap<PositionId, Option<MemberId>> = card
                .slots
                .iter()
                .map(|slot| (slot.position.id, slot.member_id))
                .collect();
            card_position_member_map.insert(card.card_id, by_position);
        }
        AssignRepresentativesRequest {
            unit_id: self.unit.id,
            template_id: self.template_id,
            card_position_member_map,
        }
    }
}

/// Facade over the roster collaborator.
pub struct RosterService<A: RosterApi> {
    api: A,
}

impl<A: RosterApi> RosterService<A> {
    pub fn new(api: A) -> Self {
        RosterService { api }
    }

    pub fn list_positions(&self) -> Result<Vec<Position>, RosterError> {
        Ok(self.api.list_positions()?)
    }

    pub fn create_position(&self, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name)?;
        self.api.create_position(&NamePayload { name })?;
        info!("event=position_create module=roster_service status=ok");
        Ok(())
    }

    pub fn rename_position(&self, id: PositionId, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name)?;
        self.api.update_position(id, &NamePayload { name })?;
        info!("event=position_rename module=roster_service status=ok position_id={id}");
        Ok(())
    }

    pub fn delete_position(&self, id: PositionId) -> Result<(), RosterError> {
        self.api.delete_position(id)?;
        info!("event=position_delete module=roster_service status=ok position_id={id}");
        Ok(())
    }

    pub fn list_units(&self) -> Result<Vec<UnitRecord>, RosterError> {
        Ok(self.api.list_units()?)
    }

    pub fn get_unit(&self, id: UnitId) -> Result<UnitRecord, RosterError> {
        Ok(self.api.get_unit(id)?)
    }

    pub fn create_unit(&self, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name)?;
        self.api.create_unit(&NamePayload { name })?;
        info!("event=unit_create module=roster_service status=ok");
        Ok(())
    }

    pub fn rename_unit(&self, id: UnitId, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name)?;
        self.api.update_unit(id, &NamePayload { name })?;
        info!("event=unit_rename module=roster_service status=ok unit_id={id}");
        Ok(())
    }

    pub fn delete_unit(&self, id: UnitId) -> Result<(), RosterError> {
        self.api.delete_unit(id)?;
        info!("event=unit_delete module=roster_service status=ok unit_id={id}");
        Ok(())
    }

    pub fn list_committees(&self) -> Result<Vec<Committee>, RosterError> {
        Ok(self.api.list_committees()?)
    }

    pub fn create_committee(&self, draft: &CommitteeDraft) -> Result<(), RosterError> {
        let request = draft.build()?;
        self.api.create_committee(&request)?;
        info!(
            "event=committee_create module=roster_service status=ok cards={}",
            request.cards.len()
        );
        Ok(())
    }

    pub fn rename_committee(&self, id: CommitteeId, name: &str) -> Result<(), RosterError> {
        let name = normalize_name(name)?;
        self.api.rename_committee(id, &NamePayload { name })?;
        info!("event=committee_rename module=roster_service status=ok committee_id={id}");
        Ok(())
    }

    pub fn delete_committee(&self, id: CommitteeId) -> Result<(), RosterError> {
        self.api.delete_committee(id)?;
        info!("event=committee_delete module=roster_service status=ok committee_id={id}");
        Ok(())
    }

    pub fn list_templates(&self) -> Result<Vec<RepresentativeTemplate>, RosterError> {
        Ok(self.api.list_templates()?)
    }

    pub fn create_template(&self, draft: &TemplateDraft) -> Result<(), RosterError> {
        let request = draft.build()?;
        self.api.create_template(&request)?;
        info!(
            "event=template_create module=roster_service status=ok cards={}",
            request.cards.len()
        );
        Ok(())
    }

    /// Merges the first available template with the unit's stored assignment.
    ///
    /// Template cards keep their order; stored assignments attach by card
    /// title and position id, everything unmatched starts empty.
    pub fn load_representative_board(
        &self,
        unit_id: UnitId,
    ) -> Result<RepresentativeBoard, RosterError> {
        let templates = self.api.list_templates()?;
        let template = templates
            .into_iter()
            .next()
            .ok_or(RosterError::NoTemplateAvailable)?;
        let stored = self.api.get_unit_representatives(unit_id)?;
        let unit = self.api.get_unit(unit_id)?;
        let cards: Vec<BoardCard> = template
            .cards
            .iter()
            .map(|card| {
                let existing_card = stored.as_ref().and_then(|stored| {
                    stored
                        .cards
                        .iter()
                        .find(|candidate| candidate.title == card.title)
                });
                let slots = card
                    .positions
                    .iter()
                    .map(|position| {
                        let member_id = existing_card.and_then(|existing| {
                            existing
                                .positions
                                .iter()
                                .find(|assigned| assigned.position_id == position.id)
                                .and_then(|assigned| assigned.member_id)
                        });
                        BoardSlot {
                            position: position.clone(),
                            member_id,
                        }
                    })
                    .collect();
                BoardCard {
                    card_id: card.id,
                    title: card.title.clone(),
                    slots,
                }
            })
            .collect();
        let assigned_members: Vec<MemberSearchRow> = stored
            .as_ref()
            .map(|stored| {
                stored
                    .cards
                    .iter()
                    .flat_map(|card| card.positions.iter())
                    .filter_map(|assigned| {
                        let id = assigned.member_id?;
                        Some(MemberSearchRow {
                            id,
                            name: assigned.member_name.clone().unwrap_or_default(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        info!(
            "event=representatives_load module=roster_service status=ok unit_id={unit_id} cards={} assigned={}",
            cards.len(),
            assigned_members.len()
        );
        Ok(RepresentativeBoard {
            unit,
            template_id: template.id,
            cards,
            cover_photo_url: stored
                .as_ref()
                .and_then(|stored| stored.cover_photo_url.clone()),
            inner_cover_photo_url: stored.and_then(|stored| stored.inner_cover_photo_url),
            assigned_members,
        })
    }

    /// Submits one board, with optional cover photo replacements.
    pub fn submit_representatives(
        &self,
        board: &RepresentativeBoard,
        cover_photo: Option<&PhotoUpload>,
        inner_cover_photo: Option<&PhotoUpload>,
    ) -> Result<(), RosterError> {
        let request = board.assignment_request();
        self.api
            .assign_representatives(&request, cover_photo, inner_cover_photo)?;
        info!(
            "event=representatives_assign module=roster_service status=ok unit_id={} cards={}",
            request.unit_id,
            request.card_position_member_map.len()
        );
        Ok(())
    }
}
