//! Loading a family into an editing session and applying edits.
//!
//! # Responsibility
//! - Flatten a server snapshot into editable member and couple rows.
//! - Apply user edits as pure transitions returning updated sessions.
//!
//! # Invariants
//! - Persisted members keep their snapshot ordinal as form key; the new-row
//!   counter starts past them and never reuses a value.
//! - The family-head ordinal always points inside the member list, which is
//!   never empty.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SessionError;
use crate::model::family::{
    CoupleDraftId, CoupleNo, FamilyId, FamilySnapshot, FormKey, MemberId, PhotoUpload,
};
use crate::model::keys::{parse_blood_group, BloodGroup};

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static email regex must compile")
});

static PHONE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 \-]{5,17}$").expect("static phone regex must compile")
});

/// True when `value` looks like a deliverable email address.
///
/// A plausibility shape only; saves never gate on it.
pub fn is_plausible_email(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value.trim())
}

/// True when `value` looks like a dialable phone number.
pub fn is_plausible_phone(value: &str) -> bool {
    PHONE_SHAPE.is_match(value.trim())
}

/// Trims one optional form field; blank input means "not set".
fn normalize_optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parses a wire date, trying ISO `YYYY-MM-DD` before the legacy
/// `DD-MM-YYYY` layout.
fn parse_wire_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d-%m-%Y"))
        .ok()
}

/// One editable member row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub form_key: FormKey,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub blood_group: Option<BloodGroup>,
}

impl MemberDraft {
    fn blank(form_key: FormKey) -> Self {
        MemberDraft {
            form_key,
            full_name: String::new(),
            birth_date: None,
            phone_number: None,
            email: None,
            blood_group: None,
        }
    }
}

/// One editable couple widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoupleDraft {
    /// Widget identity only; never sent to the server.
    pub draft_id: CoupleDraftId,
    /// Server correlation number; `None` until the server numbers the couple.
    pub couple_no: Option<CoupleNo>,
    /// Selected member rows, at most two.
    pub members: Vec<FormKey>,
    pub anniversary_date: Option<NaiveDate>,
}

/// Staged photo change applied during save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotoSlot {
    /// Leave the server photo untouched.
    Keep,
    /// Upload a replacement after the record update.
    Replace(PhotoUpload),
    /// Delete the server photo after the record update; skipped when the
    /// record never had one.
    Clear,
}

/// Editable working copy of one family.
///
/// Cheap to clone; every mutation clones first and returns the updated
/// session, so callers keep the pre-edit value when an edit is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySession {
    pub(super) family_id: Option<FamilyId>,
    pub(super) address: String,
    pub(super) prayer_unit: String,
    pub(super) house_name: Option<String>,
    pub(super) members: Vec<MemberDraft>,
    pub(super) family_head: usize,
    pub(super) couples: Vec<CoupleDraft>,
    pub(super) members_to_remove: Vec<MemberId>,
    pub(super) removed_couples: Vec<(CoupleNo, Option<NaiveDate>)>,
    pub(super) loaded_anniversaries: BTreeMap<CoupleNo, Option<NaiveDate>>,
    pub(super) original_member_ids: Vec<MemberId>,
    pub(super) original_photo_url: Option<String>,
    pub(super) photo: PhotoSlot,
    pub(super) next_form_key: u64,
}

impl FamilySession {
    /// Opens an editing session over a loaded family record.
    ///
    /// Members become rows keyed by their snapshot ordinal. Couples resolve
    /// spouse ids to form keys, skipping ids that no longer resolve. A family
    /// with no members gets one blank row so the form always has an anchor.
    pub fn from_snapshot(family: &FamilySnapshot) -> Self {
        let mut members = Vec::with_capacity(family.family_members.len());
        let mut original_member_ids = Vec::with_capacity(family.family_members.len());
        for (ordinal, member) in family.family_members.iter().enumerate() {
            original_member_ids.push(member.id);
            let birth_date = member.dob.as_deref().and_then(|raw| {
                let parsed = parse_wire_date(raw);
                if parsed.is_none() {
                    warn!(
                        "event=family_load module=session status=degraded field=dob member_id={} value={raw}",
                        member.id
                    );
                }
                parsed
            });
            members.push(MemberDraft {
                form_key: FormKey(ordinal as u64),
                full_name: member.name.clone(),
                birth_date,
                phone_number: member.phone_number.clone(),
                email: member.email_id.clone(),
                blood_group: member.blood_group.as_deref().and_then(parse_blood_group),
            });
        }
        let family_head = family
            .family_members
            .iter()
            .position(|member| member.is_family_head)
            .unwrap_or(0);
        let mut couples = Vec::with_capacity(family.couples.len());
        let mut loaded_anniversaries = BTreeMap::new();
        for couple in &family.couples {
            let mut selected = Vec::new();
            for spouse_id in [couple.spouse1_id, couple.spouse2_id] {
                if let Some(ordinal) = family
                    .family_members
                    .iter()
                    .position(|member| member.id == spouse_id)
                {
                    selected.push(FormKey(ordinal as u64));
                }
            }
            loaded_anniversaries.insert(couple.couple_no, couple.anniversary_date);
            couples.push(CoupleDraft {
                draft_id: Uuid::new_v4(),
                couple_no: Some(couple.couple_no),
                members: selected,
                anniversary_date: couple.anniversary_date,
            });
        }
        let mut next_form_key = family.family_members.len() as u64;
        if members.is_empty() {
            members.push(MemberDraft::blank(FormKey(next_form_key)));
            next_form_key += 1;
        }
        FamilySession {
            family_id: Some(family.id),
            address: family.address.clone(),
            prayer_unit: family.unit.clone(),
            house_name: family.house_name.clone(),
            members,
            family_head,
            couples,
            members_to_remove: Vec::new(),
            removed_couples: Vec::new(),
            loaded_anniversaries,
            original_member_ids,
            original_photo_url: family.photo_url.clone(),
            photo: PhotoSlot::Keep,
            next_form_key,
        }
    }

    /// Starts a from-scratch session for the new-family flow.
    pub fn new_family() -> Self {
        FamilySession {
            family_id: None,
            address: String::new(),
            prayer_unit: String::new(),
            house_name: None,
            members: vec![MemberDraft::blank(FormKey(0))],
            family_head: 0,
            couples: Vec::new(),
            members_to_remove: Vec::new(),
            removed_couples: Vec::new(),
            loaded_anniversaries: BTreeMap::new(),
            original_member_ids: Vec::new(),
            original_photo_url: None,
            photo: PhotoSlot::Keep,
            next_form_key: 1,
        }
    }

    /// Server identity; `None` for a family being assembled from scratch.
    pub fn family_id(&self) -> Option<FamilyId> {
        self.family_id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Symbolic prayer-unit key.
    pub fn prayer_unit(&self) -> &str {
        &self.prayer_unit
    }

    pub fn house_name(&self) -> Option<&str> {
        self.house_name.as_deref()
    }

    pub fn members(&self) -> &[MemberDraft] {
        &self.members
    }

    pub fn couples(&self) -> &[CoupleDraft] {
        &self.couples
    }

    /// Ordinal of the current family head inside `members`.
    pub fn family_head(&self) -> usize {
        self.family_head
    }

    pub fn photo(&self) -> &PhotoSlot {
        &self.photo
    }

    pub fn original_photo_url(&self) -> Option<&str> {
        self.original_photo_url.as_deref()
    }

    /// True when this row updates a persisted member rather than adding one.
    pub fn is_existing_member(&self, key: FormKey) -> bool {
        (key.0 as usize) < self.original_member_ids.len()
    }

    /// True when `key` is selected by a couple other than `draft_id`.
    pub fn is_form_key_taken_by_other_couple(&self, draft_id: CoupleDraftId, key: FormKey) -> bool {
        self.couples
            .iter()
            .any(|couple| couple.draft_id != draft_id && couple.members.contains(&key))
    }

    pub(super) fn persisted_member_id(&self, key: FormKey) -> Option<MemberId> {
        self.original_member_ids.get(key.0 as usize).copied()
    }

    fn member_position(&self, key: FormKey) -> Result<usize, SessionError> {
        self.members
            .iter()
            .position(|member| member.form_key == key)
            .ok_or(SessionError::MemberNotFound(key))
    }

    fn couple_position(&self, draft_id: CoupleDraftId) -> Result<usize, SessionError> {
        self.couples
            .iter()
            .position(|couple| couple.draft_id == draft_id)
            .ok_or(SessionError::CoupleNotFound(draft_id))
    }

    /// Replaces the address line.
    pub fn with_address(&self, value: &str) -> Self {
        let mut next = self.clone();
        next.address = value.to_string();
        next
    }

    /// Replaces the prayer-unit key.
    pub fn with_prayer_unit(&self, value: &str) -> Self {
        let mut next = self.clone();
        next.prayer_unit = value.to_string();
        next
    }

    /// Replaces the house name; blank input clears it.
    pub fn with_house_name(&self, value: &str) -> Self {
        let mut next = self.clone();
        next.house_name = normalize_optional_text(value);
        next
    }

    pub fn with_member_name(&self, key: FormKey, value: &str) -> Result<Self, SessionError> {
        let position = self.member_position(key)?;
        let mut next = self.clone();
        next.members[position].full_name = value.to_string();
        Ok(next)
    }

    pub fn with_member_birth_date(
        &self,
        key: FormKey,
        value: Option<NaiveDate>,
    ) -> Result<Self, SessionError> {
        let position = self.member_position(key)?;
        let mut next = self.clone();
        next.members[position].birth_date = value;
        Ok(next)
    }

    /// Replaces a member's phone number; blank input clears it.
    pub fn with_member_phone(&self, key: FormKey, value: &str) -> Result<Self, SessionError> {
        let position = self.member_position(key)?;
        let mut next = self.clone();
        next.members[position].phone_number = normalize_optional_text(value);
        Ok(next)
    }

    /// Replaces a member's email; blank input clears it.
    pub fn with_member_email(&self, key: FormKey, value: &str) -> Result<Self, SessionError> {
        let position = self.member_position(key)?;
        let mut next = self.clone();
        next.members[position].email = normalize_optional_text(value);
        Ok(next)
    }

    pub fn with_member_blood_group(
        &self,
        key: FormKey,
        value: Option<BloodGroup>,
    ) -> Result<Self, SessionError> {
        let position = self.member_position(key)?;
        let mut next = self.clone();
        next.members[position].blood_group = value;
        Ok(next)
    }

    /// Moves the family-head flag onto one member row.
    pub fn mark_family_head(&self, key: FormKey) -> Result<Self, SessionError> {
        let position = self.member_position(key)?;
        let mut next = self.clone();
        next.family_head = position;
        Ok(next)
    }

    /// Appends a blank member row keyed from the new-row counter.
    pub fn add_member(&self) -> Self {
        let mut next = self.clone();
        let key = FormKey(next.next_form_key);
        next.next_form_key += 1;
        next.members.push(MemberDraft::blank(key));
        next
    }

    /// Removes one member row.
    ///
    /// The first row stays put, and a member referenced by a couple selection
    /// must leave the couple first. Removing a persisted member stages its
    /// server deletion. The head ordinal re-aims at the first row when the
    /// head itself goes and shifts down when an earlier row goes.
    pub fn remove_member(&self, key: FormKey) -> Result<Self, SessionError> {
        let position = self.member_position(key)?;
        if position == 0 {
            return Err(SessionError::FirstMemberMustStay);
        }
        if self
            .couples
            .iter()
            .any(|couple| couple.members.contains(&key))
        {
            return Err(SessionError::MemberInCouple(key));
        }
        let mut next = self.clone();
        next.members.remove(position);
        if let Some(id) = next.persisted_member_id(key) {
            next.members_to_remove.push(id);
        }
        if position == next.family_head {
            next.family_head = 0;
        } else if position < next.family_head {
            next.family_head -= 1;
        }
        Ok(next)
    }

    /// Adds an empty couple widget.
    pub fn add_couple(&self) -> Self {
        let mut next = self.clone();
        next.couples.push(CoupleDraft {
            draft_id: Uuid::new_v4(),
            couple_no: None,
            members: Vec::new(),
            anniversary_date: None,
        });
        next
    }

    /// Removes one couple widget; a server-numbered couple is staged for
    /// deletion together with its last-known date.
    pub fn remove_couple(&self, draft_id: CoupleDraftId) -> Result<Self, SessionError> {
        let position = self.couple_position(draft_id)?;
        let mut next = self.clone();
        let removed = next.couples.remove(position);
        if let Some(couple_no) = removed.couple_no {
            next.removed_couples
                .push((couple_no, removed.anniversary_date));
        }
        Ok(next)
    }

    /// Replaces the member selection of one couple widget.
    pub fn assign_couple_members(
        &self,
        draft_id: CoupleDraftId,
        keys: &[FormKey],
    ) -> Result<Self, SessionError> {
        let position = self.couple_position(draft_id)?;
        if keys.len() > 2 {
            return Err(SessionError::PairTooLarge(keys.len()));
        }
        for (index, key) in keys.iter().enumerate() {
            self.member_position(*key)?;
            if keys[..index].contains(key) {
                return Err(SessionError::DuplicatePairMember(*key));
            }
            if self.is_form_key_taken_by_other_couple(draft_id, *key) {
                return Err(SessionError::MemberAlreadyPaired(*key));
            }
        }
        let mut next = self.clone();
        next.couples[position].members = keys.to_vec();
        Ok(next)
    }

    /// Sets or clears the anniversary date of one couple widget.
    pub fn with_couple_anniversary(
        &self,
        draft_id: CoupleDraftId,
        date: Option<NaiveDate>,
    ) -> Result<Self, SessionError> {
        let position = self.couple_position(draft_id)?;
        let mut next = self.clone();
        next.couples[position].anniversary_date = date;
        Ok(next)
    }

    /// Stages a replacement photo for upload at save.
    pub fn stage_photo(&self, upload: PhotoUpload) -> Self {
        let mut next = self.clone();
        next.photo = PhotoSlot::Replace(upload);
        next
    }

    /// Stages removal of the server photo.
    pub fn clear_photo(&self) -> Self {
        let mut next = self.clone();
        next.photo = PhotoSlot::Clear;
        next
    }
}
