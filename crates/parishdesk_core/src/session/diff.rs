//! Reconciling an edited session into server payloads.
//!
//! # Responsibility
//! - Validate a session for submission.
//! - Build the minimal `PUT /families/{id}` body against load-time state.
//! - Build the `POST /families` body for from-scratch sessions.
//!
//! # Invariants
//! - A couple's date enters `couplesThatNeedUpdate` only when it differs
//!   from its load-time value.
//! - `anniversaryDates` never carries null entries.
//! - Member rows partition by form-key value, never by list position.

use std::collections::BTreeMap;

use log::warn;

use super::edit::{is_plausible_email, is_plausible_phone, CoupleDraft, FamilySession};
use super::SessionError;
use crate::api::family_api::{
    CoupleDateEntry, CreateFamilyRequest, MemberUpdate, NewCouple, NewMember, UpdateFamilyRequest,
};
use crate::model::family::{CoupleNo, FormKey};
use crate::model::keys::blood_group_key;

impl FamilySession {
    /// Checks the session satisfies every submission rule.
    ///
    /// Contact fields are advisory: implausible-looking values are logged
    /// and never block a save.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.address.trim().is_empty() {
            return Err(SessionError::MissingAddress);
        }
        if self.prayer_unit.trim().is_empty() {
            return Err(SessionError::MissingPrayerUnit);
        }
        for member in &self.members {
            if member.full_name.trim().is_empty() {
                return Err(SessionError::MissingMemberName(member.form_key));
            }
            if member.birth_date.is_none() {
                return Err(SessionError::MissingBirthDate(member.form_key));
            }
            if let Some(email) = &member.email {
                if !is_plausible_email(email) {
                    warn!(
                        "event=family_validate module=session status=suspect field=email form_key={}",
                        member.form_key
                    );
                }
            }
            if let Some(phone) = &member.phone_number {
                if !is_plausible_phone(phone) {
                    warn!(
                        "event=family_validate module=session status=suspect field=phone form_key={}",
                        member.form_key
                    );
                }
            }
        }
        for couple in &self.couples {
            if couple.members.len() != 2 {
                return Err(SessionError::IncompleteCouple(couple.draft_id));
            }
        }
        Ok(())
    }

    fn couple_of(&self, key: FormKey) -> Option<&CoupleDraft> {
        self.couples
            .iter()
            .find(|couple| couple.members.contains(&key))
    }

    /// Builds the minimal update body for this session.
    ///
    /// Members partition by form-key value: keys below the load-time member
    /// count update persisted records, their server ids recovered from the
    /// load-time ordinals; keys at or past it create new records. A new
    /// member paired with a persisted one carries the partner's server id so
    /// the server can form the couple.
    pub fn build_update_request(&self) -> Result<UpdateFamilyRequest, SessionError> {
        self.validate()?;
        let mut couples_that_need_update = Vec::new();
        let mut anniversary_dates = BTreeMap::new();
        for couple in &self.couples {
            let couple_no = match couple.couple_no {
                Some(no) => no,
                None => continue,
            };
            let loaded = self.loaded_anniversaries.get(&couple_no).copied().flatten();
            if loaded != couple.anniversary_date {
                couples_that_need_update.push(CoupleDateEntry {
                    couple_no,
                    anniversary_date: couple.anniversary_date,
                });
            }
            if let Some(date) = couple.anniversary_date {
                anniversary_dates.insert(couple_no, date);
            }
        }
        let mut family_members = Vec::new();
        let mut family_members_to_add = Vec::new();
        for (ordinal, member) in self.members.iter().enumerate() {
            let couple = self.couple_of(member.form_key);
            let couple_no = couple.and_then(|couple| couple.couple_no);
            let is_family_head = ordinal == self.family_head;
            match self.persisted_member_id(member.form_key) {
                Some(id) => family_members.push(MemberUpdate {
                    id,
                    name: member.full_name.clone(),
                    dob: member.birth_date,
                    phone_number: member.phone_number.clone(),
                    email_id: member.email.clone(),
                    blood_group: member
                        .blood_group
                        .map(|group| blood_group_key(group).to_string()),
                    is_family_head,
                    couple_no,
                }),
                None => {
                    let partner_id = couple.and_then(|couple| {
                        couple
                            .members
                            .iter()
                            .copied()
                            .find(|candidate| *candidate != member.form_key)
                            .and_then(|partner| self.persisted_member_id(partner))
                    });
                    family_members_to_add.push(NewMember {
                        name: member.full_name.clone(),
                        dob: member.birth_date,
                        phone_number: member.phone_number.clone(),
                        email_id: member.email.clone(),
                        blood_group: member
                            .blood_group
                            .map(|group| blood_group_key(group).to_string()),
                        is_family_head,
                        couple_no,
                        anniversary_date: couple.and_then(|couple| couple.anniversary_date),
                        partner_id,
                    });
                }
            }
        }
        Ok(UpdateFamilyRequest {
            address: self.address.clone(),
            unit: self.prayer_unit.clone(),
            house_name: self.house_name.clone(),
            family_members,
            family_members_to_remove: self.members_to_remove.clone(),
            couples_to_be_removed: self
                .removed_couples
                .iter()
                .map(|(couple_no, date)| CoupleDateEntry {
                    couple_no: *couple_no,
                    anniversary_date: *date,
                })
                .collect(),
            couples_that_need_update,
            anniversary_dates,
            family_members_to_add,
        })
    }

    /// Builds the create body for a from-scratch session.
    ///
    /// Couples get serial numbers from 1 in widget order, backfilled onto
    /// the paired members; the dates map carries dated couples only.
    pub fn build_create_request(&self) -> Result<CreateFamilyRequest, SessionError> {
        self.validate()?;
        let mut anniversary_dates = BTreeMap::new();
        let mut couples = Vec::with_capacity(self.couples.len());
        let mut assigned: BTreeMap<FormKey, CoupleNo> = BTreeMap::new();
        for (index, couple) in self.couples.iter().enumerate() {
            let couple_no = (index + 1) as CoupleNo;
            if let Some(date) = couple.anniversary_date {
                anniversary_dates.insert(couple_no, date);
            }
            for key in &couple.members {
                assigned.insert(*key, couple_no);
            }
            couples.push(NewCouple {
                couple_no,
                member_ids: couple.members.clone(),
                anniversary_date: couple.anniversary_date,
            });
        }
        let family_members = self
            .members
            .iter()
            .enumerate()
            .map(|(ordinal, member)| NewMember {
                name: member.full_name.clone(),
                dob: member.birth_date,
                phone_number: member.phone_number.clone(),
                email_id: member.email.clone(),
                blood_group: member
                    .blood_group
                    .map(|group| blood_group_key(group).to_string()),
                is_family_head: ordinal == self.family_head,
                couple_no: assigned.get(&member.form_key).copied(),
                anniversary_date: None,
                partner_id: None,
            })
            .collect();
        Ok(CreateFamilyRequest {
            address: self.address.clone(),
            unit: self.prayer_unit.clone(),
            house_name: self.house_name.clone(),
            family_members,
            couples,
            anniversary_dates,
        })
    }
}
