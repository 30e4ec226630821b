//! Family editing sessions.
//!
//! # Responsibility
//! - Hold the working copy of one family between load and save.
//! - Reconcile the edited state against load-time values into the minimal
//!   update payload.
//!
//! # Invariants
//! - Exactly one member row carries the family-head flag at any time.
//! - A member row belongs to at most one couple selection.
//! - Mutations never modify the receiver; a rejected edit leaves the
//!   caller's session untouched.

use std::error::Error;
use std::fmt;

mod diff;
mod edit;

pub use edit::{
    is_plausible_email, is_plausible_phone, CoupleDraft, FamilySession, MemberDraft, PhotoSlot,
};

use crate::model::family::{CoupleDraftId, FormKey};

/// Rejected session edits and failed submission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Member is referenced by a couple selection.
    MemberInCouple(FormKey),
    /// The first member row anchors the form and stays.
    FirstMemberMustStay,
    /// No member row carries this key.
    MemberNotFound(FormKey),
    /// No couple widget carries this id.
    CoupleNotFound(CoupleDraftId),
    /// More than two members picked for one couple.
    PairTooLarge(usize),
    /// The same member picked twice in one couple.
    DuplicatePairMember(FormKey),
    /// Member already belongs to a different couple.
    MemberAlreadyPaired(FormKey),
    /// Family address is blank.
    MissingAddress,
    /// No prayer unit selected.
    MissingPrayerUnit,
    /// A member row is missing its name.
    MissingMemberName(FormKey),
    /// A member row is missing its birth date.
    MissingBirthDate(FormKey),
    /// A couple selection does not hold exactly two members.
    IncompleteCouple(CoupleDraftId),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::MemberInCouple(key) => {
                write!(f, "member row {key} is part of a couple; unlink the couple first")
            }
            SessionError::FirstMemberMustStay => {
                write!(f, "the first member row anchors the family and cannot be removed")
            }
            SessionError::MemberNotFound(key) => write!(f, "no member row with key {key}"),
            SessionError::CoupleNotFound(id) => write!(f, "no couple widget {id}"),
            SessionError::PairTooLarge(count) => {
                write!(f, "a couple holds at most two members, got {count}")
            }
            SessionError::DuplicatePairMember(key) => {
                write!(f, "member row {key} picked twice in one couple")
            }
            SessionError::MemberAlreadyPaired(key) => {
                write!(f, "member row {key} already belongs to another couple")
            }
            SessionError::MissingAddress => write!(f, "address is required"),
            SessionError::MissingPrayerUnit => write!(f, "prayer unit is required"),
            SessionError::MissingMemberName(key) => {
                write!(f, "member row {key} needs a name")
            }
            SessionError::MissingBirthDate(key) => {
                write!(f, "member row {key} needs a birth date")
            }
            SessionError::IncompleteCouple(id) => {
                write!(f, "couple {id} needs exactly two members before saving")
            }
        }
    }
}

impl Error for SessionError {}
