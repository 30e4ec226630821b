//! Family load/save orchestration.
//!
//! # Responsibility
//! - Drive the load, save, create and delete flows over a [`FamilyApi`].
//! - Sequence the photo step after the record write and keep its failures
//!   from failing the save.
//!
//! # Invariants
//! - The record update lands before any photo call.
//! - A failed photo step surfaces as a warning on the outcome, never as an
//!   error; a failed reload fails the save.

use std::error::Error;
use std::fmt;

use log::{info, warn};

use crate::api::family_api::FamilyApi;
use crate::api::ApiError;
use crate::model::family::{FamilyId, FamilySnapshot};
use crate::session::{FamilySession, PhotoSlot, SessionError};

/// Save orchestration failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// The session failed a pre-submit check; nothing was sent.
    Validation(SessionError),
    /// The record write or the post-save reload failed.
    Api(ApiError),
    /// Save called on a session that has no server identity yet.
    NotPersisted,
    /// Create called on a session that already has a server identity.
    AlreadyPersisted,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Validation(err) => write!(f, "session not submittable: {err}"),
            SaveError::Api(err) => write!(f, "directory call failed: {err}"),
            SaveError::NotPersisted => {
                write!(f, "session has no server identity; use the create flow")
            }
            SaveError::AlreadyPersisted => {
                write!(f, "session already has a server identity; use the save flow")
            }
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SaveError::Validation(err) => Some(err),
            SaveError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SessionError> for SaveError {
    fn from(err: SessionError) -> Self {
        SaveError::Validation(err)
    }
}

impl From<ApiError> for SaveError {
    fn from(err: ApiError) -> Self {
        SaveError::Api(err)
    }
}

/// Result of a completed save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Fresh session opened over the reloaded record.
    pub session: FamilySession,
    /// Set when the tolerated photo step failed after the record update.
    pub photo_warning: Option<String>,
}

/// Result of a completed create.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    /// The record as the server stored it.
    pub family: FamilySnapshot,
    /// Set when the follow-up photo upload failed.
    pub photo_warning: Option<String>,
}

/// Facade over the family collaborator.
pub struct FamilyService<A: FamilyApi> {
    api: A,
}

impl<A: FamilyApi> FamilyService<A> {
    pub fn new(api: A) -> Self {
        FamilyService { api }
    }

    /// Fetches one family and opens an editing session over it.
    pub fn load_family(&self, id: FamilyId) -> Result<FamilySession, ApiError> {
        let snapshot = self.api.get_family(id)?;
        let session = FamilySession::from_snapshot(&snapshot);
        info!(
            "event=family_load module=family_service status=ok family_id={id} members={} couples={}",
            session.members().len(),
            session.couples().len()
        );
        Ok(session)
    }

    /// Validates, reconciles and submits one editing session, then reloads
    /// the record into a fresh session.
    pub fn save_family(&self, session: &FamilySession) -> Result<SaveOutcome, SaveError> {
        let family_id = session.family_id().ok_or(SaveError::NotPersisted)?;
        let request = session.build_update_request()?;
        self.api.update_family(family_id, &request)?;
        info!(
            "event=family_save module=family_service status=ok family_id={family_id} updated={} added={} removed={}",
            request.family_members.len(),
            request.family_members_to_add.len(),
            request.family_members_to_remove.len()
        );
        let photo_warning = self.apply_photo_change(family_id, session);
        let reloaded = self.api.get_family(family_id)?;
        Ok(SaveOutcome {
            session: FamilySession::from_snapshot(&reloaded),
            photo_warning,
        })
    }

    /// Submits a from-scratch session and uploads any staged photo.
    pub fn create_family(&self, session: &FamilySession) -> Result<CreateOutcome, SaveError> {
        if session.family_id().is_some() {
            return Err(SaveError::AlreadyPersisted);
        }
        let request = session.build_create_request()?;
        let family = self.api.create_family(&request)?;
        info!(
            "event=family_create module=family_service status=ok family_id={} members={} couples={}",
            family.id,
            request.family_members.len(),
            request.couples.len()
        );
        let photo_warning = match session.photo() {
            PhotoSlot::Replace(upload) => match self.api.upload_family_photo(family.id, upload) {
                Ok(()) => None,
                Err(err) => {
                    warn!(
                        "event=family_photo module=family_service status=failed op=upload family_id={} error={err}",
                        family.id
                    );
                    Some(format!("family saved, photo upload failed: {err}"))
                }
            },
            _ => None,
        };
        Ok(CreateOutcome {
            family,
            photo_warning,
        })
    }

    /// Deletes one family record.
    pub fn delete_family(&self, id: FamilyId) -> Result<(), ApiError> {
        self.api.delete_family(id)?;
        info!("event=family_delete module=family_service status=ok family_id={id}");
        Ok(())
    }

    /// Runs the staged photo change; failures come back as a warning string.
    fn apply_photo_change(&self, family_id: FamilyId, session: &FamilySession) -> Option<String> {
        match session.photo() {
            PhotoSlot::Keep => None,
            PhotoSlot::Clear => {
                if session.original_photo_url().is_none() {
                    return None;
                }
                match self.api.delete_family_photo(family_id) {
                    Ok(()) => None,
                    Err(err) => {
                        warn!(
                            "event=family_photo module=family_service status=failed op=delete family_id={family_id} error={err}"
                        );
                        Some(format!("family saved, photo removal failed: {err}"))
                    }
                }
            }
            PhotoSlot::Replace(upload) => match self.api.upload_family_photo(family_id, upload) {
                Ok(()) => None,
                Err(err) => {
                    warn!(
                        "event=family_photo module=family_service status=failed op=upload family_id={family_id} error={err}"
                    );
                    Some(format!("family saved, photo upload failed: {err}"))
                }
            },
        }
    }
}
