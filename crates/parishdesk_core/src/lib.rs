//! Core domain logic for ParishDesk.
//! This crate is the single source of truth for directory business invariants.

pub mod api;
pub mod logging;
pub mod model;
pub mod search;
pub mod service;
pub mod session;

pub use api::family_api::{CreateFamilyRequest, FamilyApi, UpdateFamilyRequest};
pub use api::memory::InMemoryDirectory;
pub use api::roster_api::RosterApi;
pub use api::{ApiError, ApiResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::family::{
    CoupleDraftId, CoupleNo, FamilyId, FamilySnapshot, FormKey, MemberId, PhotoUpload,
};
pub use model::keys::BloodGroup;
pub use search::filter::{
    family_search_request, member_search_request, FamilySearchRow, MemberSearchRow, SearchPager,
    SearchRequest,
};
pub use service::family_service::{CreateOutcome, FamilyService, SaveError, SaveOutcome};
pub use service::roster_service::{
    CommitteeDraft, RepresentativeBoard, RosterError, RosterService, TemplateDraft,
};
pub use session::{FamilySession, PhotoSlot, SessionError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
