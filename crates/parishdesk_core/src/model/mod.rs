//! Domain model for the parish directory and roster.
//!
//! # Responsibility
//! - Define the family and roster records exchanged with the directory server.
//! - Define the symbolic-key catalogs shared by pickers and wire payloads.
//!
//! # Invariants
//! - Wire-facing structs mirror the server JSON field names exactly.
//! - No transport concern lives in this module.

pub mod family;
pub mod keys;
pub mod roster;
