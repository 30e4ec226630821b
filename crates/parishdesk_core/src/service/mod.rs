//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate collaborator calls into use-case level APIs.
//! - Keep UI layers decoupled from endpoint sequencing.

pub mod family_service;
pub mod roster_service;
