//! Directory search entry points.
//!
//! # Responsibility
//! - Build the filter-criteria bodies the search endpoints accept.
//! - Keep incremental paging state out of the UI layer.

pub mod filter;
