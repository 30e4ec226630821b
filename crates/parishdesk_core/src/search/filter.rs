//! Filter-criteria search payloads and incremental paging.
//!
//! # Responsibility
//! - Model the `filterCriteria` request tree the search endpoints accept.
//! - Accumulate member-picker pages with replace/append semantics.
//!
//! # Invariants
//! - `offset` is a 1-based page number, not a row offset.
//! - Blank search text never produces a request.

use serde::{Deserialize, Serialize};

use crate::model::family::{FamilyId, MemberId};

/// Rows requested per search page.
pub const SEARCH_PAGE_SIZE: u32 = 20;

/// Filter combination mode inside a criteria node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Evaluation {
    And,
    Or,
}

/// Field comparison operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperation {
    Equals,
    StartsWith,
}

/// One node of the server's filter tree.
///
/// Serializes with the `type` discriminator the endpoint expects:
/// `filterCriteria` for branches, `fieldFilter` for leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FilterNode {
    #[serde(rename = "filterCriteria", rename_all = "camelCase")]
    Criteria {
        evaluation_type: Evaluation,
        filters: Vec<FilterNode>,
    },
    #[serde(rename = "fieldFilter", rename_all = "camelCase")]
    Field {
        field_name: String,
        operation: FilterOperation,
        values: Vec<String>,
    },
}

impl FilterNode {
    /// AND-branch over the given children.
    pub fn all_of(filters: Vec<FilterNode>) -> Self {
        FilterNode::Criteria {
            evaluation_type: Evaluation::And,
            filters,
        }
    }

    /// Leaf matching one field against one value.
    pub fn field(name: &str, operation: FilterOperation, value: &str) -> Self {
        FilterNode::Field {
            field_name: name.to_string(),
            operation,
            values: vec![value.to_string()],
        }
    }
}

/// Body of the paged search endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub page_size: u32,
    /// 1-based page number.
    pub offset: u32,
    pub node: FilterNode,
}

/// Directory table row returned by the family search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySearchRow {
    pub id: FamilyId,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Picker row returned by the member search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSearchRow {
    pub id: MemberId,
    pub name: String,
}

/// Builds the directory family search body.
///
/// `unit` adds an EQUALS filter when set; blank `name_prefix` adds no name
/// filter, so both absent yields an empty AND node matching every family.
pub fn family_search_request(unit: Option<&str>, name_prefix: &str, page: u32) -> SearchRequest {
    let mut filters = Vec::new();
    if let Some(unit_key) = unit {
        filters.push(FilterNode::field("unit", FilterOperation::Equals, unit_key));
    }
    let trimmed = name_prefix.trim();
    if !trimmed.is_empty() {
        filters.push(FilterNode::field("name", FilterOperation::StartsWith, trimmed));
    }
    SearchRequest {
        page_size: SEARCH_PAGE_SIZE,
        offset: page,
        node: FilterNode::all_of(filters),
    }
}

/// Builds one page of the member picker search body.
pub fn member_search_request(name_prefix: &str, page: u32) -> SearchRequest {
    SearchRequest {
        page_size: SEARCH_PAGE_SIZE,
        offset: page,
        node: FilterNode::all_of(vec![FilterNode::field(
            "name",
            FilterOperation::StartsWith,
            name_prefix.trim(),
        )]),
    }
}

/// Accumulates member-search pages for incremental pickers.
///
/// Page 1 replaces the accumulated rows, later pages append. An empty page
/// drops `has_more`; any non-empty page raises it again. Blank input clears
/// the rows without issuing a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPager {
    search_text: String,
    page: u32,
    has_more: bool,
    rows: Vec<MemberSearchRow>,
}

impl SearchPager {
    pub fn new() -> Self {
        SearchPager {
            search_text: String::new(),
            page: 1,
            has_more: true,
            rows: Vec::new(),
        }
    }

    /// Starts a fresh search; `None` for blank input, which only clears rows.
    pub fn begin_search(&mut self, text: &str) -> Option<SearchRequest> {
        let trimmed = text.trim();
        self.search_text = trimmed.to_string();
        self.page = 1;
        self.has_more = true;
        if trimmed.is_empty() {
            self.rows.clear();
            return None;
        }
        Some(member_search_request(trimmed, self.page))
    }

    /// Returns the next-page request while more rows may exist.
    pub fn next_page(&mut self) -> Option<SearchRequest> {
        if !self.has_more || self.search_text.is_empty() {
            return None;
        }
        self.page += 1;
        Some(member_search_request(&self.search_text, self.page))
    }

    /// Feeds the response of the last issued request into the row set.
    pub fn absorb(&mut self, rows: Vec<MemberSearchRow>) {
        self.has_more = !rows.is_empty();
        if self.page <= 1 {
            self.rows = rows;
        } else {
            self.rows.extend(rows);
        }
    }

    /// Replaces the row set without touching the paging cursor.
    ///
    /// Used to pre-seed pickers with already-assigned members.
    pub fn seed(&mut self, rows: Vec<MemberSearchRow>) {
        self.rows = rows;
    }

    pub fn rows(&self) -> &[MemberSearchRow] {
        &self.rows
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }
}
