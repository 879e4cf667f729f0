//! Filtering, pagination and list result types.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::PlaybookRun;

/// Items per page when the caller does not ask for a size.
pub const DEFAULT_PER_PAGE: u32 = 100;
/// Largest page a caller can request.
pub const MAX_PER_PAGE: u32 = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {s}")),
        }
    }
}

/// Store-level filter with pagination already normalized.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    pub team_id: String,
    pub owner_user_id: Option<String>,
    pub status: Option<String>,
    pub search_term: Option<String>,
    pub direction: SortDirection,
    pub page: u32,
    pub per_page: u32,
}

impl RunFilter {
    /// Resolves a requested page size: 0 means the default, and anything
    /// above the maximum is capped.
    pub fn page_size(requested: u32) -> u32 {
        match requested {
            0 => DEFAULT_PER_PAGE,
            n => n.min(MAX_PER_PAGE),
        }
    }
}

/// One page of runs the requester can view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunListResults {
    pub total_count: u64,
    pub page_count: u64,
    pub has_more: bool,
    pub items: Vec<PlaybookRun>,
    /// Set when the run feature is turned off for the team
    #[serde(default)]
    pub disabled: bool,
}

impl RunListResults {
    pub fn disabled() -> Self {
        Self {
            disabled: true,
            ..Default::default()
        }
    }

    pub fn from_page(items: Vec<PlaybookRun>, total_count: u64, page: u32, per_page: u32) -> Self {
        let per_page = u64::from(per_page.max(1));
        let page_count = total_count.div_ceil(per_page);
        let has_more = (u64::from(page) + 1) < page_count;
        Self {
            total_count,
            page_count,
            has_more,
            items,
            disabled: false,
        }
    }
}

/// Suggestion returned by checklist autocomplete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutocompleteItem {
    /// `"<checklist index> <item index>"`
    pub item: String,
    pub hint: String,
    pub help_text: String,
}
