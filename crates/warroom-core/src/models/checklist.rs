//! Checklists copied from a playbook into a run.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Progress of a single checklist item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub enum ChecklistItemState {
    #[default]
    #[serde(rename = "")]
    Open,
    #[serde(rename = "in_progress")]
    InProgress,
    #[serde(rename = "closed")]
    Closed,
}

impl ChecklistItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecklistItemState::Open => "",
            ChecklistItemState::InProgress => "in_progress",
            ChecklistItemState::Closed => "closed",
        }
    }

    /// Marker used when rendering the item.
    pub fn with_icon(&self) -> &'static str {
        match self {
            ChecklistItemState::Open => "[ ]",
            ChecklistItemState::InProgress => "[~]",
            ChecklistItemState::Closed => "[x]",
        }
    }
}

impl FromStr for ChecklistItemState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "open" => Ok(ChecklistItemState::Open),
            "in_progress" => Ok(ChecklistItemState::InProgress),
            "closed" => Ok(ChecklistItemState::Closed),
            _ => Err(format!("Invalid checklist item state: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ChecklistItem {
    pub title: String,
    #[serde(default)]
    pub state: ChecklistItemState,
    /// Slash command suggested for the item, empty when none.
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub description: String,
}

impl ChecklistItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Checklist {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}
