//! Selection State Machine
//!
//! ```text
//!                 select(None)
//!   any state ─────────────────────────────► Unselected
//!
//!                 select(Some(i)), container ready
//!   any state ─────────────────────────────► Selected(i)
//!
//!                 select(Some(i)), container missing
//!   any state ─────────────────────────────► PendingMaterialization(i)
//!
//!                 container i materialized
//!   PendingMaterialization(i) ─────────────► Selected(i)
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// Nothing is selected, projected content is empty
    #[default]
    Unselected,
    /// The item at this index is selected and its content is projected
    Selected(usize),
    /// The item at this index is selected but its container has not been
    /// realized yet, so projection is deferred
    PendingMaterialization(usize),
}

impl SelectionState {
    /// Index of the selected item, settled or pending
    pub fn index(&self) -> Option<usize> {
        match self {
            SelectionState::Unselected => None,
            SelectionState::Selected(index) | SelectionState::PendingMaterialization(index) => {
                Some(*index)
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SelectionState::PendingMaterialization(_))
    }

    /// Same state kind, pointing at a different index
    pub(crate) fn with_index(&self, index: usize) -> SelectionState {
        match self {
            SelectionState::Unselected => SelectionState::Unselected,
            SelectionState::Selected(_) => SelectionState::Selected(index),
            SelectionState::PendingMaterialization(_) => {
                SelectionState::PendingMaterialization(index)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionState::Unselected => "unselected",
            SelectionState::Selected(_) => "selected",
            SelectionState::PendingMaterialization(_) => "pending",
        }
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index() {
            Some(index) => write!(f, "{}({})", self.as_str(), index),
            None => write!(f, "{}", self.as_str()),
        }
    }
}

/// How the container treats an empty selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionMode {
    /// Selection may be empty; invalid indices clear it
    Single,
    /// A non-empty container keeps a valid selection whenever the container
    /// itself decides (clamping, removal, insertion)
    #[default]
    AlwaysSelected,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Single => "single",
            SelectionMode::AlwaysSelected => "always-selected",
        }
    }
}

impl std::fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(SelectionMode::Single),
            "always-selected" | "alwaysselected" => Ok(SelectionMode::AlwaysSelected),
            _ => Err(format!("Unknown selection mode: {}", s)),
        }
    }
}
