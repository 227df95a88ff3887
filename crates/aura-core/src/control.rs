//! Handle to the drawing object currently selected on the canvas

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlHandle {
    pub id: Uuid,
    /// Object kind, e.g. "rectangle" or "path"
    pub kind: String,
}

impl ControlHandle {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
        }
    }
}
