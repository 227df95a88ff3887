//! Tab error types

use thiserror::Error;

use crate::item::ItemId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabError {
    #[error("Tab item not found: {0}")]
    NotFound(ItemId),

    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },
}
