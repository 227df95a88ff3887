//! Aura Tab Container
//!
//! A tabbed container that tracks the selected tab and projects its content
//! and template into a shared display surface. Item containers are realized
//! lazily by the visual layer, so selection can be pending until the selected
//! item's container materializes.

mod arena;
mod container;
mod error;
mod events;
mod input;
mod item;
mod state;

pub use arena::{ContainerArena, ElementId};
pub use container::TabContainer;
pub use error::TabError;
pub use events::{Handler, SelectionChanged, Subscribers, SubscriptionId};
pub use input::{Ancestors, InputEvent, InputKind, MouseButton, NavigationMethod, PointerType, VisualTree};
pub use item::{ContentTemplate, ItemId, TabItem, TemplateRef};
pub use state::{SelectionMode, SelectionState};

pub type Result<T> = std::result::Result<T, TabError>;
