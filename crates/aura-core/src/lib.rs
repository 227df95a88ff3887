//! Aura Core
//!
//! Application-wide UI state shared between panels: the main workspace tab
//! container, the document it is showing, the selected drawing object and the
//! active color. State lives in an explicit [`AppContext`] created at startup
//! and torn down at exit.

mod color;
mod config;
mod context;
mod control;
mod dispatch;
mod document;
mod error;
mod registry;

pub use color::Color;
pub use config::Config;
pub use context::AppContext;
pub use control::ControlHandle;
pub use dispatch::{ui_channel, UiHandle, UiQueue};
pub use document::{Document, DocumentView, HasDocument, WorkspaceContent};
pub use error::CoreError;
pub use registry::{RegistryEvent, SharedWorkspace, Workspace, WorkspaceRegistry};

// Re-export the tab container
pub use aura_tabs::{
    ElementId, InputEvent, ItemId, SelectionChanged, SelectionMode, SelectionState,
    SubscriptionId, TabContainer, TabError, TabItem,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging. `RUST_LOG` wins over `default_filter`.
pub fn init_logging(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt().with_env_filter(filter).with_target(true).init();
}
