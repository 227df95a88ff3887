//! Application context
//!
//! Created once at startup and handed to the panels that need shared UI state.
//! Everything touching the workspace runs on the UI loop; background tasks go
//! through the async setters, which queue onto the loop.

use parking_lot::RwLock;
use std::sync::Arc;

use aura_tabs::{ItemId, TabContainer, TabItem};

use crate::color::Color;
use crate::config::Config;
use crate::control::ControlHandle;
use crate::dispatch::{ui_channel, UiHandle, UiQueue};
use crate::document::{Document, DocumentView, WorkspaceContent};
use crate::error::CoreError;
use crate::registry::{SharedWorkspace, WorkspaceRegistry};
use crate::Result;

pub struct AppContext {
    config: Config,
    registry: Arc<WorkspaceRegistry>,
    ui: UiHandle,
}

impl AppContext {
    /// Build the context. The returned queue belongs to the UI loop.
    pub fn new(config: Config) -> (Self, UiQueue) {
        let (ui, queue) = ui_channel();
        let registry = Arc::new(WorkspaceRegistry::with_dispatch(
            config.default_color,
            ui.clone(),
        ));

        tracing::info!(
            selection_mode = %config.selection_mode,
            color = %config.default_color,
            "Application context created"
        );

        (
            Self {
                config,
                registry,
                ui,
            },
            queue,
        )
    }

    /// Load settings from the platform config dir, start logging and build
    /// the context
    pub fn start() -> Result<(Self, UiQueue)> {
        let config = Config::load_or_default(&Config::config_path())?;
        crate::init_logging(&config.log_filter);
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &Arc<WorkspaceRegistry> {
        &self.registry
    }

    pub fn ui(&self) -> &UiHandle {
        &self.ui
    }

    // === Workspace ===

    /// Create the main workspace and register it
    pub fn open_workspace(&self) -> SharedWorkspace {
        let workspace = Arc::new(RwLock::new(TabContainer::new(self.config.selection_mode)));
        self.registry.register_workspace(&workspace);
        workspace
    }

    fn workspace(&self) -> Result<SharedWorkspace> {
        self.registry
            .active_workspace()
            .ok_or(CoreError::NoWorkspace)
    }

    /// Open `document` in a new workspace tab and select it. The tab shows
    /// once the visual layer materializes it.
    pub fn open_document(&self, document: Arc<Document>) -> Result<ItemId> {
        let workspace = self.workspace()?;
        let view: Arc<dyn WorkspaceContent> = Arc::new(DocumentView::new(Arc::clone(&document)));
        let item = TabItem::new(document.name.clone()).with_content(view);

        let id = {
            let mut container = workspace.write();
            let id = container.add_item(item);
            container.select_item(id)?;
            id
        };
        self.registry.flush_events();

        tracing::info!(item_id = %id, document = %document.name, "Opened document tab");

        Ok(id)
    }

    /// Close a workspace tab on behalf of any panel
    pub fn close_tab(&self, id: ItemId) -> Result<()> {
        let workspace = self.workspace()?;
        workspace.write().close_tab(id)?;
        self.registry.flush_events();
        Ok(())
    }

    // === Background-safe setters ===

    pub async fn set_active_color(&self, color: Color) -> Result<()> {
        let registry = Arc::clone(&self.registry);
        self.ui
            .invoke(move || registry.set_active_color(color))
            .await
    }

    pub async fn set_selected_control(&self, control: Option<ControlHandle>) -> Result<()> {
        let registry = Arc::clone(&self.registry);
        self.ui
            .invoke(move || registry.set_selected_control(control))
            .await
    }

    /// Release the workspace binding at application exit
    pub fn shutdown(self) {
        self.registry.unregister_workspace();
        tracing::info!("Application context shut down");
    }
}
