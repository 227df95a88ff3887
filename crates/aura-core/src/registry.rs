//! Workspace Registry
//!
//! Cross-panel UI state: which tab container is the main workspace, which
//! document it is showing, which drawing object is selected and which color is
//! active. Panels read it and subscribe to [`RegistryEvent`]s instead of
//! talking to one another.
//!
//! Selection changes arrive while the caller still holds the workspace write
//! lock. The registry state is updated right away, but the resulting
//! [`RegistryEvent::DocumentChanged`] is held back and delivered from the UI
//! queue, or from [`WorkspaceRegistry::flush_events`], once that lock is gone.
//! Listeners are therefore free to read the workspace.

use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};

use aura_tabs::{Subscribers, SubscriptionId, TabContainer};

use crate::color::Color;
use crate::control::ControlHandle;
use crate::dispatch::UiHandle;
use crate::document::{Document, WorkspaceContent};

pub type Workspace = TabContainer<dyn WorkspaceContent>;
pub type SharedWorkspace = Arc<RwLock<Workspace>>;

#[derive(Debug, Clone)]
pub enum RegistryEvent {
    DocumentChanged(Option<Arc<Document>>),
    SelectedControlChanged(Option<ControlHandle>),
    ColorChanged(Color),
}

#[derive(Debug)]
struct RegistryState {
    active_document: Option<Arc<Document>>,
    selected_control: Option<ControlHandle>,
    active_color: Color,
}

#[derive(Debug)]
struct Shared {
    state: RwLock<RegistryState>,
    listeners: RwLock<Subscribers<RegistryEvent>>,
    /// Events raised under a workspace lock, waiting for delivery
    pending: Mutex<Vec<RegistryEvent>>,
    dispatch: Option<UiHandle>,
}

impl Shared {
    /// Handlers run after every registry lock is released, so they may read
    /// the registry back. Callers must not hold the workspace lock.
    fn emit(&self, event: RegistryEvent) {
        let handlers = self.listeners.read().snapshot();
        for handler in handlers {
            handler(&event);
        }
    }

    /// Adopt the document of newly selected content and return the event to
    /// announce. Content without a document leaves the active document in
    /// place.
    fn apply_selection(
        &self,
        content: Option<&Arc<dyn WorkspaceContent>>,
    ) -> Option<RegistryEvent> {
        let Some(document) = content
            .and_then(|content| content.as_document_host())
            .map(|host| Arc::clone(host.document()))
        else {
            tracing::trace!("Selected content has no document, keeping active document");
            return None;
        };

        {
            let mut state = self.state.write();
            if let Some(current) = &state.active_document {
                if Arc::ptr_eq(current, &document) {
                    return None;
                }
            }
            state.active_document = Some(Arc::clone(&document));
        }

        tracing::info!(
            document_id = %document.id,
            document = %document.name,
            "Active document changed"
        );
        Some(RegistryEvent::DocumentChanged(Some(document)))
    }

    /// Hold `event` until the workspace lock is released. With a UI queue
    /// attached, delivery is scheduled as the next queued task.
    fn defer(self: &Arc<Self>, event: RegistryEvent) {
        self.pending.lock().push(event);

        let Some(ui) = &self.dispatch else {
            return;
        };
        let shared = Arc::downgrade(self);
        let posted = ui.post(move || {
            if let Some(shared) = shared.upgrade() {
                shared.flush();
            }
        });
        if posted.is_err() {
            tracing::debug!("UI loop closed, registry events wait for an explicit flush");
        }
    }

    fn flush(&self) -> usize {
        let events = std::mem::take(&mut *self.pending.lock());
        let delivered = events.len();
        for event in events {
            self.emit(event);
        }
        delivered
    }
}

struct Binding {
    workspace: Weak<RwLock<Workspace>>,
    subscription: SubscriptionId,
}

pub struct WorkspaceRegistry {
    shared: Arc<Shared>,
    binding: Mutex<Option<Binding>>,
}

impl WorkspaceRegistry {
    /// Registry without a UI queue. Workspace-driven events are delivered by
    /// [`Self::flush_events`].
    pub fn new(initial_color: Color) -> Self {
        Self::build(initial_color, None)
    }

    /// Registry that delivers workspace-driven events through the UI queue
    pub fn with_dispatch(initial_color: Color, ui: UiHandle) -> Self {
        Self::build(initial_color, Some(ui))
    }

    fn build(initial_color: Color, dispatch: Option<UiHandle>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(RegistryState {
                    active_document: None,
                    selected_control: None,
                    active_color: initial_color,
                }),
                listeners: RwLock::new(Subscribers::new()),
                pending: Mutex::new(Vec::new()),
                dispatch,
            }),
            binding: Mutex::new(None),
        }
    }

    // === Workspace ===

    /// Make `workspace` the main workspace. A previous registration is
    /// released first, so only the latest workspace drives the active
    /// document.
    pub fn register_workspace(&self, workspace: &SharedWorkspace) {
        let mut binding = self.binding.lock();

        if let Some(previous) = binding.take() {
            Self::release(previous);
        }

        let shared = Arc::downgrade(&self.shared);
        let mut container = workspace.write();
        let subscription = container.subscribe(move |event| {
            if let Some(shared) = shared.upgrade() {
                if let Some(change) = shared.apply_selection(event.content.as_ref()) {
                    shared.defer(change);
                }
            }
        });

        *binding = Some(Binding {
            workspace: Arc::downgrade(workspace),
            subscription,
        });

        tracing::info!(
            subscription = %subscription,
            tabs = container.len(),
            "Registered workspace"
        );

        // Only a settled selection counts, same as for notifications
        let current = if container.state().is_pending() {
            None
        } else {
            container.selected_content().cloned()
        };

        drop(container);
        drop(binding);

        self.flush_events();
        if let Some(change) = self.shared.apply_selection(current.as_ref()) {
            self.shared.emit(change);
        }
    }

    /// Deliver events held back while a workspace was locked. Call with no
    /// workspace lock held. Returns the number of events delivered.
    pub fn flush_events(&self) -> usize {
        self.shared.flush()
    }

    /// Release the workspace binding. Safe to call more than once.
    pub fn unregister_workspace(&self) {
        if let Some(previous) = self.binding.lock().take() {
            Self::release(previous);
            tracing::info!("Unregistered workspace");
        }
    }

    fn release(binding: Binding) {
        if let Some(workspace) = binding.workspace.upgrade() {
            workspace.write().unsubscribe(binding.subscription);
        }
    }

    pub fn active_workspace(&self) -> Option<SharedWorkspace> {
        self.binding
            .lock()
            .as_ref()
            .and_then(|binding| binding.workspace.upgrade())
    }

    // === Document ===

    pub fn active_document(&self) -> Option<Arc<Document>> {
        self.shared.state.read().active_document.clone()
    }

    pub fn set_active_document(&self, document: Option<Arc<Document>>) {
        {
            let mut state = self.shared.state.write();
            let unchanged = match (&state.active_document, &document) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            if unchanged {
                return;
            }
            state.active_document = document.clone();
        }
        self.shared.emit(RegistryEvent::DocumentChanged(document));
    }

    // === Selected control ===

    pub fn selected_control(&self) -> Option<ControlHandle> {
        self.shared.state.read().selected_control.clone()
    }

    pub fn set_selected_control(&self, control: Option<ControlHandle>) {
        {
            let mut state = self.shared.state.write();
            if state.selected_control == control {
                return;
            }
            state.selected_control = control.clone();
        }
        tracing::debug!(control = ?control, "Selected control changed");
        self.shared
            .emit(RegistryEvent::SelectedControlChanged(control));
    }

    // === Color ===

    pub fn active_color(&self) -> Color {
        self.shared.state.read().active_color
    }

    pub fn set_active_color(&self, color: Color) {
        {
            let mut state = self.shared.state.write();
            if state.active_color == color {
                return;
            }
            state.active_color = color;
        }
        tracing::debug!(color = %color, "Active color changed");
        self.shared.emit(RegistryEvent::ColorChanged(color));
    }

    // === Listeners ===

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&RegistryEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.write().subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.listeners.write().unsubscribe(id)
    }
}

impl Default for WorkspaceRegistry {
    fn default() -> Self {
        Self::new(Color::default())
    }
}

impl Drop for WorkspaceRegistry {
    fn drop(&mut self) {
        self.unregister_workspace();
    }
}
