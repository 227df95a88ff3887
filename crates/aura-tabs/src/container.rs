//! Tab Container
//!
//! Owns the tab items and keeps `selected_content` / `selected_content_template`
//! in step with the selected item. Projection only happens once the selected
//! item's container has been realized by the visual layer; until then the
//! selection is pending and the surface keeps showing what it had.

use std::sync::Arc;

use crate::arena::{ContainerArena, ElementId};
use crate::error::TabError;
use crate::events::{SelectionChanged, Subscribers, SubscriptionId};
use crate::input::{Ancestors, InputEvent, InputKind, MouseButton, NavigationMethod, PointerType, VisualTree};
use crate::item::{same_ref, ItemId, TabItem, TemplateRef};
use crate::state::{SelectionMode, SelectionState};
use crate::Result;

#[derive(Debug)]
pub struct TabContainer<C: ?Sized> {
    /// Items in visual order
    items: Vec<TabItem<C>>,
    mode: SelectionMode,
    state: SelectionState,
    selected_content: Option<Arc<C>>,
    selected_content_template: Option<TemplateRef<C>>,
    /// Default template for items without their own
    content_template: Option<TemplateRef<C>>,
    /// Realized item containers, one slot per item
    containers: ContainerArena,
    subscribers: Subscribers<SelectionChanged<C>>,
    /// Last (index, item) announced to subscribers
    notified: Option<(usize, ItemId)>,
}

impl<C: ?Sized> TabContainer<C> {
    pub fn new(mode: SelectionMode) -> Self {
        Self::with_items(mode, Vec::new())
    }

    /// Build a container around existing items. In always-selected mode the
    /// first item is selected and projects once its container materializes.
    pub fn with_items(mode: SelectionMode, items: Vec<TabItem<C>>) -> Self {
        let state = if mode == SelectionMode::AlwaysSelected && !items.is_empty() {
            SelectionState::PendingMaterialization(0)
        } else {
            SelectionState::Unselected
        };

        Self {
            containers: ContainerArena::with_len(items.len()),
            items,
            mode,
            state,
            selected_content: None,
            selected_content_template: None,
            content_template: None,
            subscribers: Subscribers::new(),
            notified: None,
        }
    }

    pub fn items(&self) -> &[TabItem<C>] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&TabItem<C>> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Selected index, including a selection still waiting on materialization
    pub fn selected_index(&self) -> Option<usize> {
        self.state.index()
    }

    pub fn selected_item(&self) -> Option<&TabItem<C>> {
        self.state.index().and_then(|index| self.items.get(index))
    }

    pub fn selected_content(&self) -> Option<&Arc<C>> {
        self.selected_content.as_ref()
    }

    pub fn selected_content_template(&self) -> Option<&TemplateRef<C>> {
        self.selected_content_template.as_ref()
    }

    pub fn content_template(&self) -> Option<&TemplateRef<C>> {
        self.content_template.as_ref()
    }

    pub fn container_from_index(&self, index: usize) -> Option<ElementId> {
        self.containers.get(index)
    }

    pub fn index_from_container(&self, element: ElementId) -> Option<usize> {
        self.containers.index_of(element)
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&SelectionChanged<C>) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // === Selection ===

    /// Select the item at `index`, or clear the selection with `None`.
    ///
    /// Out-of-range indices never fail: always-selected mode falls back to the
    /// first item, single mode clears.
    pub fn select(&mut self, index: Option<usize>) {
        match index.and_then(|requested| self.coerce_index(requested)) {
            Some(index) => self.select_resolved(index),
            None => self.clear_selection(),
        }
    }

    pub fn select_item(&mut self, id: ItemId) -> Result<()> {
        let index = self.position(id).ok_or(TabError::NotFound(id))?;
        self.select(Some(index));
        Ok(())
    }

    fn coerce_index(&self, requested: usize) -> Option<usize> {
        if requested < self.items.len() {
            return Some(requested);
        }

        let clamped = match self.mode {
            SelectionMode::AlwaysSelected if !self.items.is_empty() => Some(0),
            _ => None,
        };

        tracing::debug!(
            requested,
            len = self.items.len(),
            clamped = ?clamped,
            "Selection index out of range"
        );

        clamped
    }

    fn select_resolved(&mut self, index: usize) {
        if self.containers.get(index).is_none() {
            let pending = SelectionState::PendingMaterialization(index);
            if self.state != pending {
                tracing::debug!(from = %self.state, to = %pending, "Selection waiting for container");
            }
            self.state = pending;
            return;
        }

        let selected = SelectionState::Selected(index);
        if self.state != selected {
            tracing::debug!(from = %self.state, to = %selected, "Selection transition");
        }
        self.state = selected;
        self.project(index);
        self.notify(false);
    }

    fn clear_selection(&mut self) {
        if self.state != SelectionState::Unselected {
            tracing::debug!(from = %self.state, "Selection cleared");
        }
        self.state = SelectionState::Unselected;
        self.selected_content_template = None;
        self.selected_content = None;
        self.notify(false);
    }

    /// Copy the item's content and template onto the surface. Each half is
    /// replaced only if it differs, so observers may see one change without
    /// the other.
    fn project(&mut self, index: usize) {
        let Some(item) = self.items.get(index) else {
            return;
        };
        let content = item.content().cloned();
        let template = self.resolve_template(item);

        if !same_ref(self.selected_content_template.as_ref(), template.as_ref()) {
            self.selected_content_template = template;
        }

        if !same_ref(self.selected_content.as_ref(), content.as_ref()) {
            self.selected_content = content;
        }
    }

    fn resolve_template(&self, item: &TabItem<C>) -> Option<TemplateRef<C>> {
        if let Some(template) = item.content_template() {
            return Some(Arc::clone(template));
        }

        let fallback = self.content_template.as_ref()?;
        let content = item.content()?;
        fallback
            .matches(content.as_ref())
            .then(|| Arc::clone(fallback))
    }

    /// Announce the settled selection if it differs from the last one
    /// announced, or unconditionally with `force`.
    fn notify(&mut self, force: bool) {
        let current = match self.state {
            SelectionState::Selected(index) => Some((index, self.items[index].id())),
            SelectionState::Unselected => None,
            SelectionState::PendingMaterialization(_) => return,
        };

        if current == self.notified && !force {
            return;
        }

        let previous = self.notified.map(|(index, _)| index);
        self.notified = current;

        if let Some((index, _)) = current {
            self.items[index].mark_selected();
        }

        let event = SelectionChanged {
            previous,
            index: current.map(|(index, _)| index),
            item: current.map(|(_, id)| id),
            content: self.selected_content.clone(),
        };

        tracing::debug!(
            previous = ?event.previous,
            index = ?event.index,
            subscribers = self.subscribers.len(),
            "Selection changed"
        );

        self.subscribers.emit(&event);
    }

    /// The surface was emptied while the next selection waits for its
    /// container. Observers hear about the blank surface now and about the
    /// replacement once it settles.
    fn announce_blank(&mut self) {
        let Some((previous, _)) = self.notified.take() else {
            return;
        };

        tracing::debug!(previous, "Selection surface cleared, replacement pending");

        self.subscribers.emit(&SelectionChanged {
            previous: Some(previous),
            index: None,
            item: None,
            content: None,
        });
    }

    /// Same item stays selected at a new position
    fn shift_selection(&mut self, index: usize) {
        self.state = self.state.with_index(index);
        self.notify(false);
    }

    // === Items ===

    pub fn add_item(&mut self, item: TabItem<C>) -> ItemId {
        self.insert_unchecked(self.items.len(), item)
    }

    pub fn insert_item(&mut self, index: usize, item: TabItem<C>) -> Result<ItemId> {
        if index > self.items.len() {
            return Err(TabError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }

        Ok(self.insert_unchecked(index, item))
    }

    fn insert_unchecked(&mut self, index: usize, item: TabItem<C>) -> ItemId {
        let id = item.id();
        self.items.insert(index, item);
        self.containers.insert_slot(index);

        tracing::info!(item_id = %id, index, len = self.items.len(), "Inserted tab item");

        match self.state.index() {
            Some(selected) if selected >= index => self.shift_selection(selected + 1),
            None if self.mode == SelectionMode::AlwaysSelected => self.select(Some(0)),
            _ => {}
        }

        id
    }

    /// Remove an item. If it was selected, the selection moves to the nearest
    /// remaining item (always-selected) or clears (single) before returning.
    pub fn remove_item(&mut self, id: ItemId) -> Result<TabItem<C>> {
        let index = self.position(id).ok_or(TabError::NotFound(id))?;

        let removed = self.items.remove(index);
        self.containers.remove_slot(index);

        match self.state.index() {
            Some(selected) if selected == index => {
                // A destroyed item's content must not stay on the surface while
                // the replacement waits for its container
                self.selected_content_template = None;
                self.selected_content = None;

                let next = match self.mode {
                    SelectionMode::AlwaysSelected if !self.items.is_empty() => {
                        Some(index.min(self.items.len() - 1))
                    }
                    _ => None,
                };
                self.select(next);
                if self.state.is_pending() {
                    self.announce_blank();
                }
            }
            Some(selected) if selected > index => self.shift_selection(selected - 1),
            _ => {}
        }

        tracing::info!(
            item_id = %id,
            index,
            remaining = self.items.len(),
            state = %self.state,
            "Removed tab item"
        );

        Ok(removed)
    }

    /// Close a tab, as requested from a tab header or another panel
    pub fn close_tab(&mut self, id: ItemId) -> Result<()> {
        self.remove_item(id).map(|_| ())
    }

    /// Replace an item's content. The selected item re-projects and re-announces
    /// so observers can re-resolve the new content.
    pub fn set_item_content(&mut self, id: ItemId, content: Option<Arc<C>>) -> Result<()> {
        let index = self.position(id).ok_or(TabError::NotFound(id))?;
        self.items[index].set_content(content);

        if self.state == SelectionState::Selected(index) {
            self.project(index);
            self.notify(true);
        }

        Ok(())
    }

    pub fn set_item_template(&mut self, id: ItemId, template: Option<TemplateRef<C>>) -> Result<()> {
        let index = self.position(id).ok_or(TabError::NotFound(id))?;
        self.items[index].set_template(template);

        if self.state == SelectionState::Selected(index) {
            self.project(index);
        }

        Ok(())
    }

    pub fn set_content_template(&mut self, template: Option<TemplateRef<C>>) {
        self.content_template = template;

        if let SelectionState::Selected(index) = self.state {
            self.project(index);
        }
    }

    // === Visual layer callbacks ===

    /// The visual layer realized the container for `index`. Completes a
    /// selection that was waiting on exactly this index; anything else only
    /// records the container.
    pub fn on_container_materialized(&mut self, index: usize, element: ElementId) {
        if !self.containers.realize(index, element) {
            tracing::debug!(
                index,
                element = %element,
                len = self.items.len(),
                "Ignoring container for missing item"
            );
            return;
        }

        match self.state {
            SelectionState::PendingMaterialization(pending) if pending == index => {
                self.select_resolved(index);
            }
            _ => {
                tracing::trace!(index, element = %element, state = %self.state, "Container realized");
            }
        }
    }

    /// The visual layer recycled the container for `index`
    pub fn on_container_released(&mut self, index: usize) {
        if let Some(element) = self.containers.release(index) {
            tracing::trace!(index, element = %element, "Container released");
        }
    }

    // === Input ===

    /// Select the tab an input event came from. Returns true and marks the
    /// event handled only if a selection change was attempted.
    pub fn handle_input<T>(&mut self, event: &mut InputEvent, tree: &T) -> bool
    where
        T: VisualTree + ?Sized,
    {
        let primary = match &event.kind {
            InputKind::PointerPressed {
                pointer: PointerType::Mouse,
                button: MouseButton::Left,
            } => true,
            InputKind::PointerReleased {
                pointer,
                initial_button: MouseButton::Left,
                hit,
            } if *pointer != PointerType::Mouse => {
                // Touch selects on release, and only if the finger is still
                // over the item it went down on
                match (self.container_from_source(event.source, tree), hit) {
                    (Some((_, container)), Some(hit)) => tree.is_within(*hit, container),
                    _ => false,
                }
            }
            InputKind::GotFocus {
                navigation: NavigationMethod::Directional,
            } => true,
            _ => false,
        };

        if !primary {
            return false;
        }

        let handled = self.update_selection_from_source(event.source, tree);
        if handled {
            event.handled = true;
        }
        handled
    }

    fn container_from_source<T>(&self, source: ElementId, tree: &T) -> Option<(usize, ElementId)>
    where
        T: VisualTree + ?Sized,
    {
        Ancestors::new(tree, source)
            .find_map(|element| self.containers.index_of(element).map(|index| (index, element)))
    }

    fn update_selection_from_source<T>(&mut self, source: ElementId, tree: &T) -> bool
    where
        T: VisualTree + ?Sized,
    {
        match self.container_from_source(source, tree) {
            Some((index, _)) => {
                self.select(Some(index));
                true
            }
            None => {
                tracing::trace!(source = %source, "Event source is not inside an item container");
                false
            }
        }
    }
}

impl<C: ?Sized> Default for TabContainer<C> {
    fn default() -> Self {
        Self::new(SelectionMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ContentTemplate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Named(&'static str);

    impl ContentTemplate<str> for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn matches(&self, content: &str) -> bool {
            content.starts_with("doc")
        }
    }

    #[derive(Default)]
    struct Tree(HashMap<ElementId, ElementId>);

    impl Tree {
        fn link(mut self, child: u64, parent: u64) -> Self {
            self.0.insert(ElementId(child), ElementId(parent));
            self
        }
    }

    impl VisualTree for Tree {
        fn parent(&self, element: ElementId) -> Option<ElementId> {
            self.0.get(&element).copied()
        }
    }

    fn item(header: &str, content: &str) -> TabItem<str> {
        TabItem::new(header).with_content(Arc::from(content))
    }

    fn container(mode: SelectionMode, contents: &[&str]) -> TabContainer<str> {
        let items = contents
            .iter()
            .enumerate()
            .map(|(i, c)| item(&format!("Tab {}", i), c))
            .collect();
        TabContainer::with_items(mode, items)
    }

    /// Realize every container as element 100 + index
    fn materialize_all(container: &mut TabContainer<str>) {
        for index in 0..container.len() {
            container.on_container_materialized(index, ElementId(100 + index as u64));
        }
    }

    fn record(container: &mut TabContainer<str>) -> Arc<Mutex<Vec<SelectionChanged<str>>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        container.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    fn content(container: &TabContainer<str>) -> Option<&str> {
        container.selected_content().map(|c| &**c)
    }

    #[test]
    fn test_select_projects_item() {
        let a: TemplateRef<str> = Arc::new(Named("a"));
        let b: TemplateRef<str> = Arc::new(Named("b"));
        let items = vec![
            item("A", "doc1").with_template(Arc::clone(&a)),
            item("B", "doc2").with_template(Arc::clone(&b)),
            item("C", "notes"),
        ];
        let mut tabs = TabContainer::with_items(SelectionMode::AlwaysSelected, items);
        materialize_all(&mut tabs);

        for i in 0..tabs.len() {
            tabs.select(Some(i));
            let expected = &tabs.items()[i];
            assert_eq!(tabs.state(), SelectionState::Selected(i));
            assert!(same_ref(tabs.selected_content(), expected.content()));
            assert!(same_ref(
                tabs.selected_content_template(),
                expected.content_template()
            ));
        }
    }

    #[test]
    fn test_select_none_clears_from_any_state() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        tabs.on_container_materialized(0, ElementId(1));
        assert_eq!(content(&tabs), Some("doc1"));

        // Selected -> Unselected
        tabs.select(None);
        assert_eq!(tabs.state(), SelectionState::Unselected);
        assert!(tabs.selected_content().is_none());
        assert!(tabs.selected_content_template().is_none());

        // Pending -> Unselected
        tabs.select(Some(1));
        assert!(tabs.state().is_pending());
        tabs.select(None);
        assert_eq!(tabs.selected_index(), None);
        assert!(tabs.selected_content().is_none());

        // Unselected -> Unselected
        tabs.select(None);
        assert!(tabs.selected_content().is_none());
    }

    #[test]
    fn test_remove_only_selected_item() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1"]);
        materialize_all(&mut tabs);
        let id = tabs.items()[0].id();

        tabs.remove_item(id).unwrap();

        assert_eq!(tabs.selected_index(), None);
        assert!(tabs.selected_content().is_none());
        assert!(tabs.is_empty());
    }

    #[test]
    fn test_remove_selected_of_three() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2", "doc3"]);
        materialize_all(&mut tabs);

        for removed_index in 0..3 {
            let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2", "doc3"]);
            materialize_all(&mut tabs);
            tabs.select(Some(removed_index));
            let removed = tabs.items()[removed_index].id();

            tabs.remove_item(removed).unwrap();

            let index = tabs.selected_index().unwrap();
            assert!(index < tabs.len());
            assert_ne!(tabs.items()[index].id(), removed);
            assert!(same_ref(tabs.selected_content(), tabs.items()[index].content()));
        }

        // Last item removed picks the new last item
        let last = tabs.items()[2].id();
        tabs.select(Some(2));
        tabs.remove_item(last).unwrap();
        assert_eq!(tabs.selected_index(), Some(1));
        assert_eq!(content(&tabs), Some("doc2"));
    }

    #[test]
    fn test_remove_selected_in_single_mode_clears() {
        let mut tabs = container(SelectionMode::Single, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        tabs.select(Some(0));
        let id = tabs.items()[0].id();

        tabs.remove_item(id).unwrap();

        assert_eq!(tabs.state(), SelectionState::Unselected);
        assert!(tabs.selected_content().is_none());
    }

    #[test]
    fn test_repeat_select_does_not_renotify() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        let events = record(&mut tabs);

        tabs.select(Some(1));
        let after_first = (tabs.state(), tabs.selected_content().cloned());
        tabs.select(Some(1));

        assert_eq!(events.lock().unwrap().len(), 1);
        assert_eq!(tabs.state(), after_first.0);
        assert!(same_ref(tabs.selected_content(), after_first.1.as_ref()));
    }

    #[test]
    fn test_deferred_materialization() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2", "doc3"]);
        tabs.on_container_materialized(0, ElementId(100));
        assert_eq!(content(&tabs), Some("doc1"));
        let events = record(&mut tabs);

        tabs.select(Some(1));
        assert_eq!(tabs.state(), SelectionState::PendingMaterialization(1));
        assert_eq!(tabs.selected_index(), Some(1));
        assert_eq!(content(&tabs), Some("doc1"));

        // Stale callback for another index changes nothing
        tabs.on_container_materialized(2, ElementId(102));
        assert_eq!(tabs.state(), SelectionState::PendingMaterialization(1));
        assert_eq!(content(&tabs), Some("doc1"));
        assert!(events.lock().unwrap().is_empty());

        tabs.on_container_materialized(1, ElementId(101));
        assert_eq!(tabs.state(), SelectionState::Selected(1));
        assert_eq!(content(&tabs), Some("doc2"));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].previous, Some(0));
        assert_eq!(events[0].index, Some(1));
    }

    #[test]
    fn test_abandoned_pending_selection() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2", "doc3"]);
        tabs.on_container_materialized(0, ElementId(100));

        tabs.select(Some(1));
        tabs.select(Some(2));

        tabs.on_container_materialized(1, ElementId(101));
        assert_eq!(tabs.state(), SelectionState::PendingMaterialization(2));
        assert_eq!(content(&tabs), Some("doc1"));

        tabs.on_container_materialized(2, ElementId(102));
        assert_eq!(content(&tabs), Some("doc3"));

        // Late duplicate callback is harmless
        tabs.on_container_materialized(1, ElementId(101));
        assert_eq!(tabs.state(), SelectionState::Selected(2));
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        assert_eq!(tabs.selected_index(), Some(0));

        tabs.select(Some(1));
        assert_eq!(content(&tabs), Some("doc2"));

        let b = tabs.items()[1].id();
        tabs.remove_item(b).unwrap();
        assert_eq!(tabs.selected_index(), Some(0));
        assert_eq!(content(&tabs), Some("doc1"));
    }

    #[test]
    fn test_initial_selection_waits_for_container() {
        let tabs = container(SelectionMode::AlwaysSelected, &["doc1"]);
        assert_eq!(tabs.state(), SelectionState::PendingMaterialization(0));
        assert!(tabs.selected_content().is_none());

        let tabs = container(SelectionMode::Single, &["doc1"]);
        assert_eq!(tabs.state(), SelectionState::Unselected);

        let tabs: TabContainer<str> = TabContainer::new(SelectionMode::AlwaysSelected);
        assert_eq!(tabs.state(), SelectionState::Unselected);
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        tabs.select(Some(1));

        tabs.select(Some(7));
        assert_eq!(tabs.selected_index(), Some(0));
        assert_eq!(content(&tabs), Some("doc1"));

        let mut single = container(SelectionMode::Single, &["doc1"]);
        materialize_all(&mut single);
        single.select(Some(0));
        single.select(Some(3));
        assert_eq!(single.selected_index(), None);

        let mut empty: TabContainer<str> = TabContainer::new(SelectionMode::AlwaysSelected);
        empty.select(Some(0));
        assert_eq!(empty.selected_index(), None);
    }

    #[test]
    fn test_template_and_content_change_independently() {
        let shared: Arc<str> = Arc::from("doc1");
        let a: TemplateRef<str> = Arc::new(Named("a"));
        let b: TemplateRef<str> = Arc::new(Named("b"));
        let items = vec![
            TabItem::new("A")
                .with_content(Arc::clone(&shared))
                .with_template(Arc::clone(&a)),
            TabItem::new("B")
                .with_content(Arc::clone(&shared))
                .with_template(Arc::clone(&b)),
        ];
        let mut tabs = TabContainer::with_items(SelectionMode::AlwaysSelected, items);
        materialize_all(&mut tabs);

        let before = tabs.selected_content().cloned().unwrap();
        tabs.select(Some(1));

        assert!(Arc::ptr_eq(tabs.selected_content().unwrap(), &before));
        assert!(Arc::ptr_eq(tabs.selected_content_template().unwrap(), &b));
    }

    #[test]
    fn test_default_template_fallback() {
        let fallback: TemplateRef<str> = Arc::new(Named("document"));
        let own: TemplateRef<str> = Arc::new(Named("own"));
        let items = vec![
            item("A", "doc1"),
            item("B", "notes"),
            item("C", "doc3").with_template(Arc::clone(&own)),
        ];
        let mut tabs = TabContainer::with_items(SelectionMode::AlwaysSelected, items);
        materialize_all(&mut tabs);
        assert!(tabs.selected_content_template().is_none());

        tabs.set_content_template(Some(Arc::clone(&fallback)));
        assert!(Arc::ptr_eq(tabs.selected_content_template().unwrap(), &fallback));

        // Fallback does not match non-document content
        tabs.select(Some(1));
        assert!(tabs.selected_content_template().is_none());

        // Item template wins over the fallback
        tabs.select(Some(2));
        assert!(Arc::ptr_eq(tabs.selected_content_template().unwrap(), &own));
    }

    #[test]
    fn test_removing_earlier_item_shifts_selection() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2", "doc3"]);
        materialize_all(&mut tabs);
        tabs.select(Some(2));
        let events = record(&mut tabs);

        let first = tabs.items()[0].id();
        tabs.remove_item(first).unwrap();

        assert_eq!(tabs.selected_index(), Some(1));
        assert_eq!(content(&tabs), Some("doc3"));
        assert_eq!(tabs.container_from_index(1), Some(ElementId(102)));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].previous, Some(2));
        assert_eq!(events[0].index, Some(1));
    }

    #[test]
    fn test_removed_selection_never_shows_stale_content() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        tabs.on_container_materialized(0, ElementId(100));
        let first = tabs.items()[0].id();

        tabs.remove_item(first).unwrap();

        // doc2 has no container yet, so the selection waits with an empty surface
        assert_eq!(tabs.state(), SelectionState::PendingMaterialization(0));
        assert!(tabs.selected_content().is_none());

        tabs.on_container_materialized(0, ElementId(101));
        assert_eq!(content(&tabs), Some("doc2"));
    }

    #[test]
    fn test_removed_selection_announces_blank_surface() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        tabs.on_container_materialized(0, ElementId(100));
        let events = record(&mut tabs);
        let first = tabs.items()[0].id();
        let second = tabs.items()[1].id();

        tabs.remove_item(first).unwrap();
        {
            let events = events.lock().unwrap();
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].previous, Some(0));
            assert_eq!(events[0].index, None);
            assert_eq!(events[0].item, None);
            assert!(events[0].content.is_none());
        }

        // The replacement is announced once it settles, even at the same index
        tabs.on_container_materialized(0, ElementId(101));
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].previous, None);
        assert_eq!(events[1].index, Some(0));
        assert_eq!(events[1].item, Some(second));
        assert_eq!(events[1].content.as_deref(), Some("doc2"));
    }

    #[test]
    fn test_input_from_cyclic_tree_is_left_unhandled() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        // 7 -> 6 -> 7, never reaching an item container
        let tree = Tree::default().link(7, 6).link(6, 7);

        let mut event = InputEvent::mouse_press(ElementId(7), MouseButton::Left);
        assert!(!tabs.handle_input(&mut event, &tree));
        assert!(!event.handled);
        assert_eq!(tabs.selected_index(), Some(0));

        let mut event = InputEvent::touch_release(ElementId(101), Some(ElementId(7)));
        assert!(!tabs.handle_input(&mut event, &tree));
    }

    #[test]
    fn test_insert_items() {
        let mut tabs: TabContainer<str> = TabContainer::new(SelectionMode::AlwaysSelected);
        let a = tabs.add_item(item("A", "doc1"));
        assert_eq!(tabs.state(), SelectionState::PendingMaterialization(0));

        tabs.on_container_materialized(0, ElementId(100));
        assert_eq!(content(&tabs), Some("doc1"));

        let b = tabs.insert_item(0, item("B", "doc2")).unwrap();
        assert_eq!(tabs.position(b), Some(0));
        assert_eq!(tabs.selected_index(), Some(1));
        assert_eq!(tabs.selected_item().unwrap().id(), a);
        assert_eq!(tabs.index_from_container(ElementId(100)), Some(1));

        let err = tabs.insert_item(5, item("C", "doc3")).unwrap_err();
        assert_eq!(err, TabError::IndexOutOfRange { index: 5, len: 2 });
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1"]);
        let stranger = ItemId::new();
        assert_eq!(tabs.remove_item(stranger).unwrap_err(), TabError::NotFound(stranger));
        assert!(tabs.select_item(stranger).is_err());
        assert!(tabs.close_tab(stranger).is_err());
        assert_eq!(tabs.len(), 1);
    }

    #[test]
    fn test_content_update_reannounces() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        let events = record(&mut tabs);
        let first = tabs.items()[0].id();
        let second = tabs.items()[1].id();

        tabs.set_item_content(first, Some(Arc::from("doc9"))).unwrap();
        assert_eq!(content(&tabs), Some("doc9"));

        // Unselected item changes quietly
        tabs.set_item_content(second, Some(Arc::from("doc8"))).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].content.as_deref(), Some("doc9"));
    }

    #[test]
    fn test_selection_records_time() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        assert!(tabs.items()[0].last_selected_at().is_none());
        materialize_all(&mut tabs);
        assert!(tabs.items()[0].last_selected_at().is_some());
        assert!(tabs.items()[1].last_selected_at().is_none());
    }

    #[test]
    fn test_released_container_defers_selection() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        tabs.on_container_released(1);
        assert_eq!(tabs.container_from_index(1), None);

        tabs.select(Some(1));
        assert!(tabs.state().is_pending());
        assert_eq!(content(&tabs), Some("doc1"));
    }

    #[test]
    fn test_mouse_press_selects_from_nested_origin() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        // header text 7 -> header 6 -> item container 101 -> strip 50
        let tree = Tree::default().link(7, 6).link(6, 101).link(101, 50);

        let mut event = InputEvent::mouse_press(ElementId(7), MouseButton::Left);
        assert!(tabs.handle_input(&mut event, &tree));
        assert!(event.handled);
        assert_eq!(content(&tabs), Some("doc2"));
    }

    #[test]
    fn test_non_primary_input_is_ignored() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        let tree = Tree::default().link(7, 101);

        let mut right = InputEvent::mouse_press(ElementId(7), MouseButton::Right);
        assert!(!tabs.handle_input(&mut right, &tree));
        assert!(!right.handled);

        let mut tab_key = InputEvent::focus(ElementId(7), NavigationMethod::Tab);
        assert!(!tabs.handle_input(&mut tab_key, &tree));

        let mut touch_press = InputEvent::new(
            ElementId(7),
            InputKind::PointerPressed {
                pointer: PointerType::Touch,
                button: MouseButton::Left,
            },
        );
        assert!(!tabs.handle_input(&mut touch_press, &tree));

        assert_eq!(tabs.selected_index(), Some(0));
    }

    #[test]
    fn test_unresolved_source_is_left_unhandled() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        let tree = Tree::default().link(7, 50);

        let mut event = InputEvent::mouse_press(ElementId(7), MouseButton::Left);
        assert!(!tabs.handle_input(&mut event, &tree));
        assert!(!event.handled);
        assert_eq!(tabs.selected_index(), Some(0));
    }

    #[test]
    fn test_touch_release_requires_hit_inside_item() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        let tree = Tree::default().link(7, 101).link(8, 50);

        // Finger slid off the item
        let mut outside = InputEvent::touch_release(ElementId(7), Some(ElementId(8)));
        assert!(!tabs.handle_input(&mut outside, &tree));
        assert_eq!(tabs.selected_index(), Some(0));

        let mut inside = InputEvent::touch_release(ElementId(7), Some(ElementId(7)));
        assert!(tabs.handle_input(&mut inside, &tree));
        assert!(inside.handled);
        assert_eq!(content(&tabs), Some("doc2"));
    }

    #[test]
    fn test_directional_focus_selects() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        let tree = Tree::default();

        let mut event = InputEvent::focus(ElementId(101), NavigationMethod::Directional);
        assert!(tabs.handle_input(&mut event, &tree));
        assert_eq!(tabs.selected_index(), Some(1));
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let mut tabs = container(SelectionMode::AlwaysSelected, &["doc1", "doc2"]);
        materialize_all(&mut tabs);
        let events = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&events);
        let id = tabs.subscribe(move |_| *sink.lock().unwrap() += 1);

        tabs.select(Some(1));
        assert!(tabs.unsubscribe(id));
        tabs.select(Some(0));

        assert_eq!(*events.lock().unwrap(), 1);
    }
}
