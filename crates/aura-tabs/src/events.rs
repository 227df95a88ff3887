//! Change notifications

use std::fmt;
use std::sync::Arc;

use crate::item::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered list of event handlers
pub struct Subscribers<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.handlers.push((id, Arc::new(handler)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub, _)| *sub != id);
        self.handlers.len() != before
    }

    pub fn emit(&self, event: &E) {
        for (_, handler) in &self.handlers {
            handler(event);
        }
    }

    /// Handlers cloned out, so they can run after a lock guarding this list is
    /// released
    pub fn snapshot(&self) -> Vec<Handler<E>> {
        self.handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.handlers.len())
            .finish()
    }
}

/// Emitted when the settled selection of a container changes
#[derive(Debug)]
pub struct SelectionChanged<C: ?Sized> {
    /// Previously notified index
    pub previous: Option<usize>,
    pub index: Option<usize>,
    pub item: Option<ItemId>,
    /// Content of the newly selected item
    pub content: Option<Arc<C>>,
}

impl<C: ?Sized> Clone for SelectionChanged<C> {
    fn clone(&self) -> Self {
        Self {
            previous: self.previous,
            index: self.index,
            item: self.item,
            content: self.content.clone(),
        }
    }
}
