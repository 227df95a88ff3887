//! Tab item data structure
//!
//! An item carries opaque content, an optional template used to render that
//! content, and a header for the tab strip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Stable identity of a tab item, independent of its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rendering strategy for a kind of content.
///
/// Templates are compared by reference: two distinct `Arc`s are different
/// templates even if they render identically.
pub trait ContentTemplate<C: ?Sized>: fmt::Debug + Send + Sync {
    /// Name used in logs and by the visual layer to pick a renderer
    fn name(&self) -> &str;

    /// Whether this template can render `content`. Only consulted for the
    /// container-wide default template.
    fn matches(&self, content: &C) -> bool {
        let _ = content;
        true
    }
}

pub type TemplateRef<C> = Arc<dyn ContentTemplate<C>>;

#[derive(Debug)]
pub struct TabItem<C: ?Sized> {
    id: ItemId,
    /// Text shown in the tab strip
    header: String,
    content: Option<Arc<C>>,
    content_template: Option<TemplateRef<C>>,
    /// Last time this item became the selected item
    last_selected_at: Option<DateTime<Utc>>,
}

impl<C: ?Sized> TabItem<C> {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            header: header.into(),
            content: None,
            content_template: None,
            last_selected_at: None,
        }
    }

    pub fn with_content(mut self, content: Arc<C>) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_template(mut self, template: TemplateRef<C>) -> Self {
        self.content_template = Some(template);
        self
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn set_header(&mut self, header: impl Into<String>) {
        self.header = header.into();
    }

    pub fn content(&self) -> Option<&Arc<C>> {
        self.content.as_ref()
    }

    pub fn content_template(&self) -> Option<&TemplateRef<C>> {
        self.content_template.as_ref()
    }

    pub fn last_selected_at(&self) -> Option<DateTime<Utc>> {
        self.last_selected_at
    }

    pub(crate) fn set_content(&mut self, content: Option<Arc<C>>) {
        self.content = content;
    }

    pub(crate) fn set_template(&mut self, template: Option<TemplateRef<C>>) {
        self.content_template = template;
    }

    pub(crate) fn mark_selected(&mut self) {
        self.last_selected_at = Some(Utc::now());
    }
}

impl<C: ?Sized> Clone for TabItem<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            header: self.header.clone(),
            content: self.content.clone(),
            content_template: self.content_template.clone(),
            last_selected_at: self.last_selected_at,
        }
    }
}

/// Reference equality for optional shared values
pub(crate) fn same_ref<T: ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
