//! Low-level interaction events delivered by the visual layer
//!
//! Only primary actions select a tab:
//! 1. Left mouse press
//! 2. Left release of a touch or pen pointer that is still over the item
//! 3. Focus arriving through directional keyboard navigation

use std::collections::HashSet;

use crate::arena::ElementId;

/// Parent links of the visual tree, used to walk from an event origin up to
/// the item container that holds it
pub trait VisualTree {
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    /// True if `element` is `ancestor` or lies beneath it
    fn is_within(&self, element: ElementId, ancestor: ElementId) -> bool {
        Ancestors::new(self, element).any(|el| el == ancestor)
    }
}

/// Walks from an element up through its parents, starting with the element
/// itself. Stops at the first repeated element, so a broken tree with a
/// parent cycle still ends.
pub struct Ancestors<'a, T: ?Sized> {
    tree: &'a T,
    next: Option<ElementId>,
    seen: HashSet<ElementId>,
}

impl<'a, T: VisualTree + ?Sized> Ancestors<'a, T> {
    pub fn new(tree: &'a T, element: ElementId) -> Self {
        Self {
            tree,
            next: Some(element),
            seen: HashSet::new(),
        }
    }
}

impl<T: VisualTree + ?Sized> Iterator for Ancestors<'_, T> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        let current = self.next.take()?;
        if !self.seen.insert(current) {
            tracing::warn!(element = %current, "Cycle in visual tree parent links");
            return None;
        }
        self.next = self.tree.parent(current);
        Some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerType {
    Mouse,
    Touch,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    None,
    Left,
    Middle,
    Right,
}

/// How keyboard focus arrived at an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMethod {
    Unspecified,
    /// Tab / Shift+Tab
    Tab,
    /// Arrow keys
    Directional,
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    PointerPressed {
        pointer: PointerType,
        button: MouseButton,
    },
    PointerReleased {
        pointer: PointerType,
        /// Button that started the press this release ends
        initial_button: MouseButton,
        /// Element under the pointer at release
        hit: Option<ElementId>,
    },
    GotFocus {
        navigation: NavigationMethod,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// Element the event originated from
    pub source: ElementId,
    pub kind: InputKind,
    /// Set once a handler consumed the event; unhandled events keep bubbling
    pub handled: bool,
}

impl InputEvent {
    pub fn new(source: ElementId, kind: InputKind) -> Self {
        Self {
            source,
            kind,
            handled: false,
        }
    }

    pub fn mouse_press(source: ElementId, button: MouseButton) -> Self {
        Self::new(
            source,
            InputKind::PointerPressed {
                pointer: PointerType::Mouse,
                button,
            },
        )
    }

    pub fn touch_release(source: ElementId, hit: Option<ElementId>) -> Self {
        Self::new(
            source,
            InputKind::PointerReleased {
                pointer: PointerType::Touch,
                initial_button: MouseButton::Left,
                hit,
            },
        )
    }

    pub fn focus(source: ElementId, navigation: NavigationMethod) -> Self {
        Self::new(source, InputKind::GotFocus { navigation })
    }
}
