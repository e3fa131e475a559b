// SPDX-License-Identifier: MIT
//
// FocusRegistry — which widget receives input.
//
// Widgets are plain rectangles with a `focusable` flag. They are kept in
// a registration list separate from the window stack: registering links
// at the head, so walking `next` from the head gives newest-first and
// walking `prev` from the tail gives insertion order.
//
// The registry holds one non-owning focus handle. Unregistering the
// focused widget clears it; stale handles are never accepted.
//
// Directional traversal (`focus_next` / `focus_prev`) walks insertion
// order, skips non-focusable widgets and wraps at either end.

use slotmap::{SlotMap, new_key_type};
use tracing::debug;

new_key_type! {
    /// Handle to a widget in a [`FocusRegistry`].
    pub struct WidgetId;
}

// ─── Widget ──────────────────────────────────────────────────────────────────

/// A focusable region, independent of any screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Widget {
    /// Left column of the hit rectangle.
    pub x: i32,
    /// Top row of the hit rectangle.
    pub y: i32,
    /// Width in columns.
    pub w: i32,
    /// Height in rows.
    pub h: i32,
    /// Whether directional traversal may land here.
    pub focusable: bool,
}

impl Widget {
    /// A focusable widget.
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            x,
            y,
            w,
            h,
            focusable: true,
        }
    }

    /// Same widget with `focusable` set.
    #[must_use]
    pub const fn focusable(mut self, focusable: bool) -> Self {
        self.focusable = focusable;
        self
    }
}

#[derive(Debug)]
struct Entry {
    widget: Widget,
    /// Newer neighbour (towards the head).
    prev: Option<WidgetId>,
    /// Older neighbour (towards the tail).
    next: Option<WidgetId>,
}

// ─── FocusRegistry ───────────────────────────────────────────────────────────

/// Registered widgets and the single focused one, if any.
#[derive(Debug)]
pub struct FocusRegistry {
    entries: SlotMap<WidgetId, Entry>,
    head: Option<WidgetId>,
    tail: Option<WidgetId>,
    focus: Option<WidgetId>,
}

impl Default for FocusRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusRegistry {
    /// An empty registry with nothing focused.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            head: None,
            tail: None,
            focus: None,
        }
    }

    /// Number of registered widgets.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no widget is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The widget behind `id`, if it is still registered.
    #[must_use]
    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.entries.get(id).map(|e| &e.widget)
    }

    /// Mutable access to the widget behind `id`.
    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.entries.get_mut(id).map(|e| &mut e.widget)
    }

    /// Add a widget at the head of the registration list.
    pub fn register(&mut self, widget: Widget) -> WidgetId {
        let old_head = self.head;
        let id = self.entries.insert(Entry {
            widget,
            prev: None,
            next: old_head,
        });
        match old_head {
            Some(h) => {
                if let Some(e) = self.entries.get_mut(h) {
                    e.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        debug!(?id, "widget registered");
        id
    }

    /// Remove a widget, clearing focus if it held it. Unknown ids are
    /// ignored.
    pub fn unregister(&mut self, id: WidgetId) {
        let Some(entry) = self.entries.remove(id) else {
            return;
        };
        match entry.prev {
            Some(p) => {
                if let Some(e) = self.entries.get_mut(p) {
                    e.next = entry.next;
                }
            }
            None => self.head = entry.next,
        }
        match entry.next {
            Some(n) => {
                if let Some(e) = self.entries.get_mut(n) {
                    e.prev = entry.prev;
                }
            }
            None => self.tail = entry.prev,
        }
        if self.focus == Some(id) {
            self.focus = None;
        }
        debug!(?id, "widget unregistered");
    }

    /// Drop every widget and the focus handle.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.head = None;
        self.tail = None;
        self.focus = None;
    }

    // ─── Focus ───────────────────────────────────────────────────────────

    /// Replace the focus handle. `None` clears it; an unregistered id is
    /// ignored and the current focus kept.
    pub fn set_focus(&mut self, id: Option<WidgetId>) {
        match id {
            Some(id) if !self.entries.contains_key(id) => {}
            _ => self.focus = id,
        }
    }

    /// The focused widget, if any.
    #[inline]
    #[must_use]
    pub const fn focus(&self) -> Option<WidgetId> {
        self.focus
    }

    /// Move focus to the next focusable widget in insertion order,
    /// wrapping to the first. Returns the new focus.
    pub fn focus_next(&mut self) -> Option<WidgetId> {
        let order = self.insertion_order();
        self.step(&order)
    }

    /// Move focus to the previous focusable widget in insertion order,
    /// wrapping to the last. Returns the new focus.
    pub fn focus_prev(&mut self) -> Option<WidgetId> {
        let mut order = self.insertion_order();
        order.reverse();
        self.step(&order)
    }

    /// Advance focus along `order`, starting after the current focus (or
    /// from the start when nothing is focused).
    fn step(&mut self, order: &[WidgetId]) -> Option<WidgetId> {
        let start = self
            .focus
            .and_then(|f| order.iter().position(|&id| id == f))
            .map_or(0, |i| i + 1);

        let found = (0..order.len())
            .map(|k| order[(start + k) % order.len()])
            .find(|&id| self.entries.get(id).is_some_and(|e| e.widget.focusable));

        if found.is_some() {
            self.focus = found;
        }
        self.focus
    }

    // ─── Traversal ───────────────────────────────────────────────────────

    /// Widgets newest first.
    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &Widget)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let entry = self.entries.get(id)?;
            cursor = entry.next;
            Some((id, &entry.widget))
        })
    }

    /// Widget ids oldest first.
    fn insertion_order(&self) -> Vec<WidgetId> {
        let mut order = Vec::with_capacity(self.entries.len());
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            order.push(id);
            cursor = self.entries.get(id).and_then(|e| e.prev);
        }
        order
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn widget() -> Widget {
        Widget::new(0, 0, 1, 1)
    }

    // ── Registration ────────────────────────────────────────────────────

    #[test]
    fn register_links_at_head() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        let b = reg.register(widget());
        let c = reg.register(widget());
        let ids: Vec<_> = reg.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![c, b, a]);
        assert_eq!(reg.insertion_order(), vec![a, b, c]);
    }

    #[test]
    fn unregister_patches_list() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        let b = reg.register(widget());
        let c = reg.register(widget());
        reg.unregister(b);
        assert_eq!(reg.insertion_order(), vec![a, c]);
        reg.unregister(c);
        assert_eq!(reg.insertion_order(), vec![a]);
        reg.unregister(a);
        assert!(reg.is_empty());
        assert_eq!(reg.iter().count(), 0);
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        reg.unregister(a);
        reg.unregister(a);
        assert!(reg.is_empty());
    }

    // ── Focus handle ────────────────────────────────────────────────────

    #[test]
    fn unregistering_focused_clears_focus() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        let b = reg.register(widget());
        reg.set_focus(Some(a));
        reg.unregister(b);
        assert_eq!(reg.focus(), Some(a));
        reg.unregister(a);
        assert_eq!(reg.focus(), None);
    }

    #[test]
    fn set_focus_none_clears() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        reg.set_focus(Some(a));
        reg.set_focus(None);
        assert_eq!(reg.focus(), None);
    }

    #[test]
    fn set_focus_ignores_stale_id() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        let b = reg.register(widget());
        reg.set_focus(Some(a));
        reg.unregister(b);
        reg.set_focus(Some(b));
        assert_eq!(reg.focus(), Some(a));
    }

    // ── Traversal ───────────────────────────────────────────────────────

    #[test]
    fn focus_next_walks_insertion_order_and_wraps() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        let b = reg.register(widget());
        let c = reg.register(widget());
        assert_eq!(reg.focus_next(), Some(a));
        assert_eq!(reg.focus_next(), Some(b));
        assert_eq!(reg.focus_next(), Some(c));
        assert_eq!(reg.focus_next(), Some(a));
    }

    #[test]
    fn focus_prev_walks_backwards_and_wraps() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        let b = reg.register(widget());
        let c = reg.register(widget());
        assert_eq!(reg.focus_prev(), Some(c));
        assert_eq!(reg.focus_prev(), Some(b));
        assert_eq!(reg.focus_prev(), Some(a));
        assert_eq!(reg.focus_prev(), Some(c));
    }

    #[test]
    fn traversal_skips_unfocusable() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        let _b = reg.register(widget().focusable(false));
        let c = reg.register(widget());
        reg.set_focus(Some(a));
        assert_eq!(reg.focus_next(), Some(c));
        assert_eq!(reg.focus_prev(), Some(a));
    }

    #[test]
    fn traversal_noop_without_focusable_widgets() {
        let mut reg = FocusRegistry::new();
        assert_eq!(reg.focus_next(), None);
        let a = reg.register(widget().focusable(false));
        assert_eq!(reg.focus_next(), None);
        reg.set_focus(Some(a));
        assert_eq!(reg.focus_prev(), Some(a));
    }

    #[test]
    fn single_focusable_stays_put() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        reg.set_focus(Some(a));
        assert_eq!(reg.focus_next(), Some(a));
        assert_eq!(reg.focus_prev(), Some(a));
    }

    #[test]
    fn clear_drops_everything() {
        let mut reg = FocusRegistry::new();
        let a = reg.register(widget());
        reg.set_focus(Some(a));
        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.focus(), None);
        assert!(reg.get(a).is_none());
    }
}
