// SPDX-License-Identifier: MIT
//
// WindowStack — z-ordered screens.
//
// Screens live in a slotmap arena and are threaded into a doubly-linked
// list through `prev`/`next` keys. Head is the topmost screen, tail the
// bottom. Handles are generational keys: once a screen is destroyed its
// `ScreenId` stops resolving, so double destroy and late calls with a
// stale id fall through as no-ops instead of touching a reused slot.
//
// Besides ordering the stack tracks two pieces of advisory state: the
// active screen (a non-owning handle, cleared when that screen dies) and
// a save/restore nesting depth.
//
// List invariants, checked by the tests below:
//   - walking head→tail via `next` visits every node exactly once,
//   - walking tail→head via `prev` visits the same nodes reversed,
//   - head.prev and tail.next are None.

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, warn};

use crate::error::Result;
use crate::screen::Screen;

new_key_type! {
    /// Handle to a screen in a [`WindowStack`].
    pub struct ScreenId;
}

#[derive(Debug)]
struct Node {
    screen: Screen,
    /// Neighbour above (towards the head).
    prev: Option<ScreenId>,
    /// Neighbour below (towards the tail).
    next: Option<ScreenId>,
}

// ─── WindowStack ─────────────────────────────────────────────────────────────

/// Ordered collection of screens. Head is topmost.
#[derive(Debug)]
pub struct WindowStack {
    nodes: SlotMap<ScreenId, Node>,
    head: Option<ScreenId>,
    tail: Option<ScreenId>,
    active: Option<ScreenId>,
    depth: u32,
}

impl Default for WindowStack {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowStack {
    /// An empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
            active: None,
            depth: 0,
        }
    }

    /// Number of live screens.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no screen exists.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` still names a live screen.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: ScreenId) -> bool {
        self.nodes.contains_key(id)
    }

    /// The screen behind `id`, if it is still alive.
    #[must_use]
    pub fn get(&self, id: ScreenId) -> Option<&Screen> {
        self.nodes.get(id).map(|n| &n.screen)
    }

    /// Mutable access for writing cell content. Geometry and visibility
    /// go through the stack methods.
    pub fn get_mut(&mut self, id: ScreenId) -> Option<&mut Screen> {
        self.nodes.get_mut(id).map(|n| &mut n.screen)
    }

    /// Topmost screen.
    #[inline]
    #[must_use]
    pub const fn top(&self) -> Option<ScreenId> {
        self.head
    }

    /// Bottom screen.
    #[inline]
    #[must_use]
    pub const fn bottom(&self) -> Option<ScreenId> {
        self.tail
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Create a visible screen with an empty grid and place it on top.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`](crate::Error::InvalidGeometry) if the
    /// size is not positive or too large. The stack is unchanged.
    pub fn create(&mut self, x: i32, y: i32, w: i32, h: i32) -> Result<ScreenId> {
        let screen = Screen::new(x, y, w, h).inspect_err(|_| {
            warn!(w, h, "rejected screen geometry");
        })?;
        let id = self.nodes.insert(Node {
            screen,
            prev: None,
            next: None,
        });
        self.link_head(id);
        debug!(?id, x, y, w, h, "screen created");
        Ok(id)
    }

    /// Unlink and drop a screen. Clears the active handle if it pointed
    /// here. Stale ids are ignored.
    pub fn destroy(&mut self, id: ScreenId) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.unlink(id);
        self.nodes.remove(id);
        if self.active == Some(id) {
            self.active = None;
        }
        debug!(?id, "screen destroyed");
    }

    /// Drop every screen and reset the active handle and nesting depth.
    pub fn clear_all(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
        self.active = None;
        self.depth = 0;
    }

    // ─── Ordering ────────────────────────────────────────────────────────

    /// Swap with the screen directly above. No-op at the top.
    pub fn raise(&mut self, id: ScreenId) {
        let Some(above) = self.nodes.get(id).and_then(|n| n.prev) else {
            return;
        };
        self.unlink(id);
        self.link_before(id, above);
        debug!(?id, "screen raised");
    }

    /// Swap with the screen directly below. No-op at the bottom.
    pub fn lower(&mut self, id: ScreenId) {
        let Some(below) = self.nodes.get(id).and_then(|n| n.next) else {
            return;
        };
        self.unlink(id);
        self.link_after(id, below);
        debug!(?id, "screen lowered");
    }

    /// Move to the top of the stack.
    pub fn to_top(&mut self, id: ScreenId) {
        if !self.nodes.contains_key(id) || self.head == Some(id) {
            return;
        }
        self.unlink(id);
        self.link_head(id);
        debug!(?id, "screen moved to top");
    }

    /// Move to the bottom of the stack.
    pub fn to_bottom(&mut self, id: ScreenId) {
        if !self.nodes.contains_key(id) || self.tail == Some(id) {
            return;
        }
        self.unlink(id);
        self.link_tail(id);
        debug!(?id, "screen moved to bottom");
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Reposition. Stack order is unchanged.
    pub fn move_to(&mut self, id: ScreenId, x: i32, y: i32) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.screen.set_position(x, y);
        }
    }

    /// Reallocate the grid for a new size. Stack order is unchanged.
    ///
    /// A stale id is a no-op and returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`](crate::Error::InvalidGeometry) for
    /// non-positive or oversized dimensions; the screen keeps its old
    /// size and content.
    pub fn resize(&mut self, id: ScreenId, w: i32, h: i32) -> Result<()> {
        let Some(node) = self.nodes.get_mut(id) else {
            return Ok(());
        };
        node.screen.resize(w, h).inspect_err(|_| {
            warn!(?id, w, h, "rejected screen resize");
        })
    }

    // ─── Visibility & content ────────────────────────────────────────────

    /// Makes `id` visible again. Stale ids are ignored.
    pub fn show(&mut self, id: ScreenId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.screen.set_visible(true);
        }
    }

    /// Hides `id` from composition and hit testing. Stale ids are ignored.
    pub fn hide(&mut self, id: ScreenId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.screen.set_visible(false);
        }
    }

    /// Empty every cell. The screen stays linked with its geometry.
    pub fn clear(&mut self, id: ScreenId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.screen.clear();
        }
    }

    // ─── Active screen ───────────────────────────────────────────────────

    /// Mark `id` as the active screen. Stale ids are ignored.
    pub fn set_active(&mut self, id: ScreenId) {
        if self.nodes.contains_key(id) {
            self.active = Some(id);
        }
    }

    /// Drops the active-screen reference.
    #[inline]
    pub const fn clear_active(&mut self) {
        self.active = None;
    }

    /// The active screen, if one is set and still alive.
    #[inline]
    #[must_use]
    pub const fn active(&self) -> Option<ScreenId> {
        self.active
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Topmost visible screen containing `(x, y)`.
    #[must_use]
    pub fn hit_test(&self, x: i32, y: i32) -> Option<ScreenId> {
        self.iter()
            .find(|(_, s)| s.is_visible() && s.contains(x, y))
            .map(|(id, _)| id)
    }

    /// Visit every screen top to bottom, hidden ones included.
    pub fn for_each(&self, mut f: impl FnMut(ScreenId, &Screen)) {
        for (id, screen) in self.iter() {
            f(id, screen);
        }
    }

    /// Screens top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = (ScreenId, &Screen)> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = self.nodes.get(id)?;
            cursor = node.next;
            Some((id, &node.screen))
        })
    }

    /// Screens bottom to top (paint order).
    pub fn iter_bottom_up(&self) -> impl Iterator<Item = (ScreenId, &Screen)> + '_ {
        let mut cursor = self.tail;
        std::iter::from_fn(move || {
            let id = cursor?;
            let node = self.nodes.get(id)?;
            cursor = node.prev;
            Some((id, &node.screen))
        })
    }

    // ─── Save / restore ──────────────────────────────────────────────────

    /// Enter a nested context.
    pub const fn save_context(&mut self) {
        self.depth = self.depth.saturating_add(1);
    }

    /// Leave a nested context. No-op at depth zero.
    pub const fn restore_context(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    // ─── Linking ─────────────────────────────────────────────────────────

    /// Detach `id` from its neighbours, patching head/tail.
    fn unlink(&mut self, id: ScreenId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(p) => self.set_next(p, next),
            None => self.head = next,
        }
        match next {
            Some(n) => self.set_prev(n, prev),
            None => self.tail = prev,
        }
    }

    fn link_head(&mut self, id: ScreenId) {
        match self.head {
            Some(old) => self.link_before(id, old),
            None => {
                self.head = Some(id);
                self.tail = Some(id);
            }
        }
    }

    fn link_tail(&mut self, id: ScreenId) {
        match self.tail {
            Some(old) => self.link_after(id, old),
            None => {
                self.head = Some(id);
                self.tail = Some(id);
            }
        }
    }

    /// Insert detached `id` directly above `anchor`.
    fn link_before(&mut self, id: ScreenId, anchor: ScreenId) {
        let above = self.nodes.get(anchor).and_then(|n| n.prev);
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = above;
            node.next = Some(anchor);
        }
        self.set_prev(anchor, Some(id));
        match above {
            Some(a) => self.set_next(a, Some(id)),
            None => self.head = Some(id),
        }
    }

    /// Insert detached `id` directly below `anchor`.
    fn link_after(&mut self, id: ScreenId, anchor: ScreenId) {
        let below = self.nodes.get(anchor).and_then(|n| n.next);
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = Some(anchor);
            node.next = below;
        }
        self.set_next(anchor, Some(id));
        match below {
            Some(b) => self.set_prev(b, Some(id)),
            None => self.tail = Some(id),
        }
    }

    fn set_prev(&mut self, id: ScreenId, prev: Option<ScreenId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, id: ScreenId, next: Option<ScreenId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.next = next;
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;

    fn order(stack: &WindowStack) -> Vec<ScreenId> {
        stack.iter().map(|(id, _)| id).collect()
    }

    /// Forward walk equals reverse walk reversed, and both cover every node.
    fn assert_links(stack: &WindowStack) {
        let forward = order(stack);
        let mut backward: Vec<_> = stack.iter_bottom_up().map(|(id, _)| id).collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), stack.len());
        assert_eq!(stack.top(), forward.first().copied());
        assert_eq!(stack.bottom(), forward.last().copied());
    }

    /// Stack of three screens, returned top to bottom.
    fn three() -> (WindowStack, ScreenId, ScreenId, ScreenId) {
        let mut stack = WindowStack::new();
        let c = stack.create(0, 0, 1, 1).unwrap();
        let b = stack.create(0, 0, 1, 1).unwrap();
        let a = stack.create(0, 0, 1, 1).unwrap();
        (stack, a, b, c)
    }

    // ── Create / destroy ────────────────────────────────────────────────

    #[test]
    fn create_links_at_top() {
        let (stack, a, b, c) = three();
        assert_eq!(order(&stack), vec![a, b, c]);
        assert_links(&stack);
    }

    #[test]
    fn create_rejects_bad_geometry() {
        let mut stack = WindowStack::new();
        assert!(matches!(
            stack.create(0, 0, 0, 10),
            Err(Error::InvalidGeometry { w: 0, h: 10 })
        ));
        assert!(stack.create(0, 0, 10, -2).is_err());
        assert!(stack.is_empty());
        assert_eq!(stack.top(), None);
    }

    #[test]
    fn destroy_middle_head_tail() {
        let (mut stack, a, b, c) = three();
        stack.destroy(b);
        assert_eq!(order(&stack), vec![a, c]);
        assert_links(&stack);
        stack.destroy(a);
        assert_eq!(order(&stack), vec![c]);
        assert_links(&stack);
        stack.destroy(c);
        assert!(stack.is_empty());
        assert_links(&stack);
    }

    #[test]
    fn double_destroy_is_noop() {
        let (mut stack, a, b, c) = three();
        stack.destroy(b);
        stack.destroy(b);
        assert_eq!(order(&stack), vec![a, c]);
        assert!(!stack.contains(b));
        assert!(stack.get(b).is_none());
    }

    #[test]
    fn stale_id_does_not_hit_reused_slot() {
        let mut stack = WindowStack::new();
        let old = stack.create(0, 0, 1, 1).unwrap();
        stack.destroy(old);
        let new = stack.create(0, 0, 1, 1).unwrap();
        stack.destroy(old);
        assert!(stack.contains(new));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn clear_all_resets_everything() {
        let (mut stack, a, _, _) = three();
        stack.set_active(a);
        stack.save_context();
        stack.clear_all();
        assert!(stack.is_empty());
        assert_eq!(stack.active(), None);
        assert_eq!(stack.depth(), 0);
        assert_links(&stack);
    }

    // ── Ordering ────────────────────────────────────────────────────────

    #[test]
    fn raise_swaps_with_neighbour() {
        let (mut stack, a, b, c) = three();
        stack.raise(c);
        assert_eq!(order(&stack), vec![a, c, b]);
        assert_links(&stack);
        stack.raise(c);
        assert_eq!(order(&stack), vec![c, a, b]);
        assert_links(&stack);
    }

    #[test]
    fn raise_at_top_is_noop() {
        let (mut stack, a, b, c) = three();
        stack.raise(a);
        assert_eq!(order(&stack), vec![a, b, c]);
    }

    #[test]
    fn lower_swaps_with_neighbour() {
        let (mut stack, a, b, c) = three();
        stack.lower(a);
        assert_eq!(order(&stack), vec![b, a, c]);
        assert_links(&stack);
        stack.lower(a);
        assert_eq!(order(&stack), vec![b, c, a]);
        assert_links(&stack);
    }

    #[test]
    fn lower_at_bottom_is_noop() {
        let (mut stack, a, b, c) = three();
        stack.lower(c);
        assert_eq!(order(&stack), vec![a, b, c]);
    }

    #[test]
    fn to_top_and_to_bottom() {
        let (mut stack, a, b, c) = three();
        stack.to_top(c);
        assert_eq!(order(&stack), vec![c, a, b]);
        assert_links(&stack);
        stack.to_bottom(c);
        assert_eq!(order(&stack), vec![a, b, c]);
        assert_links(&stack);
        stack.to_bottom(a);
        assert_eq!(order(&stack), vec![b, c, a]);
        assert_links(&stack);
    }

    #[test]
    fn two_node_swaps() {
        let mut stack = WindowStack::new();
        let b = stack.create(0, 0, 1, 1).unwrap();
        let a = stack.create(0, 0, 1, 1).unwrap();
        stack.lower(a);
        assert_eq!(order(&stack), vec![b, a]);
        assert_links(&stack);
        stack.raise(a);
        assert_eq!(order(&stack), vec![a, b]);
        assert_links(&stack);
    }

    #[test]
    fn mixed_operations_keep_links_consistent() {
        let mut stack = WindowStack::new();
        let ids: Vec<_> = (0..6).map(|_| stack.create(0, 0, 1, 1).unwrap()).collect();
        stack.raise(ids[0]);
        stack.to_top(ids[2]);
        stack.destroy(ids[4]);
        stack.lower(ids[5]);
        stack.to_bottom(ids[1]);
        stack.destroy(ids[2]);
        assert_links(&stack);
        assert_eq!(stack.len(), 4);
    }

    // ── Geometry ────────────────────────────────────────────────────────

    #[test]
    fn move_to_keeps_order() {
        let (mut stack, a, b, c) = three();
        stack.move_to(b, 7, 9);
        let s = stack.get(b).unwrap();
        assert_eq!((s.x(), s.y()), (7, 9));
        assert_eq!(order(&stack), vec![a, b, c]);
    }

    #[test]
    fn resize_reallocates_grid() {
        let mut stack = WindowStack::new();
        let id = stack.create(0, 0, 4, 4).unwrap();
        stack.resize(id, 8, 2).unwrap();
        let s = stack.get(id).unwrap();
        assert_eq!((s.width(), s.height()), (8, 2));
        assert_eq!(s.cells().len(), 16);
    }

    #[test]
    fn resize_rejects_non_positive() {
        let mut stack = WindowStack::new();
        let id = stack.create(0, 0, 4, 4).unwrap();
        assert!(stack.resize(id, 0, 4).is_err());
        assert_eq!(stack.get(id).unwrap().cells().len(), 16);
    }

    #[test]
    fn resize_stale_id_is_ok() {
        let mut stack = WindowStack::new();
        let id = stack.create(0, 0, 4, 4).unwrap();
        stack.destroy(id);
        assert!(stack.resize(id, 2, 2).is_ok());
    }

    // ── Active ──────────────────────────────────────────────────────────

    #[test]
    fn destroying_active_clears_it() {
        let (mut stack, a, b, _) = three();
        stack.set_active(b);
        stack.destroy(a);
        assert_eq!(stack.active(), Some(b));
        stack.destroy(b);
        assert_eq!(stack.active(), None);
    }

    #[test]
    fn set_active_ignores_stale_id() {
        let (mut stack, a, b, _) = three();
        stack.set_active(a);
        stack.destroy(b);
        stack.set_active(b);
        assert_eq!(stack.active(), Some(a));
        stack.clear_active();
        assert_eq!(stack.active(), None);
    }

    // ── Hit testing ─────────────────────────────────────────────────────

    #[test]
    fn hit_test_prefers_topmost() {
        let mut stack = WindowStack::new();
        let b = stack.create(0, 0, 20, 20).unwrap();
        let a = stack.create(5, 5, 10, 10).unwrap();
        assert_eq!(stack.hit_test(7, 7), Some(a));
        assert_eq!(stack.hit_test(1, 1), Some(b));
        assert_eq!(stack.hit_test(30, 30), None);
    }

    #[test]
    fn hidden_screens_do_not_occlude() {
        let mut stack = WindowStack::new();
        let b = stack.create(0, 0, 20, 20).unwrap();
        let a = stack.create(5, 5, 10, 10).unwrap();
        stack.hide(a);
        assert_eq!(stack.hit_test(7, 7), Some(b));
        stack.hide(b);
        assert_eq!(stack.hit_test(7, 7), None);
        stack.show(a);
        assert_eq!(stack.hit_test(7, 7), Some(a));
    }

    // ── Traversal ───────────────────────────────────────────────────────

    #[test]
    fn for_each_visits_hidden_too() {
        let (mut stack, a, b, c) = three();
        stack.hide(b);
        let mut seen = Vec::new();
        stack.for_each(|id, _| seen.push(id));
        assert_eq!(seen, vec![a, b, c]);
    }

    // ── Clear vs destroy ────────────────────────────────────────────────

    #[test]
    fn clear_keeps_screen_linked() {
        let (mut stack, a, b, c) = three();
        stack.get_mut(b).unwrap().put_str(0, 0, "x");
        stack.clear(b);
        let s = stack.get(b).unwrap();
        assert!(s.cell(0, 0).unwrap().is_empty());
        assert_eq!(order(&stack), vec![a, b, c]);
    }

    // ── Save / restore ──────────────────────────────────────────────────

    #[test]
    fn context_depth_never_negative() {
        let mut stack = WindowStack::new();
        stack.restore_context();
        assert_eq!(stack.depth(), 0);
        stack.save_context();
        stack.save_context();
        assert_eq!(stack.depth(), 2);
        stack.restore_context();
        stack.restore_context();
        stack.restore_context();
        assert_eq!(stack.depth(), 0);
    }
}
