// SPDX-License-Identifier: MIT
//
// TimerTable — fixed-capacity one-shot timers.
//
// A timer is an id, an absolute deadline in clock milliseconds, and a
// callback. Callbacks live in a slot array whose length never changes
// after construction: scheduling claims the lowest free slot or fails
// with `TimerTableFull`. Ids count up from 1 and skip 0 when they wrap.
//
// Two min-heaps sit beside the slots. `free` hands out the lowest empty
// slot index; `queue` orders pending timers by (deadline, id) so firing
// and "next deadline" only look at the front. Cancellation removes the
// queue entry immediately, so the queue holds exactly one entry per
// occupied slot.
//
// The table never drives itself. The owner calls `fire_due` from its
// loop; due timers are taken out of their slots first and their
// callbacks run afterwards in deadline order, so a callback never
// observes its own slot as occupied.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use strata_term::clock::Clock;
use tracing::{debug, trace, warn};

use crate::config::DEFAULT_TIMER_SLOTS;
use crate::error::{Error, Result};

/// Handle to a scheduled timer. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u32);

impl TimerId {
    /// The numeric id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

type Callback = Box<dyn FnOnce()>;

struct Slot {
    id: TimerId,
    callback: Callback,
}

/// Queue entry: deadline, id, slot index. Ordered by deadline then id.
type Pending = Reverse<(u64, TimerId, usize)>;

// ─── TimerTable ──────────────────────────────────────────────────────────────

/// Fixed-capacity table of one-shot timers driven by a [`Clock`].
pub struct TimerTable<C: Clock> {
    slots: Box<[Option<Slot>]>,
    free: BinaryHeap<Reverse<usize>>,
    queue: BinaryHeap<Pending>,
    next_id: u32,
    clock: C,
}

impl<C: Clock> fmt::Debug for TimerTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerTable")
            .field("capacity", &self.slots.len())
            .field("active", &self.queue.len())
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl<C: Clock> TimerTable<C> {
    /// A table with the default 64 slots.
    #[must_use]
    pub fn new(clock: C) -> Self {
        Self::with_capacity(clock, DEFAULT_TIMER_SLOTS)
    }

    /// A table with exactly `capacity` slots.
    #[must_use]
    pub fn with_capacity(clock: C, capacity: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(capacity).collect(),
            free: (0..capacity).map(Reverse).collect(),
            queue: BinaryHeap::with_capacity(capacity),
            next_id: 1,
            clock,
        }
    }

    /// Number of slots, fixed at construction.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of scheduled, not yet fired or cancelled, timers.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.queue.len()
    }

    /// True while `id` is pending and has not fired or been cancelled.
    #[must_use]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.queue.iter().any(|Reverse((_, tid, _))| *tid == id)
    }

    /// The clock deadlines are measured against.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Schedule `callback` to run once `delay_ms` from now.
    ///
    /// # Errors
    ///
    /// [`Error::TimerTableFull`] when every slot is taken. Nothing is
    /// scheduled and the id counter does not advance.
    pub fn schedule(
        &mut self,
        delay_ms: u64,
        callback: impl FnOnce() + 'static,
    ) -> Result<TimerId> {
        let Some(Reverse(index)) = self.free.pop() else {
            let capacity = self.slots.len();
            warn!(capacity, "timer table full");
            return Err(Error::TimerTableFull { capacity });
        };

        let id = TimerId(self.next_id);
        self.next_id = match self.next_id.wrapping_add(1) {
            0 => 1,
            n => n,
        };

        let deadline = self.clock.now_ms().saturating_add(delay_ms);
        self.slots[index] = Some(Slot {
            id,
            callback: Box::new(callback),
        });
        self.queue.push(Reverse((deadline, id, index)));
        debug!(id = id.raw(), deadline, slot = index, "timer scheduled");
        Ok(id)
    }

    /// Cancel a pending timer. Unknown or already fired ids are ignored.
    pub fn cancel(&mut self, id: TimerId) {
        let Some(index) = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|t| t.id == id))
        else {
            return;
        };
        self.slots[index] = None;
        self.free.push(Reverse(index));
        self.queue.retain(|Reverse((_, tid, _))| *tid != id);
        debug!(id = id.raw(), "timer cancelled");
    }

    /// Drop every pending timer without running it.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.queue.clear();
        self.free = (0..self.slots.len()).map(Reverse).collect();
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse((deadline, _, _))| *deadline)
    }

    /// Milliseconds until the earliest pending deadline (0 if overdue).
    #[must_use]
    pub fn time_until_next(&self) -> Option<u64> {
        self.next_deadline()
            .map(|d| d.saturating_sub(self.clock.now_ms()))
    }

    /// Run every timer whose deadline has passed. Returns how many fired.
    pub fn fire_due(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut due: Vec<Callback> = Vec::new();

        while let Some(&Reverse((deadline, _, index))) = self.queue.peek() {
            if deadline > now {
                break;
            }
            self.queue.pop();
            if let Some(slot) = self.slots.get_mut(index).and_then(Option::take) {
                due.push(slot.callback);
            }
            self.free.push(Reverse(index));
        }

        let fired = due.len();
        if fired > 0 {
            trace!(fired, now, "firing timers");
        }
        for callback in due {
            callback();
        }
        fired
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
