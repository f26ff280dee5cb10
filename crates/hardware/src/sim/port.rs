//! Clock and typed inter-component ports.
//!
//! A [`SimPort`] is the only channel between components. Pushing specifies a
//! delay of at least one cycle before the value becomes visible to the
//! consumer, which is what serializes the whole model: a component ticking
//! this cycle can never observe a value pushed this cycle.
//!
//! Ports are shared handles. Cloning a port yields another handle onto the
//! same queue, and [`SimPort::bind`] aliases two existing handles — the
//! bypass connection used by arbiters when input and output counts match.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Shared simulation clock handle.
///
/// All ports created from the same clock observe the same cycle counter.
/// The engine owns advancement; everyone else only reads.
#[derive(Clone)]
pub struct Clock {
    now: Rc<Cell<u64>>,
}

impl Clock {
    /// Creates a clock at cycle zero.
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
        }
    }

    /// Returns the current cycle.
    #[inline(always)]
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Advances the clock by one cycle.
    ///
    /// Normally driven by the engine; standalone benches driving a single
    /// component call it directly.
    pub fn advance(&self) {
        self.now.set(self.now.get() + 1);
    }

    /// Rewinds the clock to cycle zero.
    pub fn rewind(&self) {
        self.now.set(0);
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

struct Entry<T> {
    ready_at: u64,
    value: T,
}

/// A typed port: an ordered queue of values annotated with the cycle at
/// which each becomes visible.
///
/// Values are delivered in `ready_at` order; two values due the same cycle
/// keep push order. `front`/`pop`/`empty` only observe values whose cycle
/// has arrived, so a consumer never sees same-cycle pushes.
pub struct SimPort<T> {
    clock: Clock,
    queue: Rc<RefCell<VecDeque<Entry<T>>>>,
}

impl<T> Clone for SimPort<T> {
    /// Clones the handle; both handles address the same queue.
    fn clone(&self) -> Self {
        Self {
            clock: self.clock.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<T> SimPort<T> {
    /// Creates an empty port on the given clock.
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: clock.clone(),
            queue: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Pushes a value that becomes visible `delay` cycles from now.
    ///
    /// # Panics
    ///
    /// Panics if `delay` is zero; a same-cycle handoff would break the
    /// engine's tick-order independence.
    pub fn push(&self, value: T, delay: u64) {
        assert!(delay >= 1, "port delay must be at least 1 cycle");
        let ready_at = self.clock.now() + delay;
        let mut queue = self.queue.borrow_mut();
        // Insert in delivery order, keeping push order for equal cycles.
        let pos = queue
            .iter()
            .rposition(|e| e.ready_at <= ready_at)
            .map(|p| p + 1)
            .unwrap_or(0);
        queue.insert(pos, Entry { ready_at, value });
    }

    /// Returns whether no value is visible this cycle.
    pub fn empty(&self) -> bool {
        let queue = self.queue.borrow();
        match queue.front() {
            Some(entry) => entry.ready_at > self.clock.now(),
            None => true,
        }
    }

    /// Removes and returns the oldest visible value, if any.
    pub fn pop(&self) -> Option<T> {
        if self.empty() {
            return None;
        }
        self.queue.borrow_mut().pop_front().map(|e| e.value)
    }

    /// Total number of queued values, including those not yet visible.
    ///
    /// Used for capacity checks: a bounded structure counts everything in
    /// flight toward it, not just what is already observable.
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns whether the queue holds no values at all, visible or not.
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Aliases this handle onto `other`'s queue.
    ///
    /// After binding, pushing to either handle is pushing to the same
    /// queue. Must happen at wiring time, before any traffic: values
    /// already queued behind this handle are dropped.
    pub fn bind(&mut self, other: &SimPort<T>) {
        self.queue = other.queue.clone();
    }

    /// Empties the queue (reset).
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}

impl<T: Clone> SimPort<T> {
    /// Peeks at the oldest visible value without removing it.
    pub fn front(&self) -> Option<T> {
        if self.empty() {
            return None;
        }
        self.queue.borrow().front().map(|e| e.value.clone())
    }
}
