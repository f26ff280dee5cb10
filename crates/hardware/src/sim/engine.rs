//! Cycle engine and component trait.
//!
//! One global clock; every registered component is ticked exactly once per
//! cycle in registration order. Producers whose consumers expect same-cycle
//! visibility must either register first or push with a delay of at least
//! one cycle — every port in this crate does the latter, so registration
//! order never changes observable behavior here.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::SimError;
use crate::sim::port::Clock;

/// Interface every modeled component implements.
pub trait SimComponent {
    /// Component name for error context and trace lines.
    fn name(&self) -> &str;

    /// Re-initializes all internal state and port queues.
    fn reset(&mut self);

    /// Advances the component by one cycle.
    ///
    /// Inputs are observed as they stood at cycle start; pushes made here
    /// become visible next cycle at the earliest.
    fn tick(&mut self) -> Result<(), SimError>;
}

/// Shared handle to a registered component.
pub type ComponentRef = Rc<RefCell<dyn SimComponent>>;

/// The cycle engine: a clock plus an ordered component registry.
pub struct SimEngine {
    clock: Clock,
    components: Vec<ComponentRef>,
}

impl SimEngine {
    /// Creates an engine with a fresh clock and no components.
    pub fn new() -> Self {
        Self {
            clock: Clock::new(),
            components: Vec::new(),
        }
    }

    /// Returns a handle to the engine's clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Registers a component; tick order is registration order.
    pub fn register(&mut self, component: ComponentRef) {
        self.components.push(component);
    }

    /// Returns the current cycle.
    pub fn cycle(&self) -> u64 {
        self.clock.now()
    }

    /// Resets every component and rewinds the clock to cycle zero.
    pub fn reset(&mut self) {
        self.clock.rewind();
        for component in &self.components {
            component.borrow_mut().reset();
        }
    }

    /// Advances global time one cycle and ticks every component.
    pub fn step(&mut self) -> Result<(), SimError> {
        self.clock.advance();
        for component in &self.components {
            component.borrow_mut().tick()?;
        }
        Ok(())
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}
