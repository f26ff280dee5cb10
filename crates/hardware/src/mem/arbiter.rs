//! Generic Mux/Switch arbitration primitives.
//!
//! This module implements the many-to-few primitives that stitch pipeline
//! components together. It provides:
//! 1. **Policies:** Fixed-priority and round-robin input selection.
//! 2. **Mux:** Request-only N-to-M arbitration.
//! 3. **Switch:** Bidirectional arbitration that encodes the granted input
//!    index into the low tag bits so responses find their way back.
//!
//! Both collapse to identity port bindings when N equals M (bypass mode).

use serde::Deserialize;

use crate::common::constants::MAX_ARBITER_PORTS;
use crate::common::SimError;
use crate::mem::protocol::Tagged;
use crate::sim::{Clock, SimComponent, SimPort};

/// Input selection policy for Mux/Switch instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ArbiterPolicy {
    /// Always scan inputs in fixed order; lower indices win.
    Priority,
    /// Advance a per-output cursor past the last granted input.
    #[default]
    RoundRobin,
}

fn check_geometry(num_inputs: usize, num_outputs: usize, delay: u64) -> usize {
    assert!(delay >= 1, "arbiter delay must be at least 1");
    assert!(num_outputs >= 1 && num_inputs >= num_outputs);
    assert!(num_inputs <= MAX_ARBITER_PORTS && num_outputs <= MAX_ARBITER_PORTS);
    assert!(
        num_inputs % num_outputs == 0,
        "inputs ({}) must be a multiple of outputs ({})",
        num_inputs,
        num_outputs
    );
    let ratio = num_inputs / num_outputs;
    assert!(ratio.is_power_of_two(), "input grouping must be a power of two");
    ratio
}

/// Request-only arbiter from N inputs to M outputs.
///
/// Inputs are partitioned into M contiguous groups of R = N/M; each output
/// grants at most one input of its group per cycle. With N = M the mux is a
/// pure bypass: inputs are bound to outputs and `tick` is a no-op.
pub struct Mux<T> {
    name: String,
    /// Input ports, popped on grant.
    pub inputs: Vec<SimPort<T>>,
    /// Output ports, one grant pushed per cycle at most.
    pub outputs: Vec<SimPort<T>>,
    policy: ArbiterPolicy,
    delay: u64,
    cursors: Vec<usize>,
    ratio: usize,
}

impl<T> Mux<T> {
    /// Creates a mux with the given geometry.
    ///
    /// # Panics
    ///
    /// Panics if `delay` is zero, N < M, N is not a multiple of M, or the
    /// grouping R = N/M is not a power of two.
    pub fn new(
        clock: &Clock,
        name: &str,
        policy: ArbiterPolicy,
        num_inputs: usize,
        num_outputs: usize,
        delay: u64,
    ) -> Self {
        let ratio = check_geometry(num_inputs, num_outputs, delay);
        let mut inputs: Vec<_> = (0..num_inputs).map(|_| SimPort::new(clock)).collect();
        let outputs: Vec<_> = (0..num_outputs).map(|_| SimPort::new(clock)).collect();

        // bypass mode
        if num_inputs == num_outputs {
            for (input, output) in inputs.iter_mut().zip(outputs.iter()) {
                input.bind(output);
            }
        }

        Self {
            name: name.to_string(),
            inputs,
            outputs,
            policy,
            delay,
            cursors: vec![0; num_outputs],
            ratio,
        }
    }

    fn update_cursor(&mut self, output: usize, grant: usize) {
        if self.policy == ArbiterPolicy::RoundRobin {
            self.cursors[output] = grant + 1;
        }
    }
}

impl<T> SimComponent for Mux<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        for cursor in self.cursors.iter_mut() {
            *cursor = 0;
        }
        for port in self.inputs.iter().chain(self.outputs.iter()) {
            port.clear();
        }
    }

    fn tick(&mut self) -> Result<(), SimError> {
        let r = self.ratio;

        // skip bypass mode
        if self.inputs.len() == self.outputs.len() {
            return Ok(());
        }

        for o in 0..self.outputs.len() {
            for k in 0..r {
                let i = (self.cursors[o] + k) & (r - 1);
                let j = o * r + i;
                if let Some(value) = self.inputs[j].pop() {
                    self.outputs[o].push(value, self.delay);
                    self.update_cursor(o, i);
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Bidirectional arbiter carrying responses back to the requesting input.
///
/// The request path behaves like [`Mux`], additionally shifting the granted
/// input's sub-index into the low `log2(R)` tag bits. The response path
/// decodes and strips those bits to route each response to input
/// `o * R + i`, restoring the downstream consumer's view of the tag.
/// Response delivery is always one cycle; request delivery uses the
/// configured delay.
pub struct Switch<Req, Rsp> {
    name: String,
    /// Request inputs, popped on grant.
    pub req_in: Vec<SimPort<Req>>,
    /// Response outputs back toward each input.
    pub rsp_in: Vec<SimPort<Rsp>>,
    /// Arbitrated request outputs.
    pub req_out: Vec<SimPort<Req>>,
    /// Inbound responses from downstream.
    pub rsp_out: Vec<SimPort<Rsp>>,
    policy: ArbiterPolicy,
    delay: u64,
    cursors: Vec<usize>,
    lg_ratio: u32,
}

impl<Req: Tagged, Rsp: Tagged> Switch<Req, Rsp> {
    /// Creates a switch with the given geometry.
    ///
    /// # Panics
    ///
    /// Same geometry requirements as [`Mux::new`].
    pub fn new(
        clock: &Clock,
        name: &str,
        policy: ArbiterPolicy,
        num_inputs: usize,
        num_outputs: usize,
        delay: u64,
    ) -> Self {
        let ratio = check_geometry(num_inputs, num_outputs, delay);
        let mut req_in: Vec<_> = (0..num_inputs).map(|_| SimPort::new(clock)).collect();
        let rsp_in: Vec<_> = (0..num_inputs).map(|_| SimPort::new(clock)).collect();
        let req_out: Vec<_> = (0..num_outputs).map(|_| SimPort::new(clock)).collect();
        let mut rsp_out: Vec<_> = (0..num_outputs).map(|_| SimPort::new(clock)).collect();

        // bypass mode
        if num_inputs == num_outputs {
            for (input, output) in req_in.iter_mut().zip(req_out.iter()) {
                input.bind(output);
            }
            for (output, input) in rsp_out.iter_mut().zip(rsp_in.iter()) {
                output.bind(input);
            }
        }

        Self {
            name: name.to_string(),
            req_in,
            rsp_in,
            req_out,
            rsp_out,
            policy,
            delay,
            cursors: vec![0; num_outputs],
            lg_ratio: ratio.trailing_zeros(),
        }
    }

    fn update_cursor(&mut self, output: usize, grant: usize) {
        if self.policy == ArbiterPolicy::RoundRobin {
            self.cursors[output] = grant + 1;
        }
    }
}

impl<Req: Tagged, Rsp: Tagged> SimComponent for Switch<Req, Rsp> {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        for cursor in self.cursors.iter_mut() {
            *cursor = 0;
        }
        for port in self.req_in.iter().chain(self.req_out.iter()) {
            port.clear();
        }
        for port in self.rsp_in.iter().chain(self.rsp_out.iter()) {
            port.clear();
        }
    }

    fn tick(&mut self) -> Result<(), SimError> {
        let r = 1usize << self.lg_ratio;

        // skip bypass mode
        if self.req_in.len() == self.req_out.len() {
            return Ok(());
        }

        for o in 0..self.req_out.len() {
            // process incoming responses
            if let Some(mut rsp) = self.rsp_out[o].pop() {
                let mut i = 0;
                if self.lg_ratio != 0 {
                    i = (rsp.tag() & (r as u64 - 1)) as usize;
                    rsp.set_tag(rsp.tag() >> self.lg_ratio);
                }
                let j = o * r + i;
                self.rsp_in[j].push(rsp, 1);
            }

            // process incoming requests
            for k in 0..r {
                let i = (self.cursors[o] + k) & (r - 1);
                let j = o * r + i;
                if let Some(mut req) = self.req_in[j].pop() {
                    if self.lg_ratio != 0 {
                        req.set_tag((req.tag() << self.lg_ratio) | i as u64);
                    }
                    self.req_out[o].push(req, self.delay);
                    self.update_cursor(o, i);
                    break;
                }
            }
        }
        Ok(())
    }
}
