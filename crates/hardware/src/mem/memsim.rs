//! Global memory endpoint.
//!
//! A fixed-latency stand-in for the cache hierarchy and DRAM, with one
//! request/response channel pair per connected switch. Every non-write
//! request yields exactly one response with the same tag after the
//! configured latency, including out-of-range accesses — dropping a
//! response would strand a pending-table slot and deadlock any later
//! fence, so range violations are counted and reported instead.

use crate::common::{AddrSpace, SimError};
use crate::mem::protocol::{MemReq, MemRsp};
use crate::sim::{Clock, SimComponent, SimPort};

/// One request/response channel pair into the memory.
pub struct MemChannel {
    /// Scalar requests in.
    pub req: SimPort<MemReq>,
    /// Scalar responses out.
    pub rsp: SimPort<MemRsp>,
}

/// Fixed-latency global memory model.
pub struct MainMemory {
    name: String,
    /// Channels, one per connected switch output.
    pub channels: Vec<MemChannel>,
    latency: u64,
    ram_size: u64,
    trace_on: bool,
    reads: u64,
    writes: u64,
    out_of_range: u64,
}

impl MainMemory {
    /// Creates a memory with `num_channels` channel pairs.
    ///
    /// `ram_size` bounds the Global address space; accesses at or beyond it
    /// are flagged as out of range but still answered.
    pub fn new(
        clock: &Clock,
        name: &str,
        num_channels: usize,
        latency: u64,
        ram_size: u64,
        trace_on: bool,
    ) -> Self {
        assert!(latency >= 1, "memory latency must be at least 1");
        Self {
            name: name.to_string(),
            channels: (0..num_channels)
                .map(|_| MemChannel {
                    req: SimPort::new(clock),
                    rsp: SimPort::new(clock),
                })
                .collect(),
            latency,
            ram_size,
            trace_on,
            reads: 0,
            writes: 0,
            out_of_range: 0,
        }
    }

    /// Read requests serviced so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Write requests serviced so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Out-of-range accesses observed so far.
    pub fn out_of_range(&self) -> u64 {
        self.out_of_range
    }
}

impl SimComponent for MainMemory {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        for channel in self.channels.iter() {
            channel.req.clear();
            channel.rsp.clear();
        }
        self.reads = 0;
        self.writes = 0;
        self.out_of_range = 0;
    }

    fn tick(&mut self) -> Result<(), SimError> {
        for channel in self.channels.iter() {
            let Some(req) = channel.req.pop() else {
                continue;
            };
            let out_of_range = req.space == AddrSpace::Global && req.addr >= self.ram_size;
            if out_of_range {
                self.out_of_range += 1;
                if self.trace_on {
                    eprintln!("*** {}: out-of-range access: {}", self.name, req);
                }
            }
            if req.write {
                self.writes += 1;
            } else {
                self.reads += 1;
                // abort-responses still carry the tag so no slot leaks
                let rsp = MemRsp {
                    tag: req.tag,
                    cid: req.cid,
                    uuid: req.uuid,
                    failed: out_of_range,
                };
                channel.rsp.push(rsp, self.latency);
            }
        }
        Ok(())
    }
}
