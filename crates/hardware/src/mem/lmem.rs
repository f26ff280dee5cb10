//! Core-local shared memory endpoint.
//!
//! A fixed-latency responder for the shared-memory window. Accepts the
//! vector request protocol directly: a read is answered with a full-mask
//! response after the configured latency; a write completes silently.
//! Bank conflicts are not modeled.

use crate::common::SimError;
use crate::mem::protocol::{LsuReq, LsuRsp};
use crate::sim::{Clock, SimComponent, SimPort};

/// Fixed-latency shared-memory model, one per LSU block.
pub struct LocalMem {
    name: String,
    /// Vector requests from the demux.
    pub req_in: SimPort<LsuReq>,
    /// Vector responses back to the demux.
    pub rsp_in: SimPort<LsuRsp>,
    latency: u64,
    reads: u64,
    writes: u64,
}

impl LocalMem {
    /// Creates a local memory with the given access latency.
    pub fn new(clock: &Clock, name: &str, latency: u64) -> Self {
        assert!(latency >= 1, "memory latency must be at least 1");
        Self {
            name: name.to_string(),
            req_in: SimPort::new(clock),
            rsp_in: SimPort::new(clock),
            latency,
            reads: 0,
            writes: 0,
        }
    }

    /// Lane-reads serviced so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Lane-writes serviced so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl SimComponent for LocalMem {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.req_in.clear();
        self.rsp_in.clear();
        self.reads = 0;
        self.writes = 0;
    }

    fn tick(&mut self) -> Result<(), SimError> {
        if let Some(req) = self.req_in.pop() {
            if req.write {
                self.writes += req.mask.count() as u64;
            } else {
                self.reads += req.mask.count() as u64;
                let rsp = LsuRsp {
                    mask: req.mask,
                    tag: req.tag,
                    cid: req.cid,
                    uuid: req.uuid,
                    failed: false,
                };
                self.rsp_in.push(rsp, self.latency);
            }
        }
        Ok(())
    }
}
