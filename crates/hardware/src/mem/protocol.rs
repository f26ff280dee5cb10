//! Wire-level transaction types.
//!
//! This module defines the request/response bundles exchanged on the memory
//! path. It provides:
//! 1. **Vector transactions:** `LsuReq`/`LsuRsp` carry up to one address per
//!    LSU lane under a shared tag.
//! 2. **Scalar transactions:** `MemReq`/`MemRsp` carry a single address
//!    downstream of the adapter.
//! 3. **Tag access:** The [`Tagged`] trait lets switches prefix and strip
//!    routing bits without knowing the payload type.

use std::fmt;

use crate::common::{AddrSpace, LaneMask};

/// A per-thread address and access size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemAddrSize {
    /// Byte address.
    pub addr: u64,
    /// Access size in bytes.
    pub size: u32,
}

/// Messages whose routing tag a switch may rewrite in place.
///
/// A switch with R > 1 groupings encodes the input sub-index into the low
/// `log2(R)` bits on the request path and strips them on the response path;
/// intermediate consumers must carry the tag through unchanged.
pub trait Tagged {
    /// Returns the current tag.
    fn tag(&self) -> u64;
    /// Replaces the tag.
    fn set_tag(&mut self, tag: u64);
}

/// A bundle of per-lane addresses sharing one tag.
///
/// The response mask for a tag is always a subset of the request mask, and
/// the union of all responses for one tag equals the request mask.
#[derive(Clone, Debug)]
pub struct LsuReq {
    /// Lane validity; `addrs[i]` is meaningful iff bit `i` is set.
    pub mask: LaneMask,
    /// Per-lane byte addresses.
    pub addrs: Vec<u64>,
    /// Write (no response expected) vs read.
    pub write: bool,
    /// Pending-load table slot, zero for writes.
    pub tag: u64,
    /// Originating core.
    pub cid: usize,
    /// Trace serial number for correlation.
    pub uuid: u64,
}

impl LsuReq {
    /// Creates an empty request with the given lane count.
    pub fn new(lanes: usize) -> Self {
        Self {
            mask: LaneMask::new(lanes),
            addrs: vec![0; lanes],
            write: false,
            tag: 0,
            cid: 0,
            uuid: 0,
        }
    }
}

impl Tagged for LsuReq {
    fn tag(&self) -> u64 {
        self.tag
    }
    fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }
}

impl fmt::Display for LsuReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rw={}, mask={}, ", self.write as u8, self.mask)?;
        for i in 0..self.mask.width() {
            if self.mask.test(i) {
                write!(f, "addr{}={:#x}, ", i, self.addrs[i])?;
            } else {
                write!(f, "addr{}=-, ", i)?;
            }
        }
        write!(f, "tag={:#x}, cid={} (#{})", self.tag, self.cid, self.uuid)
    }
}

/// A (possibly partial) response to a read `LsuReq`.
#[derive(Clone, Debug)]
pub struct LsuRsp {
    /// Lanes this response completes.
    pub mask: LaneMask,
    /// Tag of the originating request.
    pub tag: u64,
    /// Originating core.
    pub cid: usize,
    /// Trace serial number for correlation.
    pub uuid: u64,
    /// A lane in this response faulted (e.g. out-of-range access).
    pub failed: bool,
}

impl LsuRsp {
    /// Creates an empty response with the given lane count.
    pub fn new(lanes: usize) -> Self {
        Self {
            mask: LaneMask::new(lanes),
            tag: 0,
            cid: 0,
            uuid: 0,
            failed: false,
        }
    }
}

impl Tagged for LsuRsp {
    fn tag(&self) -> u64 {
        self.tag
    }
    fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }
}

impl fmt::Display for LsuRsp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mask={}, tag={:#x}, cid={} (#{})",
            self.mask, self.tag, self.cid, self.uuid
        )
    }
}

/// A single-address wire transaction.
#[derive(Clone, Copy, Debug)]
pub struct MemReq {
    /// Byte address.
    pub addr: u64,
    /// Write (no response expected) vs read.
    pub write: bool,
    /// Address-space classification, fixed at the adapter.
    pub space: AddrSpace,
    /// Correlation tag; switches prefix-extend and strip it in flight.
    pub tag: u64,
    /// Originating core.
    pub cid: usize,
    /// Trace serial number for correlation.
    pub uuid: u64,
}

impl Tagged for MemReq {
    fn tag(&self) -> u64 {
        self.tag
    }
    fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }
}

impl fmt::Display for MemReq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rw={}, addr={:#x}, type={}, tag={:#x}, cid={} (#{})",
            self.write as u8, self.addr, self.space, self.tag, self.cid, self.uuid
        )
    }
}

/// The response to a non-write `MemReq`; every such request yields exactly
/// one response with the same tag.
#[derive(Clone, Copy, Debug)]
pub struct MemRsp {
    /// Tag of the originating request.
    pub tag: u64,
    /// Originating core.
    pub cid: usize,
    /// Trace serial number for correlation.
    pub uuid: u64,
    /// The access faulted (abort-response).
    pub failed: bool,
}

impl Tagged for MemRsp {
    fn tag(&self) -> u64 {
        self.tag
    }
    fn set_tag(&mut self, tag: u64) {
        self.tag = tag;
    }
}

impl fmt::Display for MemRsp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag={:#x}, cid={} (#{})", self.tag, self.cid, self.uuid)
    }
}
