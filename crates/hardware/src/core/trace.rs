//! In-flight instruction traces.
//!
//! A trace is the simulator's representation of one in-flight (partial)
//! instruction belonging to one warp. Traces are created at dispatch,
//! referenced by every stage that concurrently holds them, and released at
//! commit — hence the reference-counted handle. All fields are immutable
//! after dispatch except the log-once latch.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::common::ThreadMask;
use crate::mem::protocol::MemAddrSize;

/// The functional unit a trace is serviced by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FuType {
    /// Integer unit.
    Alu,
    /// Floating-point unit.
    Fpu,
    /// Load/store unit.
    Lsu,
    /// Special-function unit.
    Sfu,
}

impl fmt::Display for FuType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuType::Alu => write!(f, "ALU"),
            FuType::Fpu => write!(f, "FPU"),
            FuType::Lsu => write!(f, "LSU"),
            FuType::Sfu => write!(f, "SFU"),
        }
    }
}

/// Integer-unit operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// Single-cycle arithmetic/logic.
    Arith,
    /// Branches and jumps.
    Branch,
    /// System calls.
    Syscall,
    /// Integer multiply.
    Imul,
    /// Integer divide.
    Idiv,
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AluOp::Arith => write!(f, "ARITH"),
            AluOp::Branch => write!(f, "BRANCH"),
            AluOp::Syscall => write!(f, "SYSCALL"),
            AluOp::Imul => write!(f, "IMUL"),
            AluOp::Idiv => write!(f, "IDIV"),
        }
    }
}

/// Floating-point-unit operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FpuOp {
    /// Non-computational (moves, compares, classify).
    Fncp,
    /// Fused multiply-add family.
    Fma,
    /// Divide.
    Fdiv,
    /// Square root.
    Fsqrt,
    /// Conversions.
    Fcvt,
}

impl fmt::Display for FpuOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FpuOp::Fncp => write!(f, "FNCP"),
            FpuOp::Fma => write!(f, "FMA"),
            FpuOp::Fdiv => write!(f, "FDIV"),
            FpuOp::Fsqrt => write!(f, "FSQRT"),
            FpuOp::Fcvt => write!(f, "FCVT"),
        }
    }
}

/// Load/store-unit operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LsuOp {
    /// Memory read; commits when all lanes respond.
    Load,
    /// Memory write; commits immediately.
    Store,
    /// Drains all prior loads from the block before committing.
    Fence,
}

impl fmt::Display for LsuOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LsuOp::Load => write!(f, "LOAD"),
            LsuOp::Store => write!(f, "STORE"),
            LsuOp::Fence => write!(f, "FENCE"),
        }
    }
}

/// Special-function-unit operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SfuOp {
    /// Thread-mask control.
    Tmc,
    /// Spawn additional warps.
    Wspawn,
    /// Divergence split.
    Split,
    /// Divergence join.
    Join,
    /// Warp barrier.
    Bar,
    /// Predicate update.
    Pred,
    /// CSR read/write.
    Csrrw,
    /// CSR read/set.
    Csrrs,
    /// CSR read/clear.
    Csrrc,
    /// Texture coprocessor dispatch.
    Tex,
    /// Rasterizer coprocessor dispatch.
    Raster,
    /// Output-merge coprocessor dispatch.
    Om,
}

impl fmt::Display for SfuOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SfuOp::Tmc => write!(f, "TMC"),
            SfuOp::Wspawn => write!(f, "WSPAWN"),
            SfuOp::Split => write!(f, "SPLIT"),
            SfuOp::Join => write!(f, "JOIN"),
            SfuOp::Bar => write!(f, "BAR"),
            SfuOp::Pred => write!(f, "PRED"),
            SfuOp::Csrrw => write!(f, "CSRRW"),
            SfuOp::Csrrs => write!(f, "CSRRS"),
            SfuOp::Csrrc => write!(f, "CSRRC"),
            SfuOp::Tex => write!(f, "TEX"),
            SfuOp::Raster => write!(f, "RASTER"),
            SfuOp::Om => write!(f, "OM"),
        }
    }
}

/// The operation a trace performs, discriminated by functional unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceOp {
    /// Integer operation.
    Alu(AluOp),
    /// Floating-point operation.
    Fpu(FpuOp),
    /// Memory operation.
    Lsu(LsuOp),
    /// Special-function operation.
    Sfu(SfuOp),
}

impl TraceOp {
    /// Returns the unit that services this operation.
    pub fn unit(&self) -> FuType {
        match self {
            TraceOp::Alu(_) => FuType::Alu,
            TraceOp::Fpu(_) => FuType::Fpu,
            TraceOp::Lsu(_) => FuType::Lsu,
            TraceOp::Sfu(_) => FuType::Sfu,
        }
    }
}

impl fmt::Display for TraceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceOp::Alu(op) => write!(f, "{}", op),
            TraceOp::Fpu(op) => write!(f, "{}", op),
            TraceOp::Lsu(op) => write!(f, "{}", op),
            TraceOp::Sfu(op) => write!(f, "{}", op),
        }
    }
}

/// Operation-specific payload, discriminated by the trace's unit kind.
#[derive(Clone, Debug)]
pub enum TraceData {
    /// No payload.
    None,
    /// Per-thread addresses for LSU operations, indexed by thread id.
    Mem {
        /// One entry per thread in the warp.
        addrs: Vec<MemAddrSize>,
    },
    /// Two-argument payload for BAR (id, count) and WSPAWN (count, pc).
    Sfu {
        /// First argument.
        arg1: u64,
        /// Second argument.
        arg2: u64,
    },
    /// Target unit index for TEX/RASTER/OM dispatch.
    Coproc {
        /// Index into the device's coprocessor pool.
        unit: usize,
    },
}

/// One in-flight (partial) instruction belonging to one warp.
pub struct Trace {
    /// Globally unique serial number for logging and correlation.
    pub uuid: u64,
    /// Owning core.
    pub cid: usize,
    /// Owning warp.
    pub wid: usize,
    /// Packet index within the warp (LSU lane-group partitioning).
    pub pid: usize,
    /// Per-thread active mask.
    pub tmask: ThreadMask,
    /// True on the last trace of a multi-cycle instruction.
    pub eop: bool,
    /// The issuing warp pauses until this instruction's eop trace is serviced.
    pub fetch_stall: bool,
    /// The operation performed.
    pub op: TraceOp,
    /// Operation-specific payload.
    pub data: TraceData,
    log_flag: Cell<bool>,
    failure: Cell<bool>,
}

/// Shared trace handle; ownership is "last stage to release".
pub type TraceRef = Rc<Trace>;

impl Trace {
    /// Creates a single-packet, end-of-packet trace with no payload.
    pub fn new(uuid: u64, cid: usize, wid: usize, tmask: ThreadMask, op: TraceOp) -> Self {
        Self {
            uuid,
            cid,
            wid,
            pid: 0,
            tmask,
            eop: true,
            fetch_stall: false,
            op,
            data: TraceData::None,
            log_flag: Cell::new(false),
            failure: Cell::new(false),
        }
    }

    /// Sets the packet index.
    pub fn with_pid(mut self, pid: usize) -> Self {
        self.pid = pid;
        self
    }

    /// Sets the end-of-packet flag.
    pub fn with_eop(mut self, eop: bool) -> Self {
        self.eop = eop;
        self
    }

    /// Sets the fetch-stall flag.
    pub fn with_fetch_stall(mut self, fetch_stall: bool) -> Self {
        self.fetch_stall = fetch_stall;
        self
    }

    /// Attaches a payload.
    pub fn with_data(mut self, data: TraceData) -> Self {
        self.data = data;
        self
    }

    /// Wraps the trace into a shared handle.
    pub fn into_ref(self) -> TraceRef {
        Rc::new(self)
    }

    /// Swaps the log-once latch, returning its previous value.
    ///
    /// Callers that want to log an event once per trace do so when
    /// `log_once(true)` returns `false`.
    pub fn log_once(&self, value: bool) -> bool {
        self.log_flag.replace(value)
    }

    /// Latches a failure (e.g. an aborted memory access); surfaced at commit.
    pub fn mark_failed(&self) {
        self.failure.set(true);
    }

    /// Whether a failure was latched on this trace.
    pub fn failed(&self) -> bool {
        self.failure.get()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cid={}, wid={}, pid={}, tmask={}, eop={} (#{})",
            self.cid, self.wid, self.pid, self.tmask, self.eop as u8, self.uuid
        )
    }
}
