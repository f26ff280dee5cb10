//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the GPGPU simulator. It provides:
//! 1. **Cycle and IPC:** Total cycles, committed instructions, derived IPC.
//! 2. **Per-core counters:** Loads, stores, load latency, scheduler and LSU stalls.
//! 3. **Memory:** Global/local access counts and out-of-range accesses.

use std::time::Instant;

/// Per-core performance counters, updated by the core and its units.
#[derive(Clone, Debug, Default)]
pub struct CorePerf {
    /// Instructions committed (one per end-of-packet trace).
    pub instrs: u64,
    /// Traces committed, including partial packets.
    pub traces: u64,
    /// Load lanes issued to memory.
    pub loads: u64,
    /// Store lanes issued to memory.
    pub stores: u64,
    /// Sum over cycles of in-flight load lanes (average latency numerator).
    pub load_latency: u64,
    /// Cycles an issue slot was blocked on a full pending-load table.
    pub lsu_stalls: u64,
    /// Instructions fetched with the fetch-stall flag set.
    pub fetch_stalls: u64,
    /// Cycles the scheduler found no ready warp.
    pub sched_idle: u64,
    /// Traces dispatched to coprocessor units.
    pub coproc_dispatches: u64,
    /// Warp-spawn operations serviced.
    pub wspawns: u64,
    /// Barrier arrivals recorded.
    pub barrier_arrivals: u64,
    /// Traces that committed with a latched failure.
    pub failures: u64,
}

impl CorePerf {
    /// Folds another counter set into this one.
    pub fn merge(&mut self, other: &CorePerf) {
        self.instrs += other.instrs;
        self.traces += other.traces;
        self.loads += other.loads;
        self.stores += other.stores;
        self.load_latency += other.load_latency;
        self.lsu_stalls += other.lsu_stalls;
        self.fetch_stalls += other.fetch_stalls;
        self.sched_idle += other.sched_idle;
        self.coproc_dispatches += other.coproc_dispatches;
        self.wspawns += other.wspawns;
        self.barrier_arrivals += other.barrier_arrivals;
        self.failures += other.failures;
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"core"`, `"memory"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "core", "memory"];

/// Device-level simulation statistics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Per-core counters, indexed by core id.
    pub cores: Vec<CorePerf>,
    /// Global memory read requests.
    pub mem_reads: u64,
    /// Global memory write requests.
    pub mem_writes: u64,
    /// Out-of-range global accesses.
    pub mem_out_of_range: u64,
    /// Local memory lane reads.
    pub lmem_reads: u64,
    /// Local memory lane writes.
    pub lmem_writes: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            cores: Vec::new(),
            mem_reads: 0,
            mem_writes: 0,
            mem_out_of_range: 0,
            lmem_reads: 0,
            lmem_writes: 0,
        }
    }
}

impl SimStats {
    /// Counters summed over all cores.
    pub fn total(&self) -> CorePerf {
        let mut total = CorePerf::default();
        for core in &self.cores {
            total.merge(core);
        }
        total
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"core"`,
    /// or `"memory"`. Pass an empty slice to print all sections.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let total = self.total();

        if want("summary") {
            let ipc = total.instrs as f64 / cyc as f64;
            let khz = (self.cycles as f64 / seconds) / 1000.0;
            println!("\n==========================================================");
            println!("GPGPU SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {:.4} s", seconds);
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {:.2} kHz", khz);
            println!("sim_insts                {}", total.instrs);
            println!("sim_ipc                  {:.4}", ipc);
            println!("----------------------------------------------------------");
        }
        if want("core") {
            println!("CORE BREAKDOWN");
            for (cid, core) in self.cores.iter().enumerate() {
                let avg_load_lat = if core.loads > 0 {
                    core.load_latency as f64 / core.loads as f64
                } else {
                    0.0
                };
                println!("  core{}", cid);
                println!("    instrs               {}", core.instrs);
                println!("    traces               {}", core.traces);
                println!(
                    "    sched.idle           {} ({:.2}%)",
                    core.sched_idle,
                    (core.sched_idle as f64 / cyc as f64) * 100.0
                );
                println!("    fetch.stalls         {}", core.fetch_stalls);
                println!("    lsu.stalls           {}", core.lsu_stalls);
                println!("    load.latency.avg     {:.2}", avg_load_lat);
                println!("    coproc.dispatches    {}", core.coproc_dispatches);
                println!("    wspawns              {}", core.wspawns);
                println!("    barrier.arrivals     {}", core.barrier_arrivals);
                println!("    commit.failures      {}", core.failures);
            }
            println!("----------------------------------------------------------");
        }
        if want("memory") {
            println!("MEMORY");
            println!("  global.reads           {}", self.mem_reads);
            println!("  global.writes          {}", self.mem_writes);
            println!("  global.out_of_range    {}", self.mem_out_of_range);
            println!("  local.reads            {}", self.lmem_reads);
            println!("  local.writes           {}", self.lmem_writes);
            println!("  core.loads             {}", total.loads);
            println!("  core.stores            {}", total.stores);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
