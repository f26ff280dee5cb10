//! Device assembly and top-level run loop.
//!
//! Builds every component from the configuration, wires the per-block
//! memory path (LSU → demux → {local memory | adapter → switch → global
//! memory}), attaches the shared coprocessor pool to every SFU, and
//! registers everything with the engine. Registration order puts producers
//! ahead of consumers; every port carries at least one cycle of delay, so
//! the order is a convention rather than a correctness requirement.

use std::cell::RefCell;
use std::rc::Rc;

use crate::common::{MemoryMap, SimError};
use crate::config::Config;
use crate::coproc::{CoprocUnit, FixedLatencyCoproc};
use crate::core::{Core, TraceSource};
use crate::mem::{LocalMem, LocalMemDemux, LsuMemAdapter, MainMemory, MemSwitch};
use crate::sim::SimEngine;
use crate::stats::SimStats;

/// The assembled device: cores, memory path, coprocessors, and the engine
/// that drives them.
pub struct Device {
    engine: SimEngine,
    config: Rc<Config>,
    cores: Vec<Rc<RefCell<Core>>>,
    lmems: Vec<Rc<RefCell<LocalMem>>>,
    memory: Rc<RefCell<MainMemory>>,
    coprocs: Vec<Rc<RefCell<FixedLatencyCoproc>>>,
}

impl Device {
    /// Builds a device from a validated configuration.
    pub fn new(config: Config) -> Result<Self, SimError> {
        config.validate()?;
        let config = Rc::new(config);
        let mut engine = SimEngine::new();
        let clock = engine.clock().clone();
        let map = MemoryMap::from_config(&config.memory);

        let num_cores = config.core.num_cores;
        let num_blocks = config.lsu.num_blocks;
        let banks = config.lsu.num_banks;

        let memory = Rc::new(RefCell::new(MainMemory::new(
            &clock,
            "main-memory",
            num_cores * num_blocks,
            config.latency.dram,
            config.memory.ram_size,
            config.general.trace,
        )));

        let coprocs: Vec<Rc<RefCell<FixedLatencyCoproc>>> = (0..config.coproc.num_units)
            .map(|u| {
                Rc::new(RefCell::new(FixedLatencyCoproc::new(
                    &clock,
                    &format!("coproc{}", u),
                    config.latency.coproc,
                )))
            })
            .collect();

        let mut cores = Vec::with_capacity(num_cores);
        let mut lmems = Vec::new();
        let mut demuxes = Vec::new();
        let mut adapters = Vec::new();
        let mut switches = Vec::new();

        for cid in 0..num_cores {
            let mut core = Core::new(&clock, cid, config.clone());

            // shared coprocessor pool, filtered at the SFU by core id
            for unit in &coprocs {
                let unit = unit.borrow();
                core.sfu.connect_coproc(unit.input(), unit.output());
            }

            for b in 0..num_blocks {
                let prefix = format!("core{}-block{}", cid, b);
                let mut demux = LocalMemDemux::new(
                    &clock,
                    &format!("{}-lmem-demux", prefix),
                    map,
                    config.memory.demux_delay,
                );
                let mut lmem =
                    LocalMem::new(&clock, &format!("{}-lmem", prefix), config.latency.lmem);
                let mut adapter = LsuMemAdapter::new(
                    &clock,
                    &format!("{}-dc-adapter", prefix),
                    config.lsu.num_lanes,
                    banks,
                    map,
                    1,
                );
                let switch = MemSwitch::new(
                    &clock,
                    &format!("{}-dc-switch", prefix),
                    config.memory.arbiter,
                    banks,
                    1,
                    config.memory.switch_delay,
                );

                // LSU <-> demux
                demux.req_in.bind(&core.lsu.channel(b).req);
                core.lsu.channel_mut(b).rsp.bind(&demux.rsp_in);

                // demux <-> local memory
                lmem.req_in.bind(&demux.req_lmem);
                demux.rsp_lmem.bind(&lmem.rsp_in);

                // demux <-> adapter
                adapter.req_in.bind(&demux.req_dc);
                demux.rsp_dc.bind(&adapter.rsp_in);

                // adapter <-> switch; the switch side keeps its internal
                // bypass aliasing, so only adapter handles are re-bound
                for k in 0..banks {
                    adapter.req_out[k].bind(&switch.req_in[k]);
                    adapter.rsp_out[k].bind(&switch.rsp_in[k]);
                }

                // switch <-> global memory
                let ch = cid * num_blocks + b;
                {
                    let mut mem = memory.borrow_mut();
                    mem.channels[ch].req.bind(&switch.req_out[0]);
                    mem.channels[ch].rsp.bind(&switch.rsp_out[0]);
                }

                demuxes.push(Rc::new(RefCell::new(demux)));
                lmems.push(Rc::new(RefCell::new(lmem)));
                adapters.push(Rc::new(RefCell::new(adapter)));
                switches.push(Rc::new(RefCell::new(switch)));
            }

            cores.push(Rc::new(RefCell::new(core)));
        }

        // registration order: producers ahead of consumers
        for core in &cores {
            engine.register(core.clone());
        }
        for unit in &coprocs {
            engine.register(unit.clone());
        }
        for demux in &demuxes {
            engine.register(demux.clone());
        }
        for lmem in &lmems {
            engine.register(lmem.clone());
        }
        for adapter in &adapters {
            engine.register(adapter.clone());
        }
        for switch in &switches {
            engine.register(switch.clone());
        }
        engine.register(memory.clone());

        Ok(Self {
            engine,
            config,
            cores,
            lmems,
            memory,
            coprocs,
        })
    }

    /// The device configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of cores.
    pub fn num_cores(&self) -> usize {
        self.cores.len()
    }

    /// Shared handle to a core.
    pub fn core(&self, cid: usize) -> Rc<RefCell<Core>> {
        self.cores[cid].clone()
    }

    /// Shared handle to the global memory.
    pub fn memory(&self) -> Rc<RefCell<MainMemory>> {
        self.memory.clone()
    }

    /// Shared handle to a coprocessor unit.
    pub fn coproc(&self, unit: usize) -> Rc<RefCell<FixedLatencyCoproc>> {
        self.coprocs[unit].clone()
    }

    /// Installs a frontend trace source on one core.
    pub fn set_source(&self, cid: usize, source: Box<dyn TraceSource>) {
        self.cores[cid].borrow_mut().set_source(source);
    }

    /// Current cycle.
    pub fn cycle(&self) -> u64 {
        self.engine.cycle()
    }

    /// Resets every component and rewinds the clock.
    pub fn reset(&mut self) {
        self.engine.reset();
    }

    /// Whether every core has drained.
    pub fn done(&self) -> bool {
        self.cores.iter().all(|c| c.borrow().done())
    }

    /// Advances one cycle.
    pub fn step(&mut self) -> Result<(), SimError> {
        self.engine.step()
    }

    /// Runs until every core drains or the cycle budget is exhausted.
    pub fn run(&mut self) -> Result<SimStats, SimError> {
        let budget = self.config.general.cycle_budget;
        while !self.done() {
            if budget != 0 && self.engine.cycle() >= budget {
                return Err(SimError::CycleBudgetExceeded { budget });
            }
            self.engine.step()?;
        }
        Ok(self.stats())
    }

    /// Collects device-wide statistics.
    pub fn stats(&self) -> SimStats {
        let mut stats = SimStats::default();
        stats.cycles = self.engine.cycle();
        for core in &self.cores {
            stats.cores.push(core.borrow().perf().clone());
        }
        let memory = self.memory.borrow();
        stats.mem_reads = memory.reads();
        stats.mem_writes = memory.writes();
        stats.mem_out_of_range = memory.out_of_range();
        for lmem in &self.lmems {
            let lmem = lmem.borrow();
            stats.lmem_reads += lmem.reads();
            stats.lmem_writes += lmem.writes();
        }
        stats
    }
}
