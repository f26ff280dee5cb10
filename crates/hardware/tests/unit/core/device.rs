//! Assembled-device tests.
//!
//! Drives the full memory path (LSU → demux → local memory / adapter →
//! switch → global memory) and the coprocessor pool through the public
//! device surface, using scripted per-warp programs.

use gpgpu_core::common::SimError;
use gpgpu_core::config::Config;
use gpgpu_core::core::trace::AluOp;
use gpgpu_core::device::Device;
use gpgpu_core::stats::SimStats;

use crate::common::builder;
use crate::common::harness::ProgramSource;

const GLOBAL: u64 = 0x1000_0000;
const LMEM: u64 = 0x6000_0000;

fn budgeted_config() -> Config {
    let mut config = Config::default();
    config.general.cycle_budget = 100_000;
    config
}

fn thread_addrs(base: u64) -> Vec<u64> {
    (0..4).map(|t| base + t * 4).collect()
}

#[test]
fn memcpy_program_drains_through_global_memory() {
    let config = budgeted_config();
    let mut device = Device::new(config).unwrap();

    let mut source = ProgramSource::new(4);
    let retired = source.retired();
    source.push(0, builder::load(1, 0, 0b1111, &thread_addrs(GLOBAL)));
    source.push(0, builder::store(2, 0, 0b1111, &thread_addrs(GLOBAL + 0x100)));
    source.push(0, builder::fence(3, 0));
    source.push(0, builder::alu(4, 0, AluOp::Arith));
    device.set_source(0, Box::new(source));

    let stats = device.run().expect("program drains");
    let total = stats.total();
    assert_eq!(total.instrs, 4);
    assert_eq!(total.loads, 4);
    assert_eq!(total.stores, 4);
    // each lane became one scalar transaction
    assert_eq!(stats.mem_reads, 4);
    assert_eq!(stats.mem_writes, 4);
    assert_eq!(stats.lmem_reads, 0);

    let retired = retired.borrow();
    assert_eq!(retired.len(), 4);
    assert!(retired.contains(&1) && retired.contains(&3));
}

#[test]
fn mixed_local_global_load_merges_before_commit() {
    let config = budgeted_config();
    let mut device = Device::new(config).unwrap();

    // lanes 0-1 hit shared memory, lanes 2-3 go global
    let addrs = vec![LMEM, LMEM + 4, GLOBAL, GLOBAL + 4];
    let mut source = ProgramSource::new(4);
    source.push(0, builder::load(1, 0, 0b1111, &addrs));
    device.set_source(0, Box::new(source));

    let stats = device.run().expect("split load completes");
    assert_eq!(stats.total().instrs, 1);
    assert_eq!(stats.lmem_reads, 2);
    assert_eq!(stats.mem_reads, 2);
}

#[test]
fn wspawn_and_barrier_synchronize_warps() {
    let mut config = budgeted_config();
    config.core.num_warps = 2;
    let mut device = Device::new(config).unwrap();

    let mut source = ProgramSource::new(2);
    source.push(0, builder::wspawn(1, 0, 2, 0x40));
    source.push(0, builder::bar(2, 0, 0, 2));
    source.push(1, builder::bar(3, 1, 0, 2));
    device.set_source(0, Box::new(source));

    let stats = device.run().expect("both warps pass the barrier");
    let total = stats.total();
    assert_eq!(total.instrs, 3);
    assert_eq!(total.wspawns, 1);
    assert_eq!(total.barrier_arrivals, 2);
}

#[test]
fn unreleased_barrier_hits_the_cycle_budget() {
    let mut config = budgeted_config();
    config.core.num_warps = 2;
    config.general.cycle_budget = 200;
    let mut device = Device::new(config).unwrap();

    // warp 1 never arrives
    let mut source = ProgramSource::new(2);
    source.push(0, builder::bar(1, 0, 0, 2));
    device.set_source(0, Box::new(source));

    let err = device.run().unwrap_err();
    assert!(matches!(err, SimError::CycleBudgetExceeded { budget: 200 }));
}

#[test]
fn fetch_stall_clears_when_the_unit_services_the_trace() {
    let config = budgeted_config();
    let mut device = Device::new(config).unwrap();

    let mut source = ProgramSource::new(4);
    let stalled = gpgpu_core::core::trace::Trace::new(
        1,
        0,
        0,
        builder::tmask(0b1111, 4),
        gpgpu_core::core::trace::TraceOp::Alu(AluOp::Idiv),
    )
    .with_fetch_stall(true)
    .into_ref();
    source.push(0, stalled);
    source.push(0, builder::alu(2, 0, AluOp::Arith));
    device.set_source(0, Box::new(source));

    // the second instruction can only fetch after the IDIV resumes the warp
    let stats = device.run().expect("warp resumes and drains");
    let total = stats.total();
    assert_eq!(total.instrs, 2);
    assert_eq!(total.fetch_stalls, 1);
}

#[test]
fn out_of_range_loads_still_complete() {
    let config = budgeted_config();
    let ram_size = config.memory.ram_size;
    let mut device = Device::new(config).unwrap();

    let mut source = ProgramSource::new(4);
    source.push(0, builder::load(1, 0, 0b1111, &thread_addrs(ram_size + 0x1000)));
    device.set_source(0, Box::new(source));

    let stats = device.run().expect("responses still delivered");
    assert_eq!(stats.total().instrs, 1);
    assert_eq!(stats.mem_out_of_range, 4);
    // the fault is latched on the trace and surfaced at commit
    assert_eq!(stats.total().failures, 1);
}

#[test]
fn coprocessor_dispatch_round_trips() {
    let config = budgeted_config();
    let mut device = Device::new(config).unwrap();

    let mut source = ProgramSource::new(4);
    source.push(0, builder::tex(1, 0, 0, 0));
    source.push(0, builder::alu(2, 0, AluOp::Arith));
    device.set_source(0, Box::new(source));

    let stats = device.run().expect("coproc trace returns");
    assert_eq!(stats.total().instrs, 2);
    assert_eq!(stats.total().coproc_dispatches, 1);
    assert_eq!(device.coproc(0).borrow().serviced(), 1);
}

fn run_reference_program() -> SimStats {
    let mut config = budgeted_config();
    config.core.num_warps = 2;
    let mut device = Device::new(config).unwrap();

    let mut source = ProgramSource::new(2);
    source.push(0, builder::wspawn(1, 0, 2, 0x40));
    source.push(0, builder::load(2, 0, 0b1111, &thread_addrs(GLOBAL)));
    source.push(0, builder::bar(3, 0, 0, 2));
    source.push(1, builder::store(4, 1, 0b1111, &thread_addrs(LMEM)));
    source.push(1, builder::bar(5, 1, 0, 2));
    device.set_source(0, Box::new(source));

    device.run().expect("reference program drains")
}

/// Identical inputs and config produce identical cycle counts and counters.
#[test]
fn runs_are_deterministic() {
    let first = run_reference_program();
    let second = run_reference_program();

    assert_eq!(first.cycles, second.cycles);
    assert_eq!(first.total().instrs, second.total().instrs);
    assert_eq!(first.total().loads, second.total().loads);
    assert_eq!(first.total().stores, second.total().stores);
    assert_eq!(first.total().load_latency, second.total().load_latency);
    assert_eq!(first.mem_reads, second.mem_reads);
    assert_eq!(first.lmem_writes, second.lmem_writes);
    assert_eq!(first.total().sched_idle, second.total().sched_idle);
}

#[test]
fn multi_core_devices_filter_coproc_returns() {
    let mut config = budgeted_config();
    config.core.num_cores = 2;
    let mut device = Device::new(config).unwrap();

    // both cores dispatch to the single shared unit
    for cid in 0..2 {
        let mut source = ProgramSource::new(4);
        source.push(0, builder::tex(10 + cid as u64, cid, 0, 0));
        device.set_source(cid, Box::new(source));
    }

    let stats = device.run().expect("both cores drain");
    assert_eq!(stats.cores[0].instrs, 1);
    assert_eq!(stats.cores[1].instrs, 1);
    assert_eq!(device.coproc(0).borrow().serviced(), 2);
}
