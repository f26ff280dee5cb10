//! Lane-to-bank adapter tests.

use gpgpu_core::common::{LaneMask, MemoryMap, SimError};
use gpgpu_core::config::Config;
use gpgpu_core::mem::{LsuMemAdapter, LsuReq, MemRsp};
use gpgpu_core::sim::{Clock, SimComponent};

fn map() -> MemoryMap {
    MemoryMap::from_config(&Config::default().memory)
}

fn vector_read(lanes: usize, mask_bits: u64, tag: u64) -> LsuReq {
    let mut req = LsuReq::new(lanes);
    req.mask = LaneMask::from_bits(mask_bits, lanes);
    for i in 0..lanes {
        req.addrs[i] = 0x1000 + (i as u64) * 4;
    }
    req.tag = tag;
    req.uuid = 42;
    req
}

#[test]
fn scatters_lanes_across_banks() {
    let clock = Clock::new();
    let mut adapter = LsuMemAdapter::new(&clock, "adapter", 4, 2, map(), 1);

    adapter.req_in.push(vector_read(4, 0b1111, 3), 1);
    clock.advance();
    adapter.tick().unwrap();
    clock.advance();

    // lanes 0,2 on bank 0; lanes 1,3 on bank 1; all with the request tag
    let b0_first = adapter.req_out[0].pop().unwrap();
    let b0_second = adapter.req_out[0].pop().unwrap();
    assert_eq!((b0_first.addr, b0_second.addr), (0x1000, 0x1008));
    assert_eq!(b0_first.tag, 3);

    let b1_first = adapter.req_out[1].pop().unwrap();
    let b1_second = adapter.req_out[1].pop().unwrap();
    assert_eq!((b1_first.addr, b1_second.addr), (0x1004, 0x100C));
}

#[test]
fn gathers_full_mask_before_responding() {
    let clock = Clock::new();
    let mut adapter = LsuMemAdapter::new(&clock, "adapter", 4, 2, map(), 1);

    adapter.req_in.push(vector_read(4, 0b1111, 5), 1);
    clock.advance();
    adapter.tick().unwrap();

    // answer lane by lane; each bank completes its lanes oldest-first:
    // bank0 lane0, bank0 lane2, bank1 lane1
    let rsp = MemRsp {
        tag: 5,
        cid: 0,
        uuid: 42,
        failed: false,
    };
    for bank in [0, 0, 1] {
        adapter.rsp_out[bank].push(rsp, 1);
        clock.advance();
        adapter.tick().unwrap();
        assert!(adapter.rsp_in.is_empty(), "partial gather must hold");
    }
    // last outstanding lane (bank1 lane3) completes the gather
    adapter.rsp_out[1].push(rsp, 1);
    clock.advance();
    adapter.tick().unwrap();
    clock.advance();

    let lsu_rsp = adapter.rsp_in.pop().expect("gather complete");
    assert_eq!(lsu_rsp.mask.bits(), 0b1111);
    assert_eq!(lsu_rsp.tag, 5);
    assert_eq!(lsu_rsp.uuid, 42);
}

#[test]
fn write_requests_expect_no_response() {
    let clock = Clock::new();
    let mut adapter = LsuMemAdapter::new(&clock, "adapter", 2, 2, map(), 1);

    let mut req = vector_read(2, 0b11, 0);
    req.write = true;
    adapter.req_in.push(req, 1);
    clock.advance();
    adapter.tick().unwrap();
    clock.advance();

    assert!(adapter.req_out[0].pop().unwrap().write);
    assert!(adapter.req_out[1].pop().unwrap().write);
    // a stray response for a write tag is a protocol violation
    adapter.rsp_out[0].push(
        MemRsp {
            tag: 0,
            cid: 0,
            uuid: 0,
            failed: false,
        },
        1,
    );
    clock.advance();
    let err = adapter.tick().unwrap_err();
    assert!(matches!(err, SimError::UnknownTag { tag: 0, .. }));
}

#[test]
fn sparse_mask_only_touches_valid_lanes() {
    let clock = Clock::new();
    let mut adapter = LsuMemAdapter::new(&clock, "adapter", 4, 4, map(), 1);

    adapter.req_in.push(vector_read(4, 0b0101, 1), 1);
    clock.advance();
    adapter.tick().unwrap();
    clock.advance();

    assert!(!adapter.req_out[0].empty());
    assert!(adapter.req_out[1].empty());
    assert!(!adapter.req_out[2].empty());
    assert!(adapter.req_out[3].empty());
}
