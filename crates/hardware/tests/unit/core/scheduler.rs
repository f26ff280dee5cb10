//! Warp scheduler tests.

use gpgpu_core::core::scheduler::WarpScheduler;
use gpgpu_core::core::warp::Warp;

fn active_warps(n: usize) -> Vec<Warp> {
    let mut warps: Vec<Warp> = (0..n).map(|_| Warp::new(1)).collect();
    for warp in warps.iter_mut() {
        warp.activate(0);
    }
    warps
}

#[test]
fn rotates_through_ready_warps() {
    let warps = active_warps(4);
    let mut sched = WarpScheduler::new();

    let picks: Vec<usize> = (0..8)
        .map(|_| sched.next_ready(&warps, |_| true).unwrap())
        .collect();
    // equal service: starts past warp 0's slot and wraps
    assert_eq!(picks, vec![1, 2, 3, 0, 1, 2, 3, 0]);
}

#[test]
fn skips_stalled_and_inactive_warps() {
    let mut warps = active_warps(4);
    warps[1].stalled = true;
    warps[2].active = false;
    let mut sched = WarpScheduler::new();

    let picks: Vec<usize> = (0..4)
        .map(|_| sched.next_ready(&warps, |_| true).unwrap())
        .collect();
    assert_eq!(picks, vec![3, 0, 3, 0]);
}

#[test]
fn structural_check_gates_readiness() {
    let warps = active_warps(2);
    let mut sched = WarpScheduler::new();

    // only warp 0 passes the structural check
    assert_eq!(sched.next_ready(&warps, |wid| wid == 0), Some(0));
    assert_eq!(sched.next_ready(&warps, |wid| wid == 0), Some(0));
    assert_eq!(sched.next_ready(&warps, |_| false), None);
}

#[test]
fn no_ready_warp_yields_none() {
    let mut warps = active_warps(2);
    warps[0].stalled = true;
    warps[1].stalled = true;
    let mut sched = WarpScheduler::new();
    assert_eq!(sched.next_ready(&warps, |_| true), None);
}
