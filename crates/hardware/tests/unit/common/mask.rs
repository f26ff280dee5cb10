//! Bitset mask tests.

use gpgpu_core::common::BitMask;

#[test]
fn set_test_count() {
    let mut m = BitMask::new(8);
    assert!(m.none());
    m.set(0);
    m.set(5);
    assert!(m.test(0));
    assert!(m.test(5));
    assert!(!m.test(1));
    assert_eq!(m.count(), 2);
    assert!(m.any());
}

#[test]
fn full_and_from_bits_truncate() {
    let m = BitMask::full(4);
    assert_eq!(m.bits(), 0b1111);
    // bits beyond the width are dropped
    let m = BitMask::from_bits(0b1_0110, 4);
    assert_eq!(m.bits(), 0b0110);
}

#[test]
fn subtract_union_subset() {
    let mut m = BitMask::from_bits(0b1111, 4);
    m.subtract(BitMask::from_bits(0b0101, 4));
    assert_eq!(m.bits(), 0b1010);

    let mut u = BitMask::from_bits(0b0001, 4);
    u.union(BitMask::from_bits(0b1000, 4));
    assert_eq!(u.bits(), 0b1001);

    assert!(BitMask::from_bits(0b0010, 4).subset_of(BitMask::from_bits(0b1010, 4)));
    assert!(!BitMask::from_bits(0b0110, 4).subset_of(BitMask::from_bits(0b1010, 4)));
}

#[test]
fn iter_yields_set_bits_ascending() {
    let m = BitMask::from_bits(0b1011, 4);
    let bits: Vec<usize> = m.iter().collect();
    assert_eq!(bits, vec![0, 1, 3]);
}

#[test]
fn display_msb_first() {
    let m = BitMask::from_bits(0b0011, 4);
    assert_eq!(format!("{}", m), "0011");
}
