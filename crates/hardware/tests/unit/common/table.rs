//! Slot table tests.

use gpgpu_core::common::SlotTable;

#[test]
fn allocate_lowest_free_index() {
    let mut table: SlotTable<&str> = SlotTable::new(4);
    assert_eq!(table.allocate("a"), Some(0));
    assert_eq!(table.allocate("b"), Some(1));
    table.release(0);
    // freed slot 0 is reused before slot 2
    assert_eq!(table.allocate("c"), Some(0));
    assert_eq!(table.allocate("d"), Some(2));
}

#[test]
fn full_table_refuses() {
    let mut table: SlotTable<u32> = SlotTable::new(2);
    assert_eq!(table.allocate(1), Some(0));
    assert_eq!(table.allocate(2), Some(1));
    assert!(table.full());
    assert_eq!(table.allocate(3), None);
    assert_eq!(table.size(), 2);
}

#[test]
fn size_never_exceeds_capacity() {
    let mut table: SlotTable<u32> = SlotTable::new(3);
    for round in 0..10 {
        let _ = table.allocate(round);
        assert!(table.size() <= table.capacity());
    }
}

#[test]
fn release_returns_entry() {
    let mut table: SlotTable<&str> = SlotTable::new(2);
    let idx = table.allocate("payload").unwrap();
    assert!(table.contains(idx));
    assert_eq!(table.release(idx), "payload");
    assert!(!table.contains(idx));
    assert!(table.empty());
}

#[test]
#[should_panic]
fn double_release_panics() {
    let mut table: SlotTable<u32> = SlotTable::new(2);
    let idx = table.allocate(7).unwrap();
    table.release(idx);
    table.release(idx);
}

#[test]
fn clear_frees_everything() {
    let mut table: SlotTable<u32> = SlotTable::new(4);
    table.allocate(1);
    table.allocate(2);
    table.clear();
    assert!(table.empty());
    assert_eq!(table.allocate(3), Some(0));
}
