use super::*;

// ============================================================================
// Capacity calculation
// ============================================================================

#[test]
fn test_calculate_capacity_rounds_to_quantum_with_headroom() {
    assert_eq!(calculate_capacity(0).unwrap(), 16);
    assert_eq!(calculate_capacity(1).unwrap(), 16);
    assert_eq!(calculate_capacity(15).unwrap(), 16);
    // 16 requested leaves no spare slot in a 16 block
    assert_eq!(calculate_capacity(16).unwrap(), 32);
    assert_eq!(calculate_capacity(31).unwrap(), 32);
    assert_eq!(calculate_capacity(32).unwrap(), 48);
}

#[test]
fn test_calculate_capacity_overflow_is_out_of_memory() {
    assert_eq!(calculate_capacity(u32::MAX), Err(Error::OutOfMemory));
    assert_eq!(calculate_capacity(u32::MAX - 4), Err(Error::OutOfMemory));
}

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_new_has_zero_capacity() {
    let buffer = NativeBuffer::<u32>::new();
    assert_eq!(buffer.capacity().unwrap(), 0);
    assert_eq!(buffer.count().unwrap(), 0);
    assert!(buffer.is_empty().unwrap());
}

#[test]
fn test_with_capacity_rounds_up() {
    let buffer = NativeBuffer::<f32>::with_capacity(20).unwrap();
    assert_eq!(buffer.capacity().unwrap(), 32);
    assert_eq!(buffer.count().unwrap(), 0);
}

// ============================================================================
// Append
// ============================================================================

#[test]
fn test_add_grows_on_full() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.add(1).unwrap();
    assert_eq!(buffer.capacity().unwrap(), 16);

    for i in 2..=16 {
        buffer.add(i).unwrap();
    }
    assert_eq!(buffer.count().unwrap(), 16);
    assert_eq!(buffer.capacity().unwrap(), 16);

    buffer.add(17).unwrap();
    assert_eq!(buffer.capacity().unwrap(), 32);
    assert_eq!(buffer.as_slice().unwrap(), (1..=17).collect::<Vec<u32>>().as_slice());
}

#[test]
fn test_add_all_appends_in_order() {
    let mut buffer = NativeBuffer::<u16>::new();
    buffer.add(9).unwrap();
    buffer.add_all(&[1, 2, 3]).unwrap();
    assert_eq!(buffer.as_slice().unwrap(), &[9, 1, 2, 3]);
}

#[test]
fn test_add_all_large_run_grows_once() {
    let mut buffer = NativeBuffer::<u8>::new();
    let values: Vec<u8> = (0..40).collect();
    buffer.add_all(&values).unwrap();
    assert_eq!(buffer.count().unwrap(), 40);
    assert_eq!(buffer.capacity().unwrap(), 48);
}

// ============================================================================
// Sparse writes
// ============================================================================

#[test]
fn test_set_sparse_fills_gap_with_default() {
    let mut buffer = NativeBuffer::<i32>::new();
    buffer.add(5).unwrap();
    buffer.set(20, -1).unwrap();

    assert_eq!(buffer.count().unwrap(), 21);
    assert_eq!(buffer.capacity().unwrap(), 32);
    assert_eq!(buffer.get(0).unwrap(), 5);
    for i in 1..20 {
        assert_eq!(buffer.get(i).unwrap(), 0);
    }
    assert_eq!(buffer.get(20).unwrap(), -1);
}

#[test]
fn test_set_below_count_keeps_count() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.add_all(&[1, 2, 3]).unwrap();
    buffer.set(1, 7).unwrap();
    assert_eq!(buffer.count().unwrap(), 3);
    assert_eq!(buffer.as_slice().unwrap(), &[1, 7, 3]);
}

#[test]
fn test_set_after_clear_does_not_leak_stale_values() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.add_all(&[4, 4, 4, 4]).unwrap();
    buffer.clear().unwrap();
    buffer.set(3, 1).unwrap();
    assert_eq!(buffer.as_slice().unwrap(), &[0, 0, 0, 1]);
}

#[test]
fn test_set_all_advances_to_high_water_mark() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.set_all(2, &[8, 9]).unwrap();
    assert_eq!(buffer.as_slice().unwrap(), &[0, 0, 8, 9]);
    buffer.set_all(0, &[1]).unwrap();
    assert_eq!(buffer.count().unwrap(), 4);
}

#[test]
fn test_count_equals_high_water_mark_of_touched_indices() {
    let mut buffer = NativeBuffer::<u8>::new();
    let mut high_water = 0;
    for &index in &[3u32, 0, 17, 9, 40, 2] {
        buffer.set(index, 1).unwrap();
        high_water = high_water.max(index + 1);
        let capacity = buffer.capacity().unwrap();
        assert_eq!(buffer.count().unwrap(), high_water);
        assert!(capacity >= high_water);
        assert_eq!(capacity % GROWTH_QUANTUM, 0);
    }
}

// ============================================================================
// Indexing
// ============================================================================

#[test]
fn test_get_between_count_and_capacity_is_default() {
    let mut buffer = NativeBuffer::<f32>::new();
    buffer.add(2.5).unwrap();
    assert_eq!(buffer.get(10).unwrap(), 0.0);
}

#[test]
fn test_get_past_capacity_fails() {
    let buffer = NativeBuffer::<u32>::with_capacity(0).unwrap();
    assert_eq!(
        buffer.get(16),
        Err(Error::IndexOutOfRange { index: 16, capacity: 16 })
    );
}

#[test]
fn test_put_within_capacity_advances_count() {
    let mut buffer = NativeBuffer::<u32>::with_capacity(0).unwrap();
    buffer.put(4, 11).unwrap();
    assert_eq!(buffer.count().unwrap(), 5);
    assert_eq!(buffer.get(4).unwrap(), 11);
}

#[test]
fn test_put_past_capacity_does_not_grow() {
    let mut buffer = NativeBuffer::<u32>::new();
    assert_eq!(
        buffer.put(0, 1),
        Err(Error::IndexOutOfRange { index: 0, capacity: 0 })
    );
    assert_eq!(buffer.capacity().unwrap(), 0);
}

// ============================================================================
// Growth preserves data
// ============================================================================

#[test]
fn test_reserve_preserves_elements() {
    let mut buffer = NativeBuffer::<u64>::new();
    for i in 0..10 {
        buffer.add(i * 3).unwrap();
    }
    buffer.reserve(200).unwrap();
    assert_eq!(buffer.capacity().unwrap(), 208);
    for i in 0..10 {
        assert_eq!(buffer.get(i as u32).unwrap(), i * 3);
    }
}

#[test]
fn test_reserve_never_shrinks() {
    let mut buffer = NativeBuffer::<u8>::with_capacity(100).unwrap();
    buffer.reserve(1).unwrap();
    assert_eq!(buffer.capacity().unwrap(), 112);
}

#[test]
fn test_clear_keeps_capacity() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.add_all(&[1; 20]).unwrap();
    buffer.clear().unwrap();
    assert_eq!(buffer.count().unwrap(), 0);
    assert_eq!(buffer.capacity().unwrap(), 32);
}

#[test]
fn test_iter_covers_live_elements_only() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.add_all(&[1, 2, 3]).unwrap();
    let sum: u32 = buffer.iter().unwrap().sum();
    assert_eq!(sum, 6);
    assert_eq!(buffer.iter().unwrap().count(), 3);
}

#[test]
fn test_as_bytes_for_pod_elements() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.add(0x0102_0304).unwrap();
    assert_eq!(buffer.as_bytes().unwrap(), &0x0102_0304u32.to_ne_bytes());
}

// ============================================================================
// Disposal
// ============================================================================

#[test]
fn test_dispose_invalidates_every_call() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.add(1).unwrap();
    buffer.dispose().unwrap();

    let disposed = Err(Error::Disposed("NativeBuffer"));
    assert!(buffer.is_disposed());
    assert_eq!(buffer.capacity(), disposed);
    assert_eq!(buffer.count(), disposed);
    assert_eq!(buffer.add(2), Err(Error::Disposed("NativeBuffer")));
    assert_eq!(buffer.set(0, 2), Err(Error::Disposed("NativeBuffer")));
    assert_eq!(buffer.get(0), disposed);
    assert_eq!(buffer.clear(), Err(Error::Disposed("NativeBuffer")));
    assert_eq!(buffer.reserve(4), Err(Error::Disposed("NativeBuffer")));
    assert!(buffer.as_slice().is_err());
    assert!(buffer.as_ptr().is_err());
}

#[test]
fn test_double_dispose_fails() {
    let mut buffer = NativeBuffer::<u32>::new();
    buffer.dispose().unwrap();
    assert_eq!(buffer.dispose(), Err(Error::Disposed("NativeBuffer")));
}
