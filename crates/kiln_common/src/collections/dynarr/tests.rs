use core::cell::RefCell;
use std::{
    collections::hash_map::DefaultHasher,
    mem,
    panic::{self, AssertUnwindSafe},
};

use crate::{
    alloc::{primitives::Mallocator, composable::BudgetAllocator},
    collections::{Pow2ReserveStrategy, ThreeHalvesReserveStrategy},
    dynarr,
};
use super::*;

/// Element recording its id in a shared log when it is dropped
struct DropLog<'a> {
    id:  i32,
    log: &'a RefCell<Vec<i32>>,
}

impl<'a> DropLog<'a> {
    fn new(id: i32, log: &'a RefCell<Vec<i32>>) -> Self {
        Self { id, log }
    }
}

impl Drop for DropLog<'_> {
    fn drop(&mut self) {
        self.log.borrow_mut().push(self.id);
    }
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn dynarr_new() {
    let arr = DynArr::<i32>::new();
    assert_eq!(arr.capacity(), 0);
    assert_eq!(arr.len(), 0);
    assert!(arr.is_empty());

    let arr = DynArr::<i32>::with_capacity(21);
    assert!(arr.capacity() >= 21);
    assert_eq!(arr.len(), 0);

    let arr = DynArr::<i32>::with_len(4);
    assert_eq!(arr.capacity(), 4);
    assert_eq!(arr, [0, 0, 0, 0]);

    let arr: DynArr<i32> = DynArr::default();
    assert_eq!(arr.capacity(), 0);
}

#[test]
fn dynarr_macro() {
    let arr: DynArr<i32> = dynarr![];
    assert!(arr.is_empty());

    let arr = dynarr![1, 2, 3,];
    assert_eq!(arr, [1, 2, 3]);
    assert_eq!(arr.capacity(), 3);

    let arr = dynarr![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
    assert_eq!(arr.len(), 12);
    assert_eq!(arr.capacity(), 12);

    let arr = dynarr![String::from("a"); 3];
    assert_eq!(arr, ["a", "a", "a"]);
}

#[test]
fn dynarr_reserve() {
    let mut arr = DynArr::<i32>::new();
    arr.reserve(21);
    assert!(arr.capacity() >= 21);

    let mut arr = DynArr::<i32>::new();
    arr.reserve_exact(21);
    assert_eq!(arr.capacity(), 21);

    let mut arr = DynArr::<i32>::new();
    assert!(matches!(arr.try_reserve(21), Ok(())));
    assert!(arr.capacity() >= 21);

    let mut arr = DynArr::<i32>::new();
    assert!(matches!(arr.try_reserve_exact(21), Ok(())));
    assert!(arr.capacity() >= 21);

    let mut arr = dynarr![1, 2];
    assert_eq!(arr.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
    assert_eq!(arr, [1, 2]);
}

#[test]
fn dynarr_push_and_access() {
    let mut arr = DynArr::<i32>::new();

    arr.push(42);
    assert!(arr.capacity() >= 1);
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0], 42);

    arr.push(84);
    assert!(arr.capacity() >= 2);
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[1], 84);

    let mut arr = dynarr![1, 2, 3];
    assert_eq!(arr.push_within_capacity(4), Err(4));
    arr.reserve(1);
    assert_eq!(arr.push_within_capacity(4), Ok(()));
    assert_eq!(arr[3], 4);
}

#[test]
fn dynarr_push_doubles_capacity() {
    let mut arr = DynArr::<u16>::new();
    let mut caps = DynArr::new();
    for i in 0..9 {
        arr.push(i);
        caps.push(arr.capacity());
    }
    assert_eq!(caps, [1, 2, 4, 4, 8, 8, 8, 8, 16]);
}

#[test]
fn dynarr_reserve_strategies() {
    let mut arr = DynArr::with_strategy_in(Mallocator, Pow2ReserveStrategy);
    arr.extend_from_slice(&[1, 2, 3]);
    assert_eq!(arr.capacity(), 4);
    arr.push(4);
    arr.push(5);
    assert_eq!(arr.capacity(), 8);

    let mut arr = DynArr::with_strategy_in(Mallocator, ThreeHalvesReserveStrategy);
    let mut caps = DynArr::new();
    for i in 0..6 {
        arr.push(i);
        caps.push(arr.capacity());
    }
    assert_eq!(caps, [1, 2, 3, 5, 5, 8]);
}

#[test]
fn dynarr_grow() {
    let mut arr = DynArr::<i32>::new();
    arr.grow(None);
    assert_eq!(arr.capacity(), 1);
    arr.grow(None);
    assert_eq!(arr.capacity(), 2);
    arr.grow(Some(10));
    assert_eq!(arr.capacity(), 10);
    arr.grow(Some(4));
    assert_eq!(arr.capacity(), 10);
    assert_eq!(arr.try_grow(Some(usize::MAX)), Err(TryReserveError::CapacityOverflow));
    assert_eq!(arr.capacity(), 10);
}

#[test]
fn dynarr_pop() {
    let mut arr = dynarr![1, 2, 3];
    assert_eq!(arr.pop(), Some(3));
    assert_eq!(arr.pop(), Some(2));
    assert_eq!(arr.pop(), Some(1));
    assert_eq!(arr.pop(), None);
    assert_eq!(arr.capacity(), 3);
}

#[test]
fn dynarr_insert_remove() {
    let mut arr = dynarr![1, 2, 3];
    arr.insert(0, 0);
    arr.insert(4, 4);
    arr.insert(2, 9);
    assert_eq!(arr, [0, 1, 9, 2, 3, 4]);

    assert_eq!(arr.remove(2), 9);
    assert_eq!(arr.remove(4), 4);
    assert_eq!(arr.remove(0), 0);
    assert_eq!(arr, [1, 2, 3]);

    assert_eq!(arr.swap_remove(0), 1);
    assert_eq!(arr, [3, 2]);
}

#[test]
fn dynarr_remove_last_stays_in_bounds() {
    let log = RefCell::new(Vec::new());
    let mut arr = DynArr::with_capacity(3);
    arr.push(DropLog::new(0, &log));
    arr.push(DropLog::new(1, &log));

    let removed = arr.remove(1);
    assert_eq!(removed.id, 1);
    assert_eq!(arr.len(), 1);
    assert!(log.borrow().is_empty());

    drop(removed);
    drop(arr);
    assert_eq!(*log.borrow(), [1, 0]);
}

#[test]
#[should_panic(expected = "insertion index (is 4) should be <= len (is 3)")]
fn dynarr_insert_out_of_range() {
    let mut arr = dynarr![1, 2, 3];
    arr.insert(4, 0);
}

#[test]
#[should_panic(expected = "removal index (is 3) should be < len (is 3)")]
fn dynarr_remove_out_of_range() {
    let mut arr = dynarr![1, 2, 3];
    arr.remove(3);
}

#[test]
fn dynarr_try_insert() {
    // Both the old and the new block are alive while growing
    let mut arr = DynArr::<u32, _>::new_in(BudgetAllocator::new(Mallocator, 12));
    assert_eq!(arr.try_insert(0, 1), Ok(()));
    assert_eq!(arr.try_insert(0, 2), Ok(()));
    assert!(matches!(arr.try_insert(1, 3), Err(TryReserveError::AllocError { .. })));
    assert_eq!(arr, [2, 1]);
}

#[test]
fn dynarr_cursor_insert_remove() {
    let mut arr = dynarr![1, 2, 3];

    let it = arr.insert_at(arr.begin() + 1, 9);
    assert_eq!(arr, [1, 9, 2, 3]);
    assert_eq!(*arr.at(it), 9);

    let end = arr.end();
    arr.insert_at(end, 4);
    assert_eq!(arr, [1, 9, 2, 3, 4]);

    // A reverse cursor addresses the element it points at
    assert_eq!(arr.remove_at(arr.rbegin() + 1), 3);
    assert_eq!(arr, [1, 9, 2, 4]);
    arr.insert_at(arr.rbegin(), 7);
    assert_eq!(arr, [1, 9, 2, 7, 4]);

    assert_eq!(arr.remove_at(arr.begin()), 1);
    assert_eq!(arr, [9, 2, 7, 4]);

    let it = arr.begin() + 2;
    *arr.at_mut(it) = 70;
    assert_eq!(arr, [9, 2, 70, 4]);
}

#[test]
#[should_panic(expected = "cursor does not belong to this container")]
fn dynarr_stale_cursor() {
    let mut arr = DynArr::with_capacity(1);
    arr.push(1);
    let it = arr.begin();
    // Reallocates, the new block is allocated while the old one is still alive
    arr.push(2);
    arr.insert_at(it, 0);
}

#[test]
fn dynarr_cursor_distance() {
    let arr = dynarr![1, 2, 3, 4, 5];
    assert_eq!(arr.end() - arr.begin(), 5);
    assert_eq!(arr.rend() - arr.rbegin(), 5);
    assert_eq!(arr.rbegin() - arr.rend(), -5);
    assert_eq!(arr.find(&4) - arr.begin(), 3);

    let empty = DynArr::<i32>::new();
    assert_eq!(empty.rend() - empty.rbegin(), 0);
}

#[test]
#[should_panic(expected = "cursor does not belong to this container")]
fn dynarr_foreign_cursor() {
    let arr = dynarr![1, 2, 3];
    let other = dynarr![1, 2, 3];
    arr.at(other.begin());
}

#[test]
#[should_panic]
fn dynarr_remove_at_end() {
    let mut arr = dynarr![1, 2, 3];
    arr.remove_at(arr.end());
}

#[test]
#[should_panic]
fn dynarr_insert_at_rend() {
    let mut arr = dynarr![1, 2, 3];
    arr.insert_at(arr.rend(), 0);
}

#[test]
fn dynarr_find() {
    let arr = dynarr![5, 3, 7, 3];
    let it = arr.find(&3);
    assert_eq!(it - arr.begin(), 1);
    assert_eq!(unsafe { *it.get() }, 3);
    assert_eq!(arr.find(&8), arr.end());

    let empty = DynArr::<i32>::new();
    assert_eq!(empty.find(&1), empty.begin());
}

#[test]
fn dynarr_remove_item() {
    let mut arr = dynarr![5, 3, 7, 3];
    assert_eq!(arr.remove_item(&3), Some(3));
    assert_eq!(arr, [5, 7, 3]);
    assert_eq!(arr.remove_item(&4), None);
    assert_eq!(arr, [5, 7, 3]);
}

#[test]
fn dynarr_walk() {
    let arr = dynarr![1, 2, 3, 4];
    assert!(arr.walk().copied().eq([1, 2, 3, 4]));
    assert!(arr.walk_rev().copied().eq([4, 3, 2, 1]));
    assert_eq!(arr.walk().len(), 4);

    let mut sum = 0;
    for x in &arr {
        sum += x;
    }
    assert_eq!(sum, 10);

    let mut it = arr.rbegin();
    let mut collected = DynArr::new();
    while it != arr.rend() {
        collected.push(*arr.at(it.post_inc()));
    }
    assert_eq!(collected, [4, 3, 2, 1]);

    let empty = DynArr::<i32>::new();
    assert_eq!(empty.walk().next(), None);
    assert_eq!(empty.walk_rev().next(), None);
}

#[test]
fn dynarr_iter_mut() {
    let mut arr = dynarr![1, 2, 3];
    for x in &mut arr {
        *x *= 2;
    }
    assert_eq!(arr, [2, 4, 6]);
}

#[test]
fn dynarr_resize() {
    let mut arr = dynarr![1, 2, 3];
    arr.resize(5);
    assert_eq!(arr, [1, 2, 3, 0, 0]);
    // Doubled from 3
    assert_eq!(arr.capacity(), 6);

    arr.resize(2);
    assert_eq!(arr, [1, 2]);
    assert_eq!(arr.capacity(), 6);

    arr.resize(4);
    assert_eq!(arr, [1, 2, 0, 0]);

    arr.resize(4);
    assert_eq!(arr, [1, 2, 0, 0]);
    assert_eq!(arr.capacity(), 6);

    let mut arr = DynArr::<i32>::new();
    arr.resize(5);
    assert_eq!(arr.capacity(), 8);

    let mut arr = dynarr![1, 2, 3];
    arr.resize_fill(6, 5);
    assert_eq!(arr, [1, 2, 3, 5, 5, 5]);

    let mut arr = dynarr![1, 2, 3];
    let mut next = 10;
    arr.resize_with(5, || { next += 1; next });
    assert_eq!(arr, [1, 2, 3, 11, 12]);

    arr.resize(0);
    assert!(arr.is_empty());
}

#[test]
fn dynarr_resize_drops_descending() {
    let log = RefCell::new(Vec::new());
    let mut arr = DynArr::new();
    for i in 0..5 {
        arr.push(DropLog::new(i, &log));
    }

    arr.truncate(2);
    assert_eq!(*log.borrow(), [4, 3, 2]);
    arr.truncate(0);
    assert_eq!(*log.borrow(), [4, 3, 2, 1, 0]);
    assert_eq!(arr.capacity(), 8);
}

#[test]
fn dynarr_clear_drops_in_order() {
    let log = RefCell::new(Vec::new());
    let mut arr = DynArr::new();
    for i in 0..4 {
        arr.push(DropLog::new(i, &log));
    }
    let cap = arr.capacity();

    arr.clear();
    assert_eq!(*log.borrow(), [0, 1, 2, 3]);
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), cap);

    drop(arr);
    assert_eq!(log.borrow().len(), 4);
}

#[test]
fn dynarr_hard_clear() {
    let mut arr = dynarr![1, 2, 3];
    arr.hard_clear();
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), 3);
    arr.push(4);
    assert_eq!(arr, [4]);
}

#[test]
fn dynarr_drops_each_element_once() {
    let log = RefCell::new(Vec::new());
    {
        let mut arr = DynArr::new();
        for i in 0..10 {
            arr.push(DropLog::new(i, &log));
        }
        arr.insert(3, DropLog::new(10, &log));
        drop(arr.remove(0));
        drop(arr.swap_remove(0));
        drop(arr.pop());
        arr.truncate(5);
    }

    let mut dropped = log.into_inner();
    dropped.sort_unstable();
    assert_eq!(dropped, (0..=10).collect::<Vec<_>>());
}

#[test]
fn dynarr_panicking_generator_keeps_written_elements() {
    let log = RefCell::new(Vec::new());
    let mut arr = DynArr::new();
    arr.push(DropLog::new(0, &log));

    let mut next = 0;
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        arr.resize_with(5, || {
            next += 1;
            if next == 3 {
                panic!("generator failed");
            }
            DropLog::new(next, &log)
        });
    }));
    assert!(result.is_err());
    assert_eq!(arr.len(), 3);
    assert!(log.borrow().is_empty());

    drop(arr);
    assert_eq!(*log.borrow(), [0, 1, 2]);
}

#[test]
fn dynarr_clone() {
    let mut arr = DynArr::with_capacity(10);
    arr.extend_from_slice(&[String::from("a"), String::from("b")]);

    let copy = arr.clone();
    assert_eq!(copy, arr);
    assert_eq!(copy.capacity(), 10);
    assert_ne!(copy.as_ptr(), arr.as_ptr());
}

#[test]
fn dynarr_take() {
    let mut arr = dynarr![1, 2, 3];
    let moved = mem::take(&mut arr);
    assert_eq!(moved, [1, 2, 3]);
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), 0);
}

#[test]
fn dynarr_failed_growth_leaves_array_untouched() {
    // 8 + 16 bytes alive while growing to 2, 16 + 32 bytes while growing to 4, growing to 8 needs 96
    let mut arr = DynArr::<u64, _>::new_in(BudgetAllocator::new(Mallocator, 64));
    for i in 1..=4 {
        assert_eq!(arr.try_push(i), Ok(()));
    }
    let ptr = arr.as_ptr();

    let err = arr.try_push(5).unwrap_err();
    assert_eq!(err, TryReserveError::AllocError { layout: core::alloc::Layout::array::<u64>(8).unwrap() });
    assert_eq!(arr, [1, 2, 3, 4]);
    assert_eq!(arr.capacity(), 4);
    assert_eq!(arr.as_ptr(), ptr);

    assert!(arr.try_resize(10).is_err());
    assert_eq!(arr, [1, 2, 3, 4]);
    assert!(arr.try_grow(None).is_err());
    assert_eq!(arr.capacity(), 4);

    assert_eq!(arr.try_resize(2), Ok(()));
    assert_eq!(arr, [1, 2]);
}

#[cfg(feature = "memory_tracking")]
#[test]
fn dynarr_reallocations_are_logarithmic() {
    use crate::alloc::composable::TrackingAllocator;

    let alloc = TrackingAllocator::new(Mallocator);
    let stats = alloc.stats().clone();
    let mut arr = DynArr::new_in(alloc);
    for i in 0..1000u32 {
        arr.push(i);
    }

    // 1, 2, 4, ..., 1024
    assert_eq!(stats.num_allocs(), 11);
    assert_eq!(stats.num_live_allocs(), 1);
    assert_eq!(stats.live_bytes(), 1024 * 4);

    drop(arr);
    assert_eq!(stats.num_live_allocs(), 0);
    assert_eq!(stats.live_bytes(), 0);
}

#[test]
fn dynarr_shrink_to_fit() {
    let mut arr = DynArr::with_capacity(10);
    arr.extend([1, 2, 3]);
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 3);
    assert_eq!(arr, [1, 2, 3]);

    arr.clear();
    arr.shrink_to_fit();
    assert_eq!(arr.capacity(), 0);
    arr.push(1);
    assert_eq!(arr, [1]);
}

#[test]
fn dynarr_into_iter() {
    let arr = dynarr![String::from("a"), String::from("b"), String::from("c")];
    let mut iter = arr.into_iter();
    assert_eq!(iter.len(), 3);
    assert_eq!(iter.next().as_deref(), Some("a"));
    assert_eq!(iter.next_back().as_deref(), Some("c"));
    assert_eq!(iter.as_slice(), ["b"]);

    let log = RefCell::new(Vec::new());
    let arr: DynArr<_> = (0..4).map(|i| DropLog::new(i, &log)).collect();
    let mut iter = arr.into_iter();
    drop(iter.next());
    drop(iter);
    assert_eq!(*log.borrow(), [0, 1, 2, 3]);
}

#[test]
fn dynarr_zero_sized() {
    let mut arr = DynArr::new();
    assert_eq!(arr.capacity(), usize::MAX);
    for _ in 0..5 {
        arr.push(());
    }
    assert_eq!(arr.len(), 5);
    assert_eq!(arr.walk().count(), 5);
    assert_eq!(arr.walk_rev().count(), 5);
    assert_eq!(arr.remove(2), ());
    arr.insert(0, ());
    assert_eq!(arr.pop(), Some(()));
    assert_eq!(arr.len(), 4);
    assert_eq!(arr.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
}

#[test]
fn dynarr_conversions() {
    let arr = DynArr::from([1, 2, 3]);
    assert_eq!(arr.capacity(), 3);
    let arr2 = DynArr::from(&[1, 2, 3][..]);
    assert_eq!(arr, arr2);

    let collected: DynArr<i32> = (1..=3).collect();
    assert_eq!(collected, arr);

    let mut extended = DynArr::<i32>::new();
    extended.extend(&[1, 2]);
    extended.extend(core::iter::once(3));
    assert_eq!(extended, arr);

    assert_eq!(arr.as_ref(), &[1, 2, 3]);
    assert_eq!(&arr[1..], &[2, 3]);
    assert_eq!(format!("{arr:?}"), "[1, 2, 3]");
}

#[test]
fn dynarr_compare_and_hash() {
    let a = dynarr![1, 2, 3];
    let b = dynarr![1, 2, 4];
    assert!(a < b);
    assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    assert_eq!(a, [1, 2, 3]);
    assert_eq!([1, 2, 3], a);
    assert_eq!(a, &[1, 2, 3][..]);
    assert_eq!(hash_of(&a), hash_of(&a.clone()));
    assert_ne!(hash_of(&a), hash_of(&b));
}

#[test]
fn dynarr_scenario() {
    let mut arr = DynArr::new();
    arr.push(1);
    arr.push(2);
    arr.push(3);
    assert_eq!(arr.len(), 3);
    assert_eq!(arr, [1, 2, 3]);

    arr.insert_at(arr.begin() + 1, 9);
    assert_eq!(arr, [1, 9, 2, 3]);
    assert_eq!(arr.len(), 4);

    arr.remove_at(arr.begin());
    assert_eq!(arr, [9, 2, 3]);
    assert_eq!(arr.len(), 3);

    arr.resize(5);
    assert_eq!(arr, [9, 2, 3, 0, 0]);
    assert!(arr.capacity() >= 5);

    let cap = arr.capacity();
    arr.clear();
    assert_eq!(arr.len(), 0);
    assert_eq!(arr.capacity(), cap);
}
