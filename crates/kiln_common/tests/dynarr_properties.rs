//! Property tests for the dynamic array, checked against `Vec` as a model.

use proptest::prelude::*;

use kiln_common::{
    alloc::primitives::Mallocator,
    collections::DynArr,
};
#[cfg(feature = "memory_tracking")]
use kiln_common::alloc::composable::TrackingAllocator;

#[derive(Clone, Debug)]
enum Op {
    Push(i32),
    Pop,
    Insert(usize, i32),
    Remove(usize),
    Resize(usize),
    Truncate(usize),
    Clear,
    Grow,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => any::<i32>().prop_map(Op::Push),
        2 => Just(Op::Pop),
        2 => (any::<usize>(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
        2 => any::<usize>().prop_map(Op::Remove),
        1 => (0usize..64).prop_map(Op::Resize),
        1 => (0usize..64).prop_map(Op::Truncate),
        1 => Just(Op::Clear),
        1 => Just(Op::Grow),
    ]
}

/// Apply an operation to both the dynamic array and the model, indices are wrapped into the valid range.
fn apply(arr: &mut DynArr<i32>, model: &mut Vec<i32>, op: Op) {
    match op {
        Op::Push(v) => {
            arr.push(v);
            model.push(v);
        },
        Op::Pop => assert_eq!(arr.pop(), model.pop()),
        Op::Insert(i, v) => {
            let i = i % (model.len() + 1);
            arr.insert(i, v);
            model.insert(i, v);
        },
        Op::Remove(i) => if !model.is_empty() {
            let i = i % model.len();
            assert_eq!(arr.remove(i), model.remove(i));
        },
        Op::Resize(n) => {
            arr.resize(n);
            model.resize(n, 0);
        },
        Op::Truncate(n) => {
            arr.truncate(n);
            model.truncate(n);
        },
        Op::Clear => {
            arr.clear();
            model.clear();
        },
        Op::Grow => arr.grow(None),
    }
}

proptest! {
    #[test]
    fn matches_vec_model(ops in prop::collection::vec(arb_op(), 0..128)) {
        let mut arr = DynArr::new();
        let mut model = Vec::new();
        for op in ops {
            apply(&mut arr, &mut model, op);
            prop_assert!(arr.len() <= arr.capacity());
            prop_assert_eq!(arr.as_slice(), model.as_slice());
        }
    }

    #[test]
    fn push_pop_inverse(values in prop::collection::vec(any::<i32>(), 0..64), x in any::<i32>()) {
        let mut arr = DynArr::from(&values[..]);
        arr.push(x);
        prop_assert_eq!(arr.pop(), Some(x));
        prop_assert_eq!(arr.as_slice(), values.as_slice());
    }

    #[test]
    fn resize_to_len_is_noop(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let mut arr = DynArr::from(&values[..]);
        let cap = arr.capacity();
        arr.resize(arr.len());
        prop_assert_eq!(arr.capacity(), cap);
        prop_assert_eq!(arr.as_slice(), values.as_slice());
    }

    #[test]
    fn resize_round_trip_regrows_defaults(
        values in prop::collection::vec(1..i32::MAX, 1..64),
        extra in 1usize..32,
        cut in 0usize..64,
    ) {
        let n = values.len() + extra;
        let m = cut % n;

        let mut arr = DynArr::from(&values[..]);
        arr.resize(n);
        arr.resize(m);
        arr.resize(n);

        let kept = m.min(values.len());
        prop_assert_eq!(&arr[..kept], &values[..kept]);
        prop_assert!(arr[m..].iter().all(|&x| x == 0));
        prop_assert_eq!(arr.len(), n);
    }

    #[test]
    fn insert_remove_inverse(len in 0usize..64, pos in any::<usize>(), x in any::<i32>()) {
        let values: Vec<i32> = (0..len as i32).collect();
        let mut arr = DynArr::from(&values[..]);
        let pos = pos % (len + 1);

        let it = arr.insert_at(arr.begin() + pos as isize, x);
        prop_assert_eq!(arr.len(), len + 1);
        prop_assert_eq!(arr.remove_at(it), x);
        prop_assert_eq!(arr.as_slice(), values.as_slice());
    }

    #[test]
    fn find_returns_first_match(values in prop::collection::vec(0..8i32, 0..64), x in 0..8i32) {
        let arr = DynArr::from(&values[..]);
        let it = arr.find(&x);
        match values.iter().position(|&v| v == x) {
            Some(index) => {
                prop_assert_eq!(it - arr.begin(), index as isize);
                prop_assert_eq!(*arr.at(it), x);
            },
            None => prop_assert_eq!(it, arr.end()),
        }
    }

    #[test]
    fn traversal_agrees_with_indexing(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let arr = DynArr::from(&values[..]);

        let mut forward = Vec::new();
        let mut it = arr.begin();
        while it != arr.end() {
            forward.push(*arr.at(it));
            it.inc();
        }
        let indexed: Vec<i32> = (0..arr.len()).map(|i| arr[i]).collect();
        prop_assert_eq!(&forward, &indexed);

        let mut backward = Vec::new();
        let mut it = arr.rbegin();
        while it != arr.rend() {
            backward.push(*arr.at(it.post_inc()));
        }
        forward.reverse();
        prop_assert_eq!(&backward, &forward);
        prop_assert!(arr.walk_rev().copied().eq(forward));
    }

    #[test]
    fn push_capacity_is_doubling(n in 1usize..2048) {
        let mut arr = DynArr::<u8, _>::new_in(Mallocator);
        for i in 0..n {
            arr.push(i as u8);
        }
        prop_assert_eq!(arr.capacity(), n.next_power_of_two());
    }
}

#[cfg(feature = "memory_tracking")]
proptest! {
    #[test]
    fn push_reallocations_are_logarithmic(n in 1usize..4096) {
        let alloc = TrackingAllocator::new(Mallocator);
        let stats = alloc.stats().clone();
        {
            let mut arr = DynArr::new_in(alloc);
            for i in 0..n {
                arr.push(i);
            }
        }

        // Capacities 1, 2, 4, ..., n.next_power_of_two()
        let expected = n.next_power_of_two().trailing_zeros() as usize + 1;
        prop_assert_eq!(stats.num_allocs(), expected);
        prop_assert_eq!(stats.num_live_allocs(), 0);
    }
}

#[test]
fn dynarr_concrete_scenario() {
    let mut arr = DynArr::new();
    arr.push(1);
    arr.push(2);
    arr.push(3);
    assert_eq!(arr, [1, 2, 3]);

    arr.insert_at(arr.begin() + 1, 9);
    assert_eq!(arr, [1, 9, 2, 3]);

    arr.remove_at(arr.begin());
    assert_eq!(arr, [9, 2, 3]);

    arr.resize(5);
    assert_eq!(arr, [9, 2, 3, 0, 0]);
    assert!(arr.capacity() >= 5);

    let cap = arr.capacity();
    arr.clear();
    assert!(arr.is_empty());
    assert_eq!(arr.capacity(), cap);
}
