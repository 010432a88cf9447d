pub use crate::{
    alloc::{Allocator, primitives::Mallocator},
    collections::{DynArr, FixedArr, Cursor, Iter, RevIter, Forward, Reverse, TryReserveError},
    dynarr,
};
