mod imp;
mod cursor;
mod dynarr;
mod fixed_arr;

use core::alloc::Layout;

use cfg_if::cfg_if;

pub use cursor::*;
pub use dynarr::*;
pub use fixed_arr::FixedArr;

//--------------------------------------------------------------

cfg_if! {
    if #[cfg(feature = "logging")] {
        pub(crate) use kiln_logging::{log_debug, log_error};

        pub(crate) const LOG_CAT : kiln_logging::LogCategory = kiln_logging::LogCategory::new("Collections");
    } else {
        macro_rules! log_debug {
            ($($arg:tt)*) => {};
        }
        pub(crate) use log_debug;

        macro_rules! log_error {
            ($($arg:tt)*) => {};
        }
        pub(crate) use log_error;
    }
}

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs where
            T : PartialEq<U>,
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[inline]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// Error returned when a container could not reserve the memory it needed.
///
/// When a fallible operation returns this error, the container it was called on is left unchanged.
#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum TryReserveError {
    /// The computed capacity exceeded the maximum size a container can have (`isize::MAX` bytes)
    #[error("memory allocation failed because the computed capacity exceeded the collection's maximum")]
    CapacityOverflow,
    /// The allocator could not provide the memory
    #[error("memory allocation of {} bytes (align {}) failed", layout.size(), layout.align())]
    AllocError {
        /// Layout of the allocation that failed
        layout: Layout,
    },
}

//--------------------------------------------------------------

/// A trait used to define a strategy to reserve additional memory for containers.
pub trait ReserveStrategy {
    /// Calculate the new capacity for a container.
    /// 
    /// `cur_capacity` represents the current capacity of the container.
    /// 
    /// `min_capacity` represents the minimum required capacity to be able to resize.
    /// 
    /// Returns `Err(())` if the capacity were to overflow
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()>;
}

const MAX_CAPACITY : usize = isize::MAX as usize;

/// A reserve strategy that keeps doubling the current capacity until it can hold the minimum required capacity.
/// 
/// An empty container starts doubling from a capacity of 1.
pub struct DoublingReserveStrategy;

impl ReserveStrategy for DoublingReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        if min_capacity > MAX_CAPACITY {
            return Err(());
        }

        let mut cap = cur_capacity.max(1);
        while cap < min_capacity {
            // Doubling past the limit would fail even though `min_capacity` fits, so settle for exactly `min_capacity`
            cap = match cap.checked_mul(2) {
                Some(new_cap) if new_cap <= MAX_CAPACITY => new_cap,
                _ => min_capacity,
            };
        }
        Ok(cap)
    }
}

/// A reserve strategy that will try to either return double the current capacity, or the minimum required capacity, whichever is bigger.
pub struct DoubleOrMinReserveStrategy;

impl ReserveStrategy for DoubleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        let double_cap = cur_capacity.saturating_mul(2);
        let new_cap = if double_cap > min_capacity { double_cap } else { min_capacity };
        if new_cap <= MAX_CAPACITY {
            Ok(new_cap)
        } else if min_capacity <= MAX_CAPACITY {
            Ok(min_capacity)
        } else {
            Err(())
        }
    }
}

/// A reserve strategy that will return a power of 2 capacity
pub struct Pow2ReserveStrategy;

impl ReserveStrategy for Pow2ReserveStrategy {
    fn calculate(_cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        match min_capacity.checked_next_power_of_two() {
            Some(new_cap) if new_cap <= MAX_CAPACITY => Ok(new_cap),
            _ => Err(()),
        }
    }
}

/// A reserve stategy that grows the capacity by 1.5
/// 
/// An empty container starts growing from a capacity of 1.
pub struct ThreeHalvesReserveStrategy;

impl ReserveStrategy for ThreeHalvesReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        if min_capacity > MAX_CAPACITY {
            return Err(());
        }

        let mut cap = cur_capacity.max(1);
        while cap < min_capacity {
            cap = (cap << 1) - (cap >> 1);
        }
        Ok(cap.min(MAX_CAPACITY))
    }
}
