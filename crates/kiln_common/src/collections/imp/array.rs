use core::{
    alloc::Layout,
    marker::PhantomData,
    mem::size_of,
    ptr::{self, NonNull},
};
use std::alloc::handle_alloc_error;

use crate::{
    alloc::Allocator,
    collections::{ReserveStrategy, TryReserveError, log_debug, log_error},
};
#[cfg(feature = "logging")]
use crate::collections::LOG_CAT;

/// Low level utility for more ergonomically allocating, reallocating, and deallocating
/// a buffer of memory in an allocator without having to worry about all the corner cases involved.
/// In particular:
/// 
/// - Produces `NonNull::dangling` on zero-sized types
/// - Produces `NonNull::dangling` on zero-length allocations.
/// - Avoids freeing `NonNull::dangling`
/// - Catches all overflows in capacity computations (promotes them to "capacity overflow" errors).
/// - Guards against overflowing your length
/// - Only releases the old block after the new block was allocated and filled, so a failed grow leaves the buffer untouched.
/// 
/// This type does not in anyway inspect the memory it manages. When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `RawArray` to handle the actual things *stored* inside of `RawArray`
/// 
/// Note that the capacity of a zero-sized type is always infinite, so `capacity()` always return `usize::MAX`.
pub(crate) struct RawArray<T, A: Allocator, R: ReserveStrategy> {
    ptr:      NonNull<T>,
    cap:      usize,
    alloc:    A,
    _phantom: PhantomData<(T, fn() -> R)>,
}

unsafe impl<T: Send, A: Allocator + Send, R: ReserveStrategy> Send for RawArray<T, A, R> {}
unsafe impl<T: Sync, A: Allocator + Sync, R: ReserveStrategy> Sync for RawArray<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> RawArray<T, A, R> {
    /// Creates the biggest possible `RawArray` (in the allocator) without allocating.
    /// If `T` has a non-zero size, the this makes a `RawArray` with a capacity of `0`.
    /// If `T` is zero-sized, the it makes a `RawArray` with a capacity of `usize::MAX`.
    /// Useful for implementing delayed allocation.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, alloc, _phantom: PhantomData }
    }

    /// Creates a `RawArray` (in the allocator) with exactly the capacity and alignment requirements for a `[T; capacity]`.
    /// This is equivalent to calling `RawArray::new_in` when `capacity` is `0` or `T` is zero-sized.
    /// 
    /// # Panics
    /// 
    /// Panics if the requested capacity exceed `isize::MAX` bytes.
    /// 
    /// # Aborts
    /// 
    /// Aborts on OOM
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        match Self::try_with_capacity_in(capacity, alloc) {
            Ok(arr) => arr,
            Err(err) => handle_error(err),
        }
    }

    /// Tries to create a `RawArray` (in the allocator) with exactly the capacity and alignment requirements for a `[T; capacity]`.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        let mut arr = Self::new_in(alloc);
        // Don't allocate here, because `drop` will not deallocate when capacity is 0.
        if size_of::<T>() != 0 && capacity != 0 {
            unsafe { arr.finalize_grow(capacity, 0)? };
        }
        Ok(arr)
    }

    /// Get the capacity of the allocation.
    /// 
    /// This will always be `usize::MAX` if `T` is zero-sized.
    #[inline]
    pub const fn capacity(&self) -> usize {
        if size_of::<T>() == 0 {
            usize::MAX
        } else {
            self.cap
        }
    }

    /// Get the allocator used for the allocation.
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Get a raw pointer to the start of the allocation.
    /// Note that this is a dangling pointer when either `capacity() == 0` or `T` is zero-sized.
    #[inline]
    pub const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub const fn non_null(&self) -> NonNull<T> {
        self.ptr
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already have enough capacity, will reallocate enough space as decided by the reserve strategy to get amortized *O*(1) behavior.
    /// 
    /// `len` may not exceed `self.capacity()`.
    /// 
    /// # Panics
    /// 
    /// Panics if the new capacity exceeds `isize::MAX` bytes.
    /// 
    /// # Aborts
    /// 
    /// Aborts on OOM.
    #[inline]
    pub fn reserve(&mut self, len: usize, additional: usize) {
        // Callers expect this function to be very cheap when there is already sufficient capacity.
        // Therefore, all the resizing and error-handling logic lives behind a cold call.
        #[cold]
        fn do_reserve_and_handle<T, A: Allocator, R: ReserveStrategy>(
            slf: &mut RawArray<T, A, R>,
            len: usize,
            additional: usize,
        ) {
            if let Err(err) = slf.grow_amortized(len, additional) {
                handle_error(err);
            }
        }

        if self.needs_to_grow(len, additional) {
            do_reserve_and_handle(self, len, additional);
        }
    }

    /// The same as `reserve`, but returns on errors instead of panicking or aborting.
    pub fn try_reserve(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if self.needs_to_grow(len, additional) {
            self.grow_amortized(len, additional)?;
        }
        Ok(())
    }

    /// Ensures that the buffer contains at least enough space to hold `len + additional` elements.
    /// If it doesn't already, will reallocate the minimum possible amount of memory necessary.
    /// 
    /// # Panics
    /// 
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    /// 
    /// # Aborts
    /// 
    /// Aborts on OOM.
    pub fn reserve_exact(&mut self, len: usize, additional: usize) {
        if let Err(err) = self.try_reserve_exact(len, additional) {
            handle_error(err);
        }
    }

    pub fn try_reserve_exact(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        if self.needs_to_grow(len, additional) {
            self.grow_exact(len, additional)?;
        }
        Ok(())
    }

    /// Grow the buffer by a single step of the reserve strategy, regardless of how much space is left.
    /// 
    /// An empty buffer grows to the first capacity the strategy produces for a single element.
    pub fn grow_one(&mut self, len: usize) {
        if let Err(err) = self.try_grow(len, None) {
            handle_error(err);
        }
    }

    /// Grow the buffer to `target_capacity`, or by a single step of the reserve strategy when no target is given.
    /// 
    /// A target that is not larger than the current capacity leaves the buffer untouched.
    pub fn try_grow(&mut self, len: usize, target_capacity: Option<usize>) -> Result<(), TryReserveError> {
        if size_of::<T>() == 0 {
            return Ok(());
        }

        let new_cap = match target_capacity {
            Some(target) if target <= self.cap => return Ok(()),
            Some(target) => target,
            None => {
                let min_cap = self.cap.checked_add(1).ok_or_else(|| report(TryReserveError::CapacityOverflow))?;
                R::calculate(self.cap, min_cap).map_err(|_| report(TryReserveError::CapacityOverflow))?
            },
        };
        unsafe { self.finalize_grow(new_cap, len) }
    }

    /// Shrinks the buffer down to the specified capacity, keeping the first `len` elements.
    /// If the given amount is 0, actually completely deallocates.
    /// 
    /// # Panics
    /// 
    /// Panics if the given amount is *larger* than the current capacity, or smaller than `len`.
    /// 
    /// # Aborts
    /// 
    /// Aborts on OOM.
    pub fn shrink_to(&mut self, len: usize, cap: usize) {
        assert!(cap <= self.capacity(), "Tried to shrink to a larger capacity");
        assert!(len <= cap, "Tried to shrink below the length");

        if size_of::<T>() == 0 || cap == self.cap {
            return;
        }

        if cap == 0 {
            unsafe { self.deallocate() };
            self.ptr = NonNull::dangling();
            self.cap = 0;
        } else if let Err(err) = unsafe { self.finalize_grow(cap, len) } {
            handle_error(err);
        }
    }

    //--------------------------------------------------------------

    /// Returns if the buffer needs to grow to fulfill the needed extra capacity.
    /// Mainly used to make inlining reserve-calls possible without inlining `grow`.
    #[inline]
    pub fn needs_to_grow(&self, len: usize, additional: usize) -> bool {
        additional > self.capacity().wrapping_sub(len)
    }

    fn grow_amortized(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        debug_assert!(additional > 0);

        if size_of::<T>() == 0 {
            // Since we return a capacity of `usize::MAX` when `elem_size` is 0, getting to here necessarily means that `RawArray` is overfull.
            return Err(report(TryReserveError::CapacityOverflow));
        }

        let required_cap = len.checked_add(additional).ok_or_else(|| report(TryReserveError::CapacityOverflow))?;
        let new_cap = R::calculate(self.cap, required_cap).map_err(|_| report(TryReserveError::CapacityOverflow))?;
        debug_assert!(new_cap >= required_cap);

        unsafe { self.finalize_grow(new_cap, len) }
    }

    fn grow_exact(&mut self, len: usize, additional: usize) -> Result<(), TryReserveError> {
        debug_assert!(additional > 0);

        if size_of::<T>() == 0 {
            // Since we return a capacity of `usize::MAX` when `elem_size` is 0, getting to here necessarily means that `RawArray` is overfull.
            return Err(report(TryReserveError::CapacityOverflow));
        }

        let new_cap = len.checked_add(additional).ok_or_else(|| report(TryReserveError::CapacityOverflow))?;
        unsafe { self.finalize_grow(new_cap, len) }
    }

    /// Move the first `len` elements into a new allocation of `new_cap` elements.
    /// 
    /// The current allocation is only released once the new one exists, so on error nothing has changed.
    /// 
    /// # Safety
    /// 
    /// - `T` may not be zero-sized
    /// - `new_cap` must be non-zero
    /// - `len` may not exceed the current capacity or `new_cap`
    unsafe fn finalize_grow(&mut self, new_cap: usize, len: usize) -> Result<(), TryReserveError> {
        debug_assert!(size_of::<T>() != 0 && new_cap != 0);
        debug_assert!(len <= self.cap && len <= new_cap);

        let layout = Layout::array::<T>(new_cap).map_err(|_| report(TryReserveError::CapacityOverflow))?;
        let Some(new_ptr) = self.alloc.alloc(layout) else {
            return Err(report(TryReserveError::AllocError { layout }));
        };
        let new_ptr = new_ptr.cast::<T>();

        if self.cap != 0 {
            ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len);
            self.deallocate();
        }

        log_debug!(LOG_CAT, "Reallocated array of `{}` from {} to {} elements", core::any::type_name::<T>(), self.cap, new_cap);

        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    /// Release the current allocation, without resetting the pointer or capacity.
    unsafe fn deallocate(&mut self) {
        if size_of::<T>() == 0 || self.cap == 0 {
            return;
        }

        // The layout was already validated when the memory was allocated
        let layout = Layout::from_size_align_unchecked(size_of::<T>() * self.cap, core::mem::align_of::<T>());
        self.alloc.dealloc(self.ptr.cast(), layout);
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Drop for RawArray<T, A, R> {
    fn drop(&mut self) {
        unsafe { self.deallocate() };
    }
}

fn report(err: TryReserveError) -> TryReserveError {
    log_error!(LOG_CAT, "Failed to reserve memory: {err}");
    err
}

/// Central function for reserve error handling
#[cold]
#[track_caller]
pub(crate) fn handle_error(err: TryReserveError) -> ! {
    match err {
        TryReserveError::CapacityOverflow => capacity_overflow(),
        TryReserveError::AllocError { layout } => handle_alloc_error(layout),
    }
}

#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}
