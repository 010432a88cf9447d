use core::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    mem::ManuallyDrop,
    ops::{Deref, DerefMut, Index, IndexMut},
    ptr,
    slice::{self, SliceIndex},
};

use crate::alloc::{Allocator, primitives::Mallocator};
use super::{
    imp::array::{RawArray, handle_error},
    Cursor, Direction, Forward, Iter, Reverse, RevIter, Walk,
    DoublingReserveStrategy, ReserveStrategy, TryReserveError, impl_slice_partial_eq_generic,
};

mod into_iter;
#[cfg(test)]
mod tests;

pub use into_iter::IntoIter;

/// A contiguous growable array type, also known as a dynamic array, or DynArr.
///
/// Dynamic arrays have *O*(1) indexing, amortized *O*(1) push (to the end), and *O*(1) pop (from the back).
///
/// _Note: It was decided to not name this `Vec` as in the standard library, as this is easily confusable with a math vector_
///
/// # Examples
///
/// ```
/// # use kiln_common::prelude::*;
/// let mut arr = DynArr::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
/// assert_eq!(arr, [7, 2, 1, 2, 3]);
/// ```
///
/// The [`dynarr!`] macro is provided for convenient initialization:
///
/// ```
/// # use kiln_common::prelude::*;
/// let mut arr1 = dynarr![1, 2, 3];
/// arr1.push(4);
/// let arr2 = dynarr![1, 2, 3, 4];
/// assert_eq!(arr1, arr2);
///
/// let arr = dynarr![0; 5];
/// assert_eq!(arr, [0, 0, 0, 0, 0]);
/// ```
///
/// # Indexing
///
/// The `DynArr` type allows access to values by index, because it implements the [`Index`] trait.
/// Only live elements can be indexed, accessing an index past [`DynArr::len`] will panic, even when it is still inside of the capacity.
///
/// # Cursors
///
/// Positions in the array can also be expressed as [`Cursor`]s, which can be moved around with pointer-like arithmetic.
/// [`DynArr::begin`] and [`DynArr::end`] walk the array front to back, [`DynArr::rbegin`] and [`DynArr::rend`] back to front.
///
/// ```
/// # use kiln_common::prelude::*;
/// let mut arr = dynarr![1, 2, 3];
/// arr.insert_at(arr.begin() + 1, 9);
/// assert_eq!(arr, [1, 9, 2, 3]);
///
/// let found = arr.find(&2);
/// assert_eq!(found - arr.begin(), 2);
/// assert_eq!(arr.remove_at(found), 2);
/// assert_eq!(arr.find(&2), arr.end());
/// ```
///
/// A cursor does not borrow the array, so it is invalidated by any operation that reallocates or shifts elements.
/// Operations taking a cursor check that it lies inside of the live range and that its start pointer matches the current allocation.
/// The pointer check is best effort: it rejects cursors from other containers and most stale cursors,
/// but a stale cursor is accepted when the allocator hands the old address back out.
///
/// # Capacity and reallocation
///
/// The capacity of a dynamic array is the amount of space allocated for any future elements that will be added onto the array.
/// This is not to be confused with the *length* of the dynamic array, which specifies the number of actual elements within the dynamic array.
/// If a dynamic array's length exceeds its capacity, its capacity will automatically be increased according to the reserve strategy `R`,
/// by default doubling the capacity (starting from 1 for an empty array).
///
/// Growing moves the elements into a new allocation before the old allocation is freed, so when allocation fails, the array is left untouched.
/// The `try_*` variants of the growing operations return this failure as a [`TryReserveError`], the other variants panic or abort.
///
/// # Guarantees
///
/// Only the elements in `0..len` are ever initialized, the remaining capacity is uninitialized memory.
pub struct DynArr<T, A: Allocator = Mallocator, R: ReserveStrategy = DoublingReserveStrategy> {
    buf: RawArray<T, A, R>,
    len: usize,
}

impl<T> DynArr<T> {
    /// Constructs a new, empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { buf: RawArray::new_in(Mallocator), len: 0 }
    }

    /// Constructs a new, empty `DynArr<T>` with at least the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Mallocator)
    }

    /// Constructs a new, empty `DynArr<T>` with at least the specified capacity.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_with_capacity_in(capacity, Mallocator)
    }

    /// Constructs a `DynArr<T>` holding `len` default values, with a capacity of exactly `len`.
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let arr = DynArr::<u32>::with_len(3);
    /// assert_eq!(arr, [0, 0, 0]);
    /// assert_eq!(arr.capacity(), 3);
    /// ```
    #[must_use]
    pub fn with_len(len: usize) -> Self where
        T: Default
    {
        let mut arr = Self::with_capacity(len);
        arr.extend_with(len, T::default);
        arr
    }

    pub fn try_with_len(len: usize) -> Result<Self, TryReserveError> where
        T: Default
    {
        let mut arr = Self::try_with_capacity(len)?;
        arr.extend_with(len, T::default);
        Ok(arr)
    }

    #[doc(hidden)]
    pub fn from_elem(elem: T, n: usize) -> Self where
        T: Clone
    {
        let mut arr = Self::with_capacity(n);
        arr.extend_with(n, || elem.clone());
        arr
    }
}

impl<T, A: Allocator> DynArr<T, A> {
    /// Constructs a new, empty `DynArr<T, A>` allocating from `alloc`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self { buf: RawArray::new_in(alloc), len: 0 }
    }

    /// Constructs a new, empty `DynArr<T, A>` with at least the specified capacity in the provided allocator.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM.
    #[inline]
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self { buf: RawArray::with_capacity_in(capacity, alloc), len: 0 }
    }

    /// Constructs a new, empty `DynArr<T, A>` with at least the specified capacity in the provided allocator.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity exceeds `isize::MAX` _bytes_, or if the allocator reports an allocation failure.
    #[inline]
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        Ok(Self { buf: RawArray::try_with_capacity_in(capacity, alloc)?, len: 0 })
    }
}

impl<T, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Constructs a new, empty `DynArr<T, A, R>` allocating from `alloc` and growing according to the reserve strategy `R`.
    ///
    /// ```
    /// # use kiln_common::{prelude::*, collections::Pow2ReserveStrategy};
    /// let mut arr = DynArr::with_strategy_in(Mallocator, Pow2ReserveStrategy);
    /// arr.extend([1, 2, 3, 4, 5]);
    /// assert_eq!(arr.capacity(), 8);
    /// ```
    #[inline]
    #[must_use]
    pub fn with_strategy_in(alloc: A, _strategy: R) -> Self {
        Self { buf: RawArray::new_in(alloc), len: 0 }
    }

    /// Returns a reference to the underlying allocator.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Returns the total number of elements the dynamic array can hold without reallocating.
    ///
    /// Zero-sized elements never need memory, so their capacity is always `usize::MAX`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the number of elements in the dynamic array, also referred to as its 'length'.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the dynamic array contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reserves capacity for at least `additional` more elements to be inserted.
    /// The reserve strategy may decide to reserve more space to avoid frequent reallocations.
    /// After calling `reserve`, capacity will be greater than or equal to `self.len() + additional`.
    /// Does nothing if capacity is already sufficient.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn reserve(&mut self, additional: usize) {
        self.buf.reserve(self.len, additional);
    }

    /// Reserves the minimum capacity for at least `additional` more elements to be inserted.
    /// Unlike [`reserve`](DynArr::reserve), this will not deliberately over-allocate.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn reserve_exact(&mut self, additional: usize) {
        self.buf.reserve_exact(self.len, additional);
    }

    /// Tries to reserve capacity for at least `additional` more elements to be inserted.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, then an error is returned and the dynamic array is left unchanged.
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let mut arr = dynarr![1u8, 2, 3];
    /// assert_eq!(arr.try_reserve(usize::MAX), Err(TryReserveError::CapacityOverflow));
    /// assert_eq!(arr, [1, 2, 3]);
    /// ```
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.buf.try_reserve(self.len, additional)
    }

    /// Tries to reserve the minimum capacity for at least `additional` more elements to be inserted.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, then an error is returned and the dynamic array is left unchanged.
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.buf.try_reserve_exact(self.len, additional)
    }

    /// Grows the storage of the dynamic array.
    ///
    /// Without a target, the capacity grows by a single step of the reserve strategy, i.e. doubles for the default strategy.
    /// An empty array grows to a capacity of 1.
    /// With a target, the capacity grows to exactly `target_capacity` if it is larger than the current capacity.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn grow(&mut self, target_capacity: Option<usize>) {
        match target_capacity {
            None => self.buf.grow_one(self.len),
            Some(target) => if let Err(err) = self.buf.try_grow(self.len, Some(target)) {
                handle_error(err);
            },
        }
    }

    /// The same as [`grow`](DynArr::grow), but returns on errors instead of panicking or aborting.
    pub fn try_grow(&mut self, target_capacity: Option<usize>) -> Result<(), TryReserveError> {
        self.buf.try_grow(self.len, target_capacity)
    }

    /// Shrinks the capacity of the dynamic array as much as possible, an empty array releases its allocation.
    pub fn shrink_to_fit(&mut self) {
        if self.capacity() > self.len {
            self.buf.shrink_to(self.len, self.len);
        }
    }

    /// Shortens the dynamic array, keeping the first `len` elements and dropping the rest.
    ///
    /// The elements are dropped from the back to the front.
    /// If `len` is greater or equal to the array's current length, this has no effect.
    /// This has no effect on the capacity.
    pub fn truncate(&mut self, len: usize) {
        while self.len > len {
            // The length is updated first, so a panicking destructor can't cause the element to be dropped twice
            self.len -= 1;
            unsafe { ptr::drop_in_place(self.buf.ptr().add(self.len)) };
        }
    }

    /// Extracts a slice containing the entire dynamic array.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice containing the entire dynamic array.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Returns a raw pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero-sized reads if the array didn't allocate.
    ///
    /// The pointer is invalidated when the dynamic array reallocates.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.ptr()
    }

    /// Returns an unsafe mutable pointer to the dynamic array's buffer, or a dangling raw pointer valid for zero-sized reads if the array didn't allocate.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.ptr()
    }

    /// Forces the length of the dynamic array to `new_len`.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to [`capacity()`](DynArr::capacity)
    /// - The elements at `old_len..new_len` must be initialized
    /// - The elements at `new_len..old_len` are forgotten, they are not dropped
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    /// Appends an element to the back of the dynamic array.
    ///
    /// When the array is full, it grows before the element is written.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    #[inline]
    pub fn push(&mut self, value: T) {
        let len = self.len;
        if len == self.buf.capacity() {
            self.buf.reserve(len, 1);
        }
        unsafe { self.buf.ptr().add(len).write(value) };
        self.len = len + 1;
    }

    /// Appends an element to the back of the dynamic array.
    ///
    /// # Errors
    ///
    /// Returns an error when the array needed to grow, but could not, in which case `value` is dropped and the array is unchanged.
    pub fn try_push(&mut self, value: T) -> Result<(), TryReserveError> {
        let len = self.len;
        if len == self.buf.capacity() {
            self.buf.try_reserve(len, 1)?;
        }
        unsafe { self.buf.ptr().add(len).write(value) };
        self.len = len + 1;
        Ok(())
    }

    /// Appends an element if there is sufficient spare capacity, otherwise an error is returned with the element.
    ///
    /// Unlike [`push`](DynArr::push), this method will not reallocate when there's insufficient capacity.
    pub fn push_within_capacity(&mut self, value: T) -> Result<(), T> {
        if self.len == self.buf.capacity() {
            return Err(value);
        }
        unsafe { self.buf.ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element from the dynamic array and returns it, or `None` if it is empty.
    ///
    /// The capacity is not affected.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            self.len -= 1;
            Some(unsafe { self.buf.ptr().add(self.len).read() })
        }
    }

    /// Inserts an element at position `index` within the dynamic array, shifting all elements after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) {
        let len = self.len;
        if index > len {
            insert_failed(index, len);
        }

        self.buf.reserve(len, 1);
        unsafe { self.insert_unchecked(index, value) };
    }

    /// Inserts an element at position `index` within the dynamic array, shifting all elements after it to the right.
    ///
    /// # Errors
    ///
    /// Returns an error when the array needed to grow, but could not, in which case `value` is dropped and the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<(), TryReserveError> {
        let len = self.len;
        if index > len {
            insert_failed(index, len);
        }

        self.buf.try_reserve(len, 1)?;
        unsafe { self.insert_unchecked(index, value) };
        Ok(())
    }

    /// Inserts an element at the position of `cursor`, shifting the element the cursor points at, and all elements after it, to the right.
    ///
    /// The position of a cursor is its forward index, regardless of its direction,
    /// so inserting at [`DynArr::end`] appends, while inserting at [`DynArr::rbegin`] places the element before the last element.
    ///
    /// Returns a cursor to the inserted element, which is valid for the (possibly reallocated) storage.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not point into this dynamic array's current storage, or if its position is outside of `0..=len`.
    #[track_caller]
    pub fn insert_at<D: Direction>(&mut self, cursor: Cursor<T, D>, value: T) -> Cursor<T, D> {
        let index = cursor.checked_index(self.as_ptr(), self.len);
        self.insert(index, value);
        Cursor::new(self.buf.non_null(), index as isize)
    }

    unsafe fn insert_unchecked(&mut self, index: usize, value: T) {
        debug_assert!(index <= self.len && self.len < self.capacity());

        let p = self.buf.ptr().add(index);
        if index < self.len {
            // Shift everything over to make space, this overlaps, so copy from the back
            ptr::copy(p, p.add(1), self.len - index);
        }
        p.write(value);
        self.len += 1;
    }

    /// Removes and returns the element at position `index` within the dynamic array, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }

        unsafe {
            let p = self.buf.ptr().add(index);
            let value = p.read();
            // Only the elements after `index` are moved, which never reads past the last live element
            ptr::copy(p.add(1), p, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Removes and returns the element the cursor points at, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not point into this dynamic array's current storage, or if it does not point at a live element.
    #[track_caller]
    pub fn remove_at<D: Direction>(&mut self, cursor: Cursor<T, D>) -> T {
        let index = cursor.checked_index(self.as_ptr(), self.len);
        self.remove(index)
    }

    /// Removes an element from the dynamic array and returns it, the removed element is replaced by the last element.
    ///
    /// This does not preserve ordering, but is *O*(1).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn swap_remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("swap_remove index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }

        unsafe {
            let value = self.buf.ptr().add(index).read();
            let base = self.buf.ptr();
            ptr::copy(base.add(len - 1), base.add(index), 1);
            self.len = len - 1;
            value
        }
    }

    /// Returns a reference to the element the cursor points at.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not point into this dynamic array's current storage, or if it does not point at a live element.
    #[track_caller]
    pub fn at<D: Direction>(&self, cursor: Cursor<T, D>) -> &T {
        let index = cursor.checked_index(self.as_ptr(), self.len);
        &self[index]
    }

    /// Returns a mutable reference to the element the cursor points at.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not point into this dynamic array's current storage, or if it does not point at a live element.
    #[track_caller]
    pub fn at_mut<D: Direction>(&mut self, cursor: Cursor<T, D>) -> &mut T {
        let index = cursor.checked_index(self.as_ptr(), self.len);
        &mut self[index]
    }

    /// Cursor to the first element.
    #[inline]
    pub fn begin(&self) -> Iter<T> {
        Cursor::new(self.buf.non_null(), 0)
    }

    /// Cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Iter<T> {
        Cursor::new(self.buf.non_null(), self.len as isize)
    }

    /// Reverse cursor to the last element.
    #[inline]
    pub fn rbegin(&self) -> RevIter<T> {
        Cursor::new(self.buf.non_null(), self.len as isize - 1)
    }

    /// Reverse cursor one before the first element.
    #[inline]
    pub fn rend(&self) -> RevIter<T> {
        Cursor::new(self.buf.non_null(), -1)
    }

    /// Iterate over the elements between [`begin`](DynArr::begin) and [`end`](DynArr::end).
    pub fn walk(&self) -> Walk<'_, T, Forward> {
        // SAFETY: `begin..end` covers exactly the live elements, which are borrowed for the lifetime of the walk
        unsafe { Walk::new(self.begin(), self.end()) }
    }

    /// Iterate over the elements between [`rbegin`](DynArr::rbegin) and [`rend`](DynArr::rend).
    pub fn walk_rev(&self) -> Walk<'_, T, Reverse> {
        // SAFETY: `rbegin..rend` covers exactly the live elements, which are borrowed for the lifetime of the walk
        unsafe { Walk::new(self.rbegin(), self.rend()) }
    }

    /// Clears the dynamic array, dropping all values in index order.
    ///
    /// This has no effect on the allocated capacity.
    pub fn clear(&mut self) {
        let elems: *mut [T] = self.as_mut_slice();
        // The length is reset first, so a panicking destructor can't cause elements to be dropped twice
        self.len = 0;
        unsafe { ptr::drop_in_place(elems) };
    }

    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`.
    ///
    /// If `new_len` is greater than `len`, the array is extended by the difference, with each additional slot filled with the result of calling `f`.
    /// The return values from `f` will end up in the array in the order they have been generated.
    ///
    /// If `new_len` is less than `len`, the array is truncated.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn resize_with<F>(&mut self, new_len: usize, f: F) where
        F: FnMut() -> T
    {
        let len = self.len;
        if new_len > len {
            self.buf.reserve(len, new_len - len);
            self.extend_with(new_len - len, f);
        } else {
            self.truncate(new_len);
        }
    }

    /// Write `n` values generated by `f` after the last element, the capacity needs to be reserved up front.
    fn extend_with<F>(&mut self, n: usize, mut f: F) where
        F: FnMut() -> T
    {
        debug_assert!(self.capacity() - self.len >= n);

        let ptr = self.buf.ptr();
        // Keeps the already written elements alive when `f` panics
        let mut len = scopeguard::guard(self.len, |len| self.len = len);
        for _ in 0..n {
            unsafe { ptr.add(*len).write(f()) };
            *len += 1;
        }
    }

    /// Push all elements of an iterator, growing whenever the current capacity is exhausted.
    fn extend_desugared<I>(&mut self, mut iter: I) where
        I: Iterator<Item = T>
    {
        while let Some(element) = iter.next() {
            let len = self.len;
            if len == self.buf.capacity() {
                let (lower, _) = iter.size_hint();
                self.buf.reserve(len, lower.saturating_add(1));
            }
            unsafe { self.buf.ptr().add(len).write(element) };
            // Updated every step, so the elements written so far are dropped if the iterator panics
            self.len = len + 1;
        }
    }
}

impl<T: Default, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`.
    ///
    /// When growing, the capacity grows as decided by the reserve strategy and every new slot gets a default value.
    /// When shrinking, the removed elements are dropped from the back to the front.
    /// The capacity never shrinks.
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let mut arr = dynarr![9, 2, 3];
    /// arr.resize(5);
    /// assert_eq!(arr, [9, 2, 3, 0, 0]);
    /// arr.resize(1);
    /// assert_eq!(arr, [9]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    pub fn resize(&mut self, new_len: usize) {
        self.resize_with(new_len, T::default);
    }

    /// The same as [`resize`](DynArr::resize), but returns on errors instead of panicking or aborting.
    ///
    /// # Errors
    ///
    /// If the array could not grow, an error is returned and the dynamic array is left unchanged.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), TryReserveError> {
        let len = self.len;
        if new_len > len {
            self.buf.try_reserve(len, new_len - len)?;
            self.extend_with(new_len - len, T::default);
        } else {
            self.truncate(new_len);
        }
        Ok(())
    }
}

impl<T: Clone, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Resizes the dynamic array in-place so that `len` is equal to `new_len`, filling new slots with clones of `value`.
    pub fn resize_fill(&mut self, new_len: usize, value: T) {
        self.resize_with(new_len, || value.clone());
    }

    /// Clones and appends all elements in a slice to the dynamic array.
    pub fn extend_from_slice(&mut self, other: &[T]) {
        self.reserve(other.len());
        self.extend_desugared(other.iter().cloned());
    }
}

impl<T: Copy, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Clears the dynamic array by only resetting its length.
    ///
    /// Only available for `Copy` elements, as those never own resources that would need to be released.
    /// For any other element type, use [`clear`](DynArr::clear).
    #[inline]
    pub fn hard_clear(&mut self) {
        self.len = 0;
    }
}

impl<T: PartialEq, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Find the first element equal to `value`.
    ///
    /// Returns a cursor to the element, or [`end`](DynArr::end) if no element is equal to `value`.
    pub fn find(&self, value: &T) -> Iter<T> {
        let mut walk = self.walk();
        loop {
            let cursor = walk.cursor();
            match walk.next() {
                Some(elem) if elem == value => return cursor,
                Some(_) => {},
                None => return cursor,
            }
        }
    }

    /// Removes and returns the first element equal to `value`, or `None` if there is no such element.
    pub fn remove_item(&mut self, value: &T) -> Option<T> {
        let index = self.iter().position(|elem| elem == value)?;
        Some(self.remove(index))
    }
}

#[cold]
#[track_caller]
fn insert_failed(index: usize, len: usize) -> ! {
    panic!("insertion index (is {index}) should be <= len (is {len})");
}

//--------------------------------------------------------------

/// Creates a [`DynArr`] containing the arguments.
///
/// `dynarr!` allows `DynArr`s to be defined with the same syntax as array expressions.
///
/// - Create a `DynArr` containing a given list of elements:
///
/// ```
/// # use kiln_common::prelude::*;
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr[0], 1);
/// assert_eq!(arr.capacity(), 3);
/// ```
///
/// - Create a `DynArr` from a given element and size, the element needs to implement [`Clone`]:
///
/// ```
/// # use kiln_common::prelude::*;
/// let arr = dynarr![1; 3];
/// assert_eq!(arr, [1, 1, 1]);
/// ```
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArr::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::DynArr::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {{
        let mut arr = $crate::collections::DynArr::with_capacity($crate::base::count_exprs!($($x),+));
        $( arr.push($x); )+
        arr
    }};
}

//--------------------------------------------------------------

impl<T, A: Allocator, R: ReserveStrategy> Deref for DynArr<T, A, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }
}

impl<T, A: Allocator, R: ReserveStrategy> DerefMut for DynArr<T, A, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }
}

impl<T: Clone, A: Allocator + Clone, R: ReserveStrategy> Clone for DynArr<T, A, R> {
    /// Clones the elements into a new allocation with the same capacity.
    fn clone(&self) -> Self {
        let mut arr = Self { buf: RawArray::with_capacity_in(self.capacity(), self.allocator().clone()), len: 0 };
        arr.extend_desugared(self.iter().cloned());
        arr
    }
}

impl<T: Hash, A: Allocator, R: ReserveStrategy> Hash for DynArr<T, A, R> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator, R: ReserveStrategy> Index<I> for DynArr<T, A, R> {
    type Output = I::Output;

    #[inline]
    #[track_caller]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator, R: ReserveStrategy> IndexMut<I> for DynArr<T, A, R> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T, A: Allocator + Default, R: ReserveStrategy> FromIterator<T> for DynArr<T, A, R> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::default();
        arr.extend(iter);
        arr
    }
}

impl<T, A: Allocator, R: ReserveStrategy> IntoIterator for DynArr<T, A, R> {
    type Item = T;
    type IntoIter = IntoIter<T, A, R>;

    /// Creates a consuming iterator, that is, one that moves each value out of the dynamic array (from start to end).
    fn into_iter(self) -> Self::IntoIter {
        let me = ManuallyDrop::new(self);
        // SAFETY: `me` is never used or dropped again, so the buffer is moved into the iterator exactly once
        let buf = unsafe { ptr::read(&me.buf) };
        IntoIter::new(buf, me.len)
    }
}

impl<'a, T, A: Allocator, R: ReserveStrategy> IntoIterator for &'a DynArr<T, A, R> {
    type Item = &'a T;
    type IntoIter = Walk<'a, T, Forward>;

    fn into_iter(self) -> Self::IntoIter {
        self.walk()
    }
}

impl<'a, T, A: Allocator, R: ReserveStrategy> IntoIterator for &'a mut DynArr<T, A, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Extend<T> for DynArr<T, A, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve(lower);
        self.extend_desugared(iter);
    }
}

impl<'a, T: Copy + 'a, A: Allocator, R: ReserveStrategy> Extend<&'a T> for DynArr<T, A, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl_slice_partial_eq_generic!([A0: Allocator, A1: Allocator, R0: ReserveStrategy, R1: ReserveStrategy] DynArr<T, A0, R0>, DynArr<U, A1, R1>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, &[U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, &mut [U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] &[T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] &mut [T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, [U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] [T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy, const N: usize] DynArr<T, A, R>, [U; N]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy, const N: usize] [T; N], DynArr<U, A, R>);

impl<T: PartialOrd, A0: Allocator, A1: Allocator, R0: ReserveStrategy, R1: ReserveStrategy> PartialOrd<DynArr<T, A1, R1>> for DynArr<T, A0, R0> {
    #[inline]
    fn partial_cmp(&self, other: &DynArr<T, A1, R1>) -> Option<Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq, A: Allocator, R: ReserveStrategy> Eq for DynArr<T, A, R> {}

impl<T: Ord, A: Allocator, R: ReserveStrategy> Ord for DynArr<T, A, R> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Drop for DynArr<T, A, R> {
    fn drop(&mut self) {
        // RawArray handles the deallocation
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.ptr(), self.len)) }
    }
}

impl<T, A: Allocator + Default, R: ReserveStrategy> Default for DynArr<T, A, R> {
    /// Creates an empty `DynArr<T, A, R>`, which will not allocate until elements are pushed.
    fn default() -> Self {
        Self { buf: RawArray::new_in(A::default()), len: 0 }
    }
}

impl<T: fmt::Debug, A: Allocator, R: ReserveStrategy> fmt::Debug for DynArr<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T, A: Allocator, R: ReserveStrategy> AsRef<[T]> for DynArr<T, A, R> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: Allocator, R: ReserveStrategy> AsMut<[T]> for DynArr<T, A, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone> From<&[T]> for DynArr<T> {
    /// Allocate a `DynArr<T>` and fill it by cloning `s`'s items.
    fn from(s: &[T]) -> Self {
        let mut arr = Self::with_capacity(s.len());
        arr.extend_from_slice(s);
        arr
    }
}

impl<T, const N: usize> From<[T; N]> for DynArr<T> {
    /// Allocate a `DynArr<T>` and move `arr`'s items into it.
    fn from(arr: [T; N]) -> Self {
        let mut dynarr = Self::with_capacity(N);
        dynarr.extend_desugared(arr.into_iter());
        dynarr
    }
}
