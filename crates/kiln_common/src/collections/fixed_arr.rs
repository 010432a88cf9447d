use core::{
    ops::{Deref, DerefMut},
    ptr::NonNull,
};

use super::{Cursor, Direction, Forward, Iter, Reverse, RevIter, Walk};

/// An array with a capacity that is fixed at compile time.
///
/// `FixedArr` is a thin wrapper around `[T; N]`, that offers the same cursor interface as [`DynArr`](super::DynArr).
/// All `N` elements are always live, so the length and capacity are both `N`.
///
/// ```
/// # use kiln_common::prelude::*;
/// let arr = FixedArr::from([1, 2, 3]);
/// assert_eq!(arr.len(), 3);
/// assert_eq!(*arr.at(arr.rbegin()), 3);
/// assert!(arr.walk_rev().copied().eq([3, 2, 1]));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FixedArr<T, const N: usize> {
    data: [T; N],
}

impl<T: Default, const N: usize> FixedArr<T, N> {
    /// Create a fixed array with every element set to its default value.
    pub fn new() -> Self {
        Self { data: core::array::from_fn(|_| T::default()) }
    }
}

impl<T, const N: usize> FixedArr<T, N> {
    /// Number of elements in the array, always `N`.
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Number of elements the array can hold, always `N`.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Move the elements out of the fixed array.
    #[inline]
    pub fn into_inner(self) -> [T; N] {
        self.data
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    fn base(&self) -> NonNull<T> {
        NonNull::from(&self.data).cast()
    }

    /// Returns a reference to the element the cursor points at.
    ///
    /// # Panics
    ///
    /// Panics if the cursor was not created from this array, or if it does not point at an element.
    #[track_caller]
    pub fn at<D: Direction>(&self, cursor: Cursor<T, D>) -> &T {
        let index = cursor.checked_index(self.data.as_ptr(), N);
        &self.data[index]
    }

    /// Returns a mutable reference to the element the cursor points at.
    ///
    /// # Panics
    ///
    /// Panics if the cursor was not created from this array, or if it does not point at an element.
    #[track_caller]
    pub fn at_mut<D: Direction>(&mut self, cursor: Cursor<T, D>) -> &mut T {
        let index = cursor.checked_index(self.data.as_ptr(), N);
        &mut self.data[index]
    }

    /// Cursor to the first element.
    #[inline]
    pub fn begin(&self) -> Iter<T> {
        Cursor::new(self.base(), 0)
    }

    /// Cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Iter<T> {
        Cursor::new(self.base(), N as isize)
    }

    /// Reverse cursor to the last element.
    #[inline]
    pub fn rbegin(&self) -> RevIter<T> {
        Cursor::new(self.base(), N as isize - 1)
    }

    /// Reverse cursor one before the first element.
    #[inline]
    pub fn rend(&self) -> RevIter<T> {
        Cursor::new(self.base(), -1)
    }

    pub fn walk(&self) -> Walk<'_, T, Forward> {
        // SAFETY: `begin..end` covers all `N` elements, which are borrowed for the lifetime of the walk
        unsafe { Walk::new(self.begin(), self.end()) }
    }

    pub fn walk_rev(&self) -> Walk<'_, T, Reverse> {
        // SAFETY: `rbegin..rend` covers all `N` elements, which are borrowed for the lifetime of the walk
        unsafe { Walk::new(self.rbegin(), self.rend()) }
    }
}

impl<T: Default, const N: usize> Default for FixedArr<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> From<[T; N]> for FixedArr<T, N> {
    fn from(data: [T; N]) -> Self {
        Self { data }
    }
}

impl<T, const N: usize> Deref for FixedArr<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T, const N: usize> DerefMut for FixedArr<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl<T, I: core::slice::SliceIndex<[T]>, const N: usize> core::ops::Index<I> for FixedArr<T, N> {
    type Output = I::Output;

    #[inline]
    #[track_caller]
    fn index(&self, index: I) -> &Self::Output {
        &self.data[index]
    }
}

impl<T, I: core::slice::SliceIndex<[T]>, const N: usize> core::ops::IndexMut<I> for FixedArr<T, N> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a FixedArr<T, N> {
    type Item = &'a T;
    type IntoIter = Walk<'a, T, Forward>;

    fn into_iter(self) -> Self::IntoIter {
        self.walk()
    }
}

impl<T, const N: usize> IntoIterator for FixedArr<T, N> {
    type Item = T;
    type IntoIter = core::array::IntoIter<T, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}
