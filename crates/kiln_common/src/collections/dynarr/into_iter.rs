use core::{
    fmt,
    iter::FusedIterator,
    ptr,
    slice,
};

use crate::{
    alloc::{Allocator, primitives::Mallocator},
    collections::{imp::array::RawArray, DoublingReserveStrategy, ReserveStrategy},
};

/// An iterator that moves out of a dynamic array.
///
/// This `struct` is created by the `into_iter` method on [`DynArr`](super::DynArr) (provided by the [`IntoIterator`] trait).
///
/// The elements that were not yielded are dropped together with the iterator.
pub struct IntoIter<T, A: Allocator = Mallocator, R: ReserveStrategy = DoublingReserveStrategy> {
    buf:   RawArray<T, A, R>,
    /// Index of the next element returned from the front
    start: usize,
    /// Index one past the next element returned from the back
    end:   usize,
}

impl<T, A: Allocator, R: ReserveStrategy> IntoIter<T, A, R> {
    pub(super) fn new(buf: RawArray<T, A, R>, len: usize) -> Self {
        Self { buf, start: 0, end: len }
    }

    /// Returns the remaining items of this iterator as a slice.
    ///
    /// ```
    /// # use kiln_common::prelude::*;
    /// let arr = dynarr!['a', 'b', 'c'];
    /// let mut into_iter = arr.into_iter();
    /// assert_eq!(into_iter.as_slice(), &['a', 'b', 'c']);
    /// let _ = into_iter.next().unwrap();
    /// assert_eq!(into_iter.as_slice(), &['b', 'c']);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items of this iterator as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buf.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns a reference to the underlying allocator.
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }
}

impl<T: fmt::Debug, A: Allocator, R: ReserveStrategy> fmt::Debug for IntoIter<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Iterator for IntoIter<T, A, R> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            None
        } else {
            let index = self.start;
            self.start += 1;
            Some(unsafe { self.buf.ptr().add(index).read() })
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> DoubleEndedIterator for IntoIter<T, A, R> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start == self.end {
            None
        } else {
            self.end -= 1;
            Some(unsafe { self.buf.ptr().add(self.end).read() })
        }
    }
}

impl<T, A: Allocator, R: ReserveStrategy> ExactSizeIterator for IntoIter<T, A, R> {}
impl<T, A: Allocator, R: ReserveStrategy> FusedIterator for IntoIter<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> Drop for IntoIter<T, A, R> {
    fn drop(&mut self) {
        let remaining: *mut [T] = self.as_mut_slice();
        // Nothing can be yielded after this, even when a destructor panics
        self.start = self.end;
        // `buf` frees the memory once the remaining elements are dropped
        unsafe { ptr::drop_in_place(remaining) };
    }
}
