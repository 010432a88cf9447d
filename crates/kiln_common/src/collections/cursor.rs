use core::{
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    ops::{Add, AddAssign, Sub, SubAssign},
    ptr::NonNull,
};

use static_assertions::assert_eq_size;

/// Direction in which a [`Cursor`] moves when it is incremented.
pub trait Direction: Copy + Default + fmt::Debug + 'static {
    /// Change in the logical offset when the cursor is incremented
    const STEP: isize;

    /// Direction walking the other way
    type Opposite: Direction<Opposite = Self>;
}

/// Walk from the first element towards the last element
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Forward;

impl Direction for Forward {
    const STEP: isize = 1;
    type Opposite = Reverse;
}

/// Walk from the last element towards the first element
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Reverse;

impl Direction for Reverse {
    const STEP: isize = -1;
    type Opposite = Forward;
}

/// Position inside of the contiguous storage of a container.
/// 
/// A cursor is a start pointer together with a signed logical offset, the offset is only applied when the cursor is dereferenced.
/// This means that a cursor can point one before the first element, which a reverse cursor uses as its end.
/// 
/// Cursors don't borrow the container they were created from, so they are invalidated by any operation that reallocates or shifts its elements.
/// Containers compare the start pointer of a cursor passed to them against their current allocation.
/// This catches cursors from other containers and most stale cursors, but not a cursor into a block whose address was handed out again after reallocation.
/// Reading through a cursor is `unsafe`.
/// 
/// Arithmetic follows the direction of the cursor: incrementing a [`Reverse`] cursor moves it towards the start of the storage.
pub struct Cursor<T, D: Direction = Forward> {
    base:     NonNull<T>,
    offset:   isize,
    _phantom: PhantomData<D>,
}

/// Cursor walking from the first element towards the last element
pub type Iter<T> = Cursor<T, Forward>;
/// Cursor walking from the last element towards the first element
pub type RevIter<T> = Cursor<T, Reverse>;

assert_eq_size!(Cursor<u64, Forward>, [usize; 2]);
assert_eq_size!(Cursor<(), Reverse>, [usize; 2]);

impl<T, D: Direction> Cursor<T, D> {
    #[inline]
    pub(crate) const fn new(base: NonNull<T>, offset: isize) -> Self {
        Self { base, offset, _phantom: PhantomData }
    }

    /// Get the start of the storage the cursor points into.
    #[inline]
    pub fn base(&self) -> *const T {
        self.base.as_ptr()
    }

    /// Get the logical index the cursor points at, counted from the start of the storage.
    /// 
    /// The end position of a reverse cursor has an offset of `-1`.
    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Get the pointer to the element the cursor points at.
    /// 
    /// The pointer is only valid to dereference when the cursor points at a live element.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.base.as_ptr().wrapping_offset(self.offset)
    }

    /// Get a reference to the element the cursor points at.
    /// 
    /// # Safety
    /// 
    /// - The cursor must point at a live element, e.g. not at the end position
    /// - The container the cursor was created from may not have been reallocated or had its elements shifted since
    /// - The returned reference may not outlive the element
    #[inline]
    pub unsafe fn get<'a>(&self) -> &'a T {
        &*self.as_ptr()
    }

    /// Get a mutable reference to the element the cursor points at.
    /// 
    /// # Safety
    /// 
    /// Same requirements as [`Cursor::get`], additionally no other reference to the element may be alive while the returned reference is used.
    #[inline]
    pub unsafe fn get_mut<'a>(&self) -> &'a mut T {
        &mut *self.as_ptr()
    }

    /// Move the cursor one element forward in its direction, returning the moved cursor.
    #[inline]
    pub fn inc(&mut self) -> &mut Self {
        self.offset += D::STEP;
        self
    }

    /// Move the cursor one element backward in its direction, returning the moved cursor.
    #[inline]
    pub fn dec(&mut self) -> &mut Self {
        self.offset -= D::STEP;
        self
    }

    /// Move the cursor one element forward in its direction, returning the cursor from before the move.
    #[inline]
    pub fn post_inc(&mut self) -> Self {
        let old = *self;
        self.inc();
        old
    }

    /// Move the cursor one element backward in its direction, returning the cursor from before the move.
    #[inline]
    pub fn post_dec(&mut self) -> Self {
        let old = *self;
        self.dec();
        old
    }

    /// Get a cursor at the same position walking in the opposite direction.
    #[inline]
    pub fn reversed(self) -> Cursor<T, D::Opposite> {
        Cursor::new(self.base, self.offset)
    }

    /// Get the index of the cursor inside of a container starting at `base`, where the index may be at most `max_index`.
    #[track_caller]
    pub(crate) fn checked_index(&self, base: *const T, max_index: usize) -> usize {
        assert!(self.base() == base, "cursor does not belong to this container");
        match usize::try_from(self.offset) {
            Ok(index) if index <= max_index => index,
            _ => panic!("cursor offset (is {}) should be in 0..={max_index}", self.offset),
        }
    }
}

impl<T, D: Direction> Clone for Cursor<T, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, D: Direction> Copy for Cursor<T, D> {}

impl<T, D: Direction> PartialEq for Cursor<T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.offset == other.offset
    }
}

impl<T, D: Direction> Eq for Cursor<T, D> {}

impl<T, D: Direction> fmt::Debug for Cursor<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("base", &self.base)
            .field("offset", &self.offset)
            .field("direction", &D::default())
            .finish()
    }
}

impl<T, D: Direction> Add<isize> for Cursor<T, D> {
    type Output = Self;

    fn add(mut self, rhs: isize) -> Self::Output {
        self += rhs;
        self
    }
}

impl<T, D: Direction> Sub<isize> for Cursor<T, D> {
    type Output = Self;

    fn sub(mut self, rhs: isize) -> Self::Output {
        self -= rhs;
        self
    }
}

impl<T, D: Direction> AddAssign<isize> for Cursor<T, D> {
    fn add_assign(&mut self, rhs: isize) {
        self.offset += rhs * D::STEP;
    }
}

impl<T, D: Direction> SubAssign<isize> for Cursor<T, D> {
    fn sub_assign(&mut self, rhs: isize) {
        self.offset -= rhs * D::STEP;
    }
}

/// Distance between 2 cursors in the same storage, measured in the direction of the cursors.
///
/// For [`Reverse`] cursors this is the negated pointer difference, so `rend() - rbegin()` is the length, just like `end() - begin()`.
impl<T, D: Direction> Sub for Cursor<T, D> {
    type Output = isize;

    #[track_caller]
    fn sub(self, rhs: Self) -> Self::Output {
        debug_assert!(self.base == rhs.base, "cursors point into different storage");
        (self.offset - rhs.offset) * D::STEP
    }
}

//--------------------------------------------------------------

/// Iterator over the elements between 2 cursors, borrowing the container they were created from.
pub struct Walk<'a, T, D: Direction> {
    front:    Cursor<T, D>,
    back:     Cursor<T, D>,
    _phantom: PhantomData<&'a T>,
}

impl<'a, T, D: Direction> Walk<'a, T, D> {
    /// # Safety
    /// 
    /// `front` and `back` must point into the same storage, with every element in `front..back` being live for `'a`.
    pub(crate) unsafe fn new(front: Cursor<T, D>, back: Cursor<T, D>) -> Self {
        debug_assert!(back - front >= 0);
        Self { front, back, _phantom: PhantomData }
    }

    /// Get the cursor of the next element that will be returned.
    pub fn cursor(&self) -> Cursor<T, D> {
        self.front
    }
}

impl<'a, T, D: Direction> Clone for Walk<'a, T, D> {
    fn clone(&self) -> Self {
        Self { front: self.front, back: self.back, _phantom: PhantomData }
    }
}

impl<'a, T: fmt::Debug, D: Direction> fmt::Debug for Walk<'a, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T, D: Direction> Iterator for Walk<'a, T, D> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            None
        } else {
            // SAFETY: `front` is in `front..back`, which only contains live elements
            Some(unsafe { self.front.post_inc().get() })
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = (self.back - self.front) as usize;
        (len, Some(len))
    }

    fn count(self) -> usize {
        self.len()
    }
}

impl<'a, T, D: Direction> DoubleEndedIterator for Walk<'a, T, D> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            None
        } else {
            // SAFETY: after moving back, `back` is the last element in `front..back`
            Some(unsafe { self.back.dec().get() })
        }
    }
}

impl<'a, T, D: Direction> ExactSizeIterator for Walk<'a, T, D> {}
impl<'a, T, D: Direction> FusedIterator for Walk<'a, T, D> {}

unsafe impl<'a, T: Sync, D: Direction> Send for Walk<'a, T, D> {}
unsafe impl<'a, T: Sync, D: Direction> Sync for Walk<'a, T, D> {}
