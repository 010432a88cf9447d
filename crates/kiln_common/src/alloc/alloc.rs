use core::{alloc::Layout, ptr::NonNull};

/// Allocator/Arena that can provide access to heap memory for the containers
///
/// Unlike [`core::alloc::GlobalAlloc`], failing to allocate is reported as `None`, so containers can surface the failure to their caller.
pub trait Allocator {
    /// Allocate memory from an allocator/arena
    ///
    /// # Return
    ///
    /// If no memory could be allocated, `None` should be returned.
    ///
    /// # Safety
    ///
    /// `layout` must have a non-zero size.
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>>;

    /// Deallocate an allocation
    ///
    /// # Safety
    ///
    /// - `ptr` must have been allocated by this allocator, or a clone of it
    /// - `layout` must be the same layout that was used to allocate `ptr`
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Check if the allocator owns the allocation
    fn owns(&self, ptr: NonNull<u8>, layout: Layout) -> bool;
}
