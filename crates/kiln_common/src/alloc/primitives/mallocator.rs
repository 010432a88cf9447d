use core::{alloc::Layout, ptr::NonNull};

use cfg_if::cfg_if;

use crate::alloc::Allocator;

/// Allocator calling directly to the system allocator
///
/// Mallocator uses rust's global allocator to retrieve memory
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Mallocator;

impl Allocator for Mallocator {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() != 0, "Mallocator cannot allocate zero-sized layouts");
        NonNull::new(std::alloc::alloc(layout))
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        cfg_if! {
            if #[cfg(debug_assertions)] {
                // Poison freed memory in debug builds, so reads through stale cursors stand out
                ptr.as_ptr().write_bytes(0xDD, layout.size());
            }
        }
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }

    fn owns(&self, _ptr: NonNull<u8>, _layout: Layout) -> bool {
        // We have no real way of knowing that we allocated this, so we'll just assume that we allocated it
        true
    }
}
