use core::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering},
};
use std::sync::Arc;

use crate::alloc::{Allocator, primitives::Mallocator};

/// Allocation statistics collected by a [`TrackingAllocator`]
///
/// The statistics are shared between all clones of the allocator they were created for.
#[derive(Default, Debug)]
pub struct AllocStats {
    allocs:     AtomicUsize,
    deallocs:   AtomicUsize,
    failed:     AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl AllocStats {
    /// Number of successful allocations
    pub fn num_allocs(&self) -> usize {
        self.allocs.load(Ordering::Relaxed)
    }

    /// Number of deallocations
    pub fn num_deallocs(&self) -> usize {
        self.deallocs.load(Ordering::Relaxed)
    }

    /// Number of allocations that are currently not freed
    pub fn num_live_allocs(&self) -> usize {
        self.num_allocs() - self.num_deallocs()
    }

    /// Number of allocation requests the underlying allocator refused
    pub fn num_failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Number of bytes currently allocated
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// Highest number of bytes that were allocated at the same time
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }

    fn on_alloc(&self, layout: Layout) {
        self.allocs.fetch_add(1, Ordering::Relaxed);
        let live = self.live_bytes.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
        self.peak_bytes.fetch_max(live, Ordering::Relaxed);
    }

    fn on_dealloc(&self, layout: Layout) {
        self.deallocs.fetch_add(1, Ordering::Relaxed);
        self.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
    }
}

/// Allocator wrapping another allocator, recording how it is used.
pub struct TrackingAllocator<A: Allocator = Mallocator> {
    alloc: A,
    stats: Arc<AllocStats>,
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Create a tracking allocator with its own statistics
    pub fn new(alloc: A) -> Self {
        Self { alloc, stats: Arc::default() }
    }

    /// Create a tracking allocator reporting into existing statistics
    pub fn with_stats(alloc: A, stats: Arc<AllocStats>) -> Self {
        Self { alloc, stats }
    }

    /// Get the statistics of the allocator
    pub fn stats(&self) -> &Arc<AllocStats> {
        &self.stats
    }

    /// Get the wrapped allocator
    pub fn inner(&self) -> &A {
        &self.alloc
    }
}

impl<A: Allocator + Clone> Clone for TrackingAllocator<A> {
    fn clone(&self) -> Self {
        Self { alloc: self.alloc.clone(), stats: self.stats.clone() }
    }
}

impl<A: Allocator + Default> Default for TrackingAllocator<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = self.alloc.alloc(layout);
        match ptr {
            Some(_) => self.stats.on_alloc(layout),
            None => { self.stats.failed.fetch_add(1, Ordering::Relaxed); },
        }
        ptr
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        self.stats.on_dealloc(layout);
        self.alloc.dealloc(ptr, layout);
    }

    fn owns(&self, ptr: NonNull<u8>, layout: Layout) -> bool {
        self.alloc.owns(ptr, layout)
    }
}
