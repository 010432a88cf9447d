use core::{alloc::Layout, ptr::NonNull};

use crate::alloc::{Allocator, primitives::Mallocator};

/// Allocator wrapping another allocator, refusing any request that would exceed a fixed number of live bytes.
///
/// Useful to make out-of-memory conditions reproducible.
pub struct BudgetAllocator<A: Allocator = Mallocator> {
    alloc:  A,
    budget: usize,
    used:   usize,
}

impl<A: Allocator> BudgetAllocator<A> {
    /// Create a new budget allocator that can hand out at most `budget` live bytes
    pub fn new(alloc: A, budget: usize) -> Self {
        Self { alloc, budget, used: 0 }
    }

    /// Change the budget, this does not affect memory that is currently allocated
    pub fn set_budget(&mut self, budget: usize) {
        self.budget = budget;
    }

    /// Get the budget of the allocator
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Get the number of live bytes allocated from this allocator
    pub fn used(&self) -> usize {
        self.used
    }

    /// Get the number of bytes that can still be allocated
    pub fn remaining(&self) -> usize {
        self.budget.saturating_sub(self.used)
    }
}

impl<A: Allocator + Clone> Clone for BudgetAllocator<A> {
    /// The clone gets the same budget, but does not account for memory allocated by the original
    fn clone(&self) -> Self {
        Self::new(self.alloc.clone(), self.budget)
    }
}

impl<A: Allocator> Allocator for BudgetAllocator<A> {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() > self.remaining() {
            return None;
        }

        let ptr = self.alloc.alloc(layout)?;
        self.used += layout.size();
        Some(ptr)
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        self.used = self.used.saturating_sub(layout.size());
        self.alloc.dealloc(ptr, layout);
    }

    fn owns(&self, ptr: NonNull<u8>, layout: Layout) -> bool {
        self.alloc.owns(ptr, layout)
    }
}

#[cfg(test)]
mod tests {
    use core::alloc::Layout;

    use crate::alloc::{*, primitives::*};
    use super::*;

    #[test]
    fn refuses_over_budget() {
        let mut alloc = BudgetAllocator::new(Mallocator, 64);
        let layout = Layout::array::<u8>(48).unwrap();

        unsafe {
            let ptr = alloc.alloc(layout).unwrap();
            assert_eq!(alloc.remaining(), 16);
            assert!(alloc.alloc(layout).is_none());

            alloc.dealloc(ptr, layout);
            assert_eq!(alloc.used(), 0);

            let ptr = alloc.alloc(layout).unwrap();
            alloc.dealloc(ptr, layout);
        }
    }

    #[test]
    fn budget_can_change() {
        let mut alloc = BudgetAllocator::new(Mallocator, 0);
        let layout = Layout::new::<u64>();

        unsafe {
            assert!(alloc.alloc(layout).is_none());
            alloc.set_budget(8);
            let ptr = alloc.alloc(layout).unwrap();
            alloc.dealloc(ptr, layout);
        }
        assert_eq!(alloc.budget(), 8);
    }
}
