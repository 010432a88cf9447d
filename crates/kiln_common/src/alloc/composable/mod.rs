#[cfg(feature = "memory_tracking")]
mod tracking_allocator;
mod budget_allocator;

#[cfg(feature = "memory_tracking")]
pub use tracking_allocator::*;
pub use budget_allocator::*;
