mod alloc;

pub mod primitives;
pub mod composable;

pub use alloc::*;
