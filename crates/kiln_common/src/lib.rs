//! Common containers and the allocation interface they are built on.
//!
//! The main type is [`collections::DynArr`], a growable contiguous array with an explicit growth policy,
//! together with the [`collections::Cursor`] positions used to address elements in it and in [`collections::FixedArr`].

pub mod alloc;
pub mod collections;
pub mod prelude;

#[doc(hidden)]
pub use kiln_base as base;
