//! Library defining cross library utilities that can be implemented using `#![no_std]`
#![no_std]

// Macros are exported at the crate root
mod helper_macros;
