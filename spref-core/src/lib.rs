#![no_std]

//! spref core - layout, capability and validation definitions
//!
//! This crate provides the pieces of sparse reference binding that need no
//! allocation: storage layouts, the compatibility predicate, the error type,
//! and the read/write and source-expression traits.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod layout;
pub mod traits;
pub mod validation;

pub use error::*;
pub use layout::*;
pub use traits::*;
pub use validation::{check_position, validate_parts, validate_slice};
