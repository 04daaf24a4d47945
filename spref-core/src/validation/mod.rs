//! Structural validation for compressed sparse storage
//!
//! This module contains pure validation functions with no allocation.
//! They check the invariants that aliasing and lookup rely on.

pub mod bounds;
pub mod compressed;

pub use bounds::{check_position, checked_outer_end};
pub use compressed::{validate_parts, validate_slice};
