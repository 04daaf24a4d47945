//! Abstract interfaces for sparse references
//!
//! This module defines the trait abstractions shared by every store,
//! view and reference type. Traits are pure interfaces.

pub mod element;
pub mod expr;
pub mod matrix;

pub use element::Element;
pub use expr::{SparseExpr, SparseExprMut};
pub use matrix::{
    outer_range_of, CompressedParts, CompressedPartsMut, InnerIter, InnerIterMut, ReadableSparse,
    WritableSparse,
};
