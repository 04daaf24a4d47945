//! Source-side protocol for binding sparse expressions
//!
//! A sparse expression is anything that can produce the nonzeros of a
//! matrix. It publishes its [`Capabilities`] as a constant so the binding
//! decision is made per type, never per value. Expressions with compressed
//! access also hand out their arrays so they can be aliased in place.

use super::element::Element;
use super::matrix::{CompressedParts, CompressedPartsMut};
use crate::layout::{Capabilities, StorageOrder};

/// A sparse matrix expression that can be bound by a reference
pub trait SparseExpr {
    /// The value type produced by this expression
    type Scalar: Element;

    /// Static capability flags of this expression type
    const CAPS: Capabilities;

    /// Number of rows
    fn rows(&self) -> usize;

    /// Number of columns
    fn cols(&self) -> usize;

    /// Number of entries `for_each_nonzero` will visit (an upper bound when
    /// the expression may emit duplicate coordinates)
    fn nonzeros(&self) -> usize;

    /// Visit every entry as `(row, col, value)`
    ///
    /// The visiting order is unspecified. Duplicate coordinates are allowed
    /// and are summed when the expression is materialized.
    fn for_each_nonzero<F: FnMut(usize, usize, Self::Scalar)>(&self, f: F);

    /// Compressed arrays, available when `CAPS.compressed` is set
    fn compressed_parts(&self) -> Option<CompressedParts<'_, Self::Scalar>> {
        None
    }

    /// Storage order of the expression
    fn storage_order(&self) -> StorageOrder {
        Self::CAPS.order()
    }
}

/// A sparse expression whose storage can be written through
///
/// This bound is what makes a mutable binding possible at all: types that
/// do not implement it are rejected at compile time.
pub trait SparseExprMut: SparseExpr {
    /// Compressed arrays with writable values
    fn compressed_parts_mut(&mut self) -> CompressedPartsMut<'_, Self::Scalar>;
}
