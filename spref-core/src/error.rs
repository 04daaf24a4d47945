//! Error types for sparse reference operations

use crate::layout::StorageOrder;

/// Errors that can occur while binding or validating sparse storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    /// Source storage order cannot be aliased by a mutable reference
    #[error("storage layout does not match: source is {actual}, reference requires {required}")]
    LayoutMismatch {
        actual: StorageOrder,
        required: StorageOrder,
    },
    /// Mutable reference requested on a read-only expression
    #[error("expression is not an lvalue, it is read only")]
    NotAnLvalue,
    /// Outer offset array has the wrong length
    #[error("outer offsets must have {expected} entries, got {got}")]
    OuterOffsetsLength { expected: usize, got: usize },
    /// Outer offsets decrease between two outer slices
    #[error("outer offsets decrease at outer index {outer}")]
    DecreasingOffsets { outer: usize },
    /// Inner index and value arrays have different lengths
    #[error("inner index array has {indices} entries but value array has {values}")]
    ArrayLengthMismatch { indices: usize, values: usize },
    /// Inner indices of an outer slice are not strictly ascending
    #[error("inner indices of outer slice {outer} are not strictly ascending")]
    UnsortedInner { outer: usize },
    /// Inner index beyond the inner dimension
    #[error("inner index {index} in outer slice {outer} exceeds inner size {bound}")]
    InnerIndexOutOfBounds {
        outer: usize,
        index: usize,
        bound: usize,
    },
    /// Per-outer nonzero counts have the wrong length
    #[error("inner nonzero counts must have {expected} entries, got {got}")]
    InnerNonZerosLength { expected: usize, got: usize },
    /// An outer slice claims more entries than it has room for
    #[error("outer slice {outer} overflows its storage")]
    SliceOverflow { outer: usize },
    /// Vector layout used with a shape that is not a single row or column
    #[error("shape {rows}x{cols} is not a vector")]
    NotAVector { rows: usize, cols: usize },
    /// Coordinate outside the matrix shape
    #[error("position ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

impl RefError {
    /// Returns true for the two errors raised by binding contracts
    pub const fn is_binding_error(&self) -> bool {
        matches!(self, RefError::LayoutMismatch { .. } | RefError::NotAnLvalue)
    }
}

/// Result type for sparse reference operations
pub type Result<T> = core::result::Result<T, RefError>;
