//! Storage layouts and the compatibility predicate
//!
//! A layout fixes two things about compressed storage: which dimension is the
//! outer one (major order) and whether the shape is a single row or column.
//! Both are known at compile time through the [`Layout`] marker types, and
//! every sparse source publishes its own [`Capabilities`] as an associated
//! constant so the aliasing decision can be made without looking at data.

use crate::error::RefError;

/// Runtime storage order of compressed arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StorageOrder {
    /// Outer dimension iterates rows (CSR)
    RowMajor,
    /// Outer dimension iterates columns (CSC)
    ColMajor,
}

impl StorageOrder {
    /// Build from a row-major flag
    pub const fn from_row_major(row_major: bool) -> Self {
        if row_major {
            StorageOrder::RowMajor
        } else {
            StorageOrder::ColMajor
        }
    }

    /// Returns true for row-major storage
    pub const fn is_row_major(self) -> bool {
        matches!(self, StorageOrder::RowMajor)
    }

    /// The opposite order, as seen through a transpose
    pub const fn transposed(self) -> Self {
        match self {
            StorageOrder::RowMajor => StorageOrder::ColMajor,
            StorageOrder::ColMajor => StorageOrder::RowMajor,
        }
    }

    /// Outer dimension length for a `rows x cols` shape
    pub const fn outer_size(self, rows: usize, cols: usize) -> usize {
        match self {
            StorageOrder::RowMajor => rows,
            StorageOrder::ColMajor => cols,
        }
    }

    /// Inner dimension length for a `rows x cols` shape
    pub const fn inner_size(self, rows: usize, cols: usize) -> usize {
        match self {
            StorageOrder::RowMajor => cols,
            StorageOrder::ColMajor => rows,
        }
    }

    /// Map a `(row, col)` position to `(outer, inner)`
    #[inline]
    pub const fn to_outer_inner(self, row: usize, col: usize) -> (usize, usize) {
        match self {
            StorageOrder::RowMajor => (row, col),
            StorageOrder::ColMajor => (col, row),
        }
    }

    /// Map an `(outer, inner)` position back to `(row, col)`
    #[inline]
    pub const fn to_row_col(self, outer: usize, inner: usize) -> (usize, usize) {
        match self {
            StorageOrder::RowMajor => (outer, inner),
            StorageOrder::ColMajor => (inner, outer),
        }
    }

    /// Short name ("CSR" / "CSC")
    pub const fn name(self) -> &'static str {
        match self {
            StorageOrder::RowMajor => "CSR",
            StorageOrder::ColMajor => "CSC",
        }
    }
}

impl core::fmt::Display for StorageOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Compile-time layout marker
///
/// Implemented by [`RowMajor`], [`ColMajor`], [`RowVector`] and [`ColVector`].
/// Stores and references carry one of these as a type parameter.
pub trait Layout: Copy + Default + core::fmt::Debug + Send + Sync + 'static {
    /// Major order of the compressed arrays
    const ORDER: StorageOrder;

    /// Whether the shape is fixed to a single row or column
    const IS_VECTOR: bool;

    /// The requirement this layout places on a bound source
    const REQUIREMENT: Requirement = Requirement {
        order: Self::ORDER,
        vector: Self::IS_VECTOR,
    };

    /// Check that a `rows x cols` shape is admissible for this layout
    fn check_shape(rows: usize, cols: usize) -> Result<(), RefError> {
        if !Self::IS_VECTOR {
            return Ok(());
        }
        let ok = match Self::ORDER {
            // A column-major vector is a single column
            StorageOrder::ColMajor => cols == 1,
            StorageOrder::RowMajor => rows == 1,
        };
        if ok {
            Ok(())
        } else {
            Err(RefError::NotAVector { rows, cols })
        }
    }
}

/// Row-major (CSR) matrix layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowMajor;

/// Column-major (CSC) matrix layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColMajor;

/// Single-row vector layout (`1 x n`, row-major)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowVector;

/// Single-column vector layout (`n x 1`, column-major)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColVector;

impl Layout for RowMajor {
    const ORDER: StorageOrder = StorageOrder::RowMajor;
    const IS_VECTOR: bool = false;
}

impl Layout for ColMajor {
    const ORDER: StorageOrder = StorageOrder::ColMajor;
    const IS_VECTOR: bool = false;
}

impl Layout for RowVector {
    const ORDER: StorageOrder = StorageOrder::RowMajor;
    const IS_VECTOR: bool = true;
}

impl Layout for ColVector {
    const ORDER: StorageOrder = StorageOrder::ColMajor;
    const IS_VECTOR: bool = true;
}

/// Static capability flags of a sparse source type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Exposes outer offsets, inner indices and values directly
    pub compressed: bool,
    /// Compressed arrays are row-major
    pub row_major: bool,
    /// Shape is a single row or column
    pub vector: bool,
    /// Supports writing through its storage
    pub lvalue: bool,
}

impl Capabilities {
    /// Capabilities of a compressed store with layout `L`
    pub const fn compressed<L: Layout>(lvalue: bool) -> Self {
        Self {
            compressed: true,
            row_major: L::ORDER.is_row_major(),
            vector: L::IS_VECTOR,
            lvalue,
        }
    }

    /// Capabilities of an expression that must be evaluated to be stored
    pub const fn expression(row_major: bool, vector: bool) -> Self {
        Self {
            compressed: false,
            row_major,
            vector,
            lvalue: false,
        }
    }

    /// Storage order of the source
    pub const fn order(self) -> StorageOrder {
        StorageOrder::from_row_major(self.row_major)
    }

    /// Same capabilities with write access removed
    pub const fn read_only(self) -> Self {
        Self {
            lvalue: false,
            ..self
        }
    }

    /// Capabilities seen through a transpose
    pub const fn transposed(self) -> Self {
        Self {
            row_major: !self.row_major,
            ..self
        }
    }
}

/// Layout a bound reference requires of its source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    /// Required major order
    pub order: StorageOrder,
    /// Whether the reference itself is a vector
    pub vector: bool,
}

impl Requirement {
    /// The requirement of layout `L`
    pub const fn of<L: Layout>() -> Self {
        L::REQUIREMENT
    }
}

/// Decide whether a source can be aliased without copying
///
/// Vector shapes on either side are exempt from major-order matching, since
/// the orientation of a single row or column is immaterial.
pub const fn layout_matches(source: Capabilities, target: Requirement) -> bool {
    let order_match = source.vector
        || target.vector
        || source.row_major == target.order.is_row_major();
    source.compressed && order_match
}

/// Check whether a mutable binding of `source` against `target` is allowed
///
/// Layout is checked before write access, so a read-only source with the
/// wrong layout reports [`RefError::LayoutMismatch`].
pub const fn check_mutable_binding(source: Capabilities, target: Requirement) -> Result<(), RefError> {
    if !layout_matches(source, target) {
        return Err(RefError::LayoutMismatch {
            actual: source.order(),
            required: target.order,
        });
    }
    if !source.lvalue {
        return Err(RefError::NotAnLvalue);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSR: Capabilities = Capabilities::compressed::<RowMajor>(true);
    const CSC: Capabilities = Capabilities::compressed::<ColMajor>(true);
    const COL_VEC: Capabilities = Capabilities::compressed::<ColVector>(true);

    #[test]
    fn test_same_order_matches() {
        assert!(layout_matches(CSR, Requirement::of::<RowMajor>()));
        assert!(layout_matches(CSC, Requirement::of::<ColMajor>()));
    }

    #[test]
    fn test_order_mismatch_rejected() {
        assert!(!layout_matches(CSR, Requirement::of::<ColMajor>()));
        assert!(!layout_matches(CSC, Requirement::of::<RowMajor>()));
    }

    #[test]
    fn test_vector_exemption() {
        // Source vector
        assert!(layout_matches(COL_VEC, Requirement::of::<RowMajor>()));
        // Target vector
        assert!(layout_matches(CSR, Requirement::of::<ColVector>()));
        assert!(layout_matches(CSC, Requirement::of::<RowVector>()));
    }

    #[test]
    fn test_uncompressed_never_matches() {
        let expr = Capabilities::expression(true, false);
        assert!(!layout_matches(expr, Requirement::of::<RowMajor>()));
        assert!(!layout_matches(expr, Requirement::of::<ColVector>()));

        let vector_expr = Capabilities::expression(false, true);
        assert!(!layout_matches(vector_expr, Requirement::of::<ColMajor>()));
    }

    #[test]
    fn test_predicate_is_stable() {
        let first = layout_matches(CSR, Requirement::of::<ColMajor>());
        for _ in 0..16 {
            assert_eq!(layout_matches(CSR, Requirement::of::<ColMajor>()), first);
        }
    }

    #[test]
    fn test_check_mutable_binding() {
        assert_eq!(check_mutable_binding(CSR, Requirement::of::<RowMajor>()), Ok(()));
        assert_eq!(
            check_mutable_binding(CSR, Requirement::of::<ColMajor>()),
            Err(RefError::LayoutMismatch {
                actual: StorageOrder::RowMajor,
                required: StorageOrder::ColMajor,
            })
        );
        assert_eq!(
            check_mutable_binding(CSR.read_only(), Requirement::of::<RowMajor>()),
            Err(RefError::NotAnLvalue)
        );
    }

    #[test]
    fn test_layout_shapes() {
        assert!(ColVector::check_shape(5, 1).is_ok());
        assert_eq!(
            ColVector::check_shape(1, 5),
            Err(RefError::NotAVector { rows: 1, cols: 5 })
        );
        assert!(RowVector::check_shape(1, 7).is_ok());
        assert!(RowMajor::check_shape(3, 9).is_ok());
    }

    #[test]
    fn test_order_mapping() {
        let order = StorageOrder::ColMajor;
        assert_eq!(order.to_outer_inner(2, 5), (5, 2));
        assert_eq!(order.to_row_col(5, 2), (2, 5));
        assert_eq!(order.outer_size(3, 4), 4);
        assert_eq!(order.transposed(), StorageOrder::RowMajor);
    }
}
