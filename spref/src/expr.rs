//! Sample sparse expressions
//!
//! These are the lightweight sources a reference can be bound to besides a
//! store: an unordered coordinate list, a lazy transpose and a lazy scale.
//! Only the transpose of a compressed source keeps compressed access.

use hashbrown::HashMap;
use spref_core::{check_position, Capabilities, CompressedParts, Element, Result, SparseExpr};

/// Coordinate-list matrix, summing values pushed to the same position
#[derive(Debug, Clone)]
pub struct TripletMatrix<T> {
    rows: usize,
    cols: usize,
    entries: HashMap<(usize, usize), T>,
}

impl<T: Element> TripletMatrix<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: HashMap::new(),
        }
    }

    /// Add `value` at `(row, col)`, summing with any value already there
    pub fn push(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        check_position(row, col, self.rows, self.cols)?;
        self.entries
            .entry((row, col))
            .and_modify(|v| *v = *v + value)
            .or_insert(value);
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Option<T> {
        self.entries.get(&(row, col)).copied()
    }

    /// Number of distinct positions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Element> SparseExpr for TripletMatrix<T> {
    type Scalar = T;

    const CAPS: Capabilities = Capabilities::expression(false, false);

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn nonzeros(&self) -> usize {
        self.entries.len()
    }

    fn for_each_nonzero<F: FnMut(usize, usize, T)>(&self, mut f: F) {
        for (&(row, col), &value) in &self.entries {
            f(row, col, value);
        }
    }
}

/// Lazy transpose of another expression
///
/// A compressed source stays compressed: the same arrays read in the
/// opposite major order. Write access is not carried through.
#[derive(Debug)]
pub struct Transpose<'a, S: ?Sized> {
    inner: &'a S,
}

impl<'a, S: SparseExpr + ?Sized> Transpose<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        Self { inner }
    }
}

impl<S: SparseExpr + ?Sized> SparseExpr for Transpose<'_, S> {
    type Scalar = S::Scalar;

    const CAPS: Capabilities = S::CAPS.transposed().read_only();

    fn rows(&self) -> usize {
        self.inner.cols()
    }

    fn cols(&self) -> usize {
        self.inner.rows()
    }

    fn nonzeros(&self) -> usize {
        self.inner.nonzeros()
    }

    fn for_each_nonzero<F: FnMut(usize, usize, S::Scalar)>(&self, mut f: F) {
        self.inner.for_each_nonzero(|row, col, value| f(col, row, value));
    }

    fn compressed_parts(&self) -> Option<CompressedParts<'_, S::Scalar>> {
        self.inner.compressed_parts().map(CompressedParts::transposed)
    }

    fn storage_order(&self) -> spref_core::StorageOrder {
        self.inner.storage_order().transposed()
    }
}

/// Lazy `value * factor` over another expression
#[derive(Debug)]
pub struct Scaled<'a, S: SparseExpr + ?Sized> {
    inner: &'a S,
    factor: S::Scalar,
}

impl<'a, S: SparseExpr + ?Sized> Scaled<'a, S> {
    pub fn new(inner: &'a S, factor: S::Scalar) -> Self {
        Self { inner, factor }
    }
}

impl<S: SparseExpr + ?Sized> SparseExpr for Scaled<'_, S> {
    type Scalar = S::Scalar;

    const CAPS: Capabilities = Capabilities::expression(S::CAPS.row_major, S::CAPS.vector);

    fn rows(&self) -> usize {
        self.inner.rows()
    }

    fn cols(&self) -> usize {
        self.inner.cols()
    }

    fn nonzeros(&self) -> usize {
        self.inner.nonzeros()
    }

    fn for_each_nonzero<F: FnMut(usize, usize, S::Scalar)>(&self, mut f: F) {
        let factor = self.factor;
        self.inner
            .for_each_nonzero(|row, col, value| f(row, col, value * factor));
    }
}

/// Adapters available on every expression
pub trait SparseExprExt: SparseExpr {
    fn transpose(&self) -> Transpose<'_, Self> {
        Transpose::new(self)
    }

    fn scaled(&self, factor: Self::Scalar) -> Scaled<'_, Self> {
        Scaled::new(self, factor)
    }
}

impl<S: SparseExpr + ?Sized> SparseExprExt for S {}
