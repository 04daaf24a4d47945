//! Uniform read access for downstream algorithms
//!
//! The evaluator is what consumers iterate. It depends only on
//! [`ReadableSparse`], so a store, a view and a reference in either binding
//! mode all evaluate through the same code path.

use spref_core::{InnerIter, ReadableSparse, StorageOrder};

/// Read-only evaluator over compressed storage
#[derive(Debug)]
pub struct SparseEvaluator<'a, S: ?Sized> {
    inner: &'a S,
}

impl<S: ?Sized> Clone for SparseEvaluator<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for SparseEvaluator<'_, S> {}

impl<'a, S: ReadableSparse + ?Sized> SparseEvaluator<'a, S> {
    pub fn new(inner: &'a S) -> Self {
        Self { inner }
    }

    /// Number of live entries
    pub fn nonzeros(&self) -> usize {
        self.inner.nonzeros()
    }

    /// Length of the outer dimension
    pub fn outer_size(&self) -> usize {
        self.inner.outer_size()
    }

    /// Major order the entries are visited in
    pub fn storage_order(&self) -> StorageOrder {
        self.inner.storage_order()
    }

    /// Storage positions `(start, end)` of an outer slice
    ///
    /// # Panics
    ///
    /// Panics if `outer >= outer_size()`
    pub fn outer_bounds(&self, outer: usize) -> (usize, usize) {
        let range = self.inner.outer_range(outer);
        (range.start, range.end)
    }

    /// Ordered `(inner index, value)` pairs of an outer slice
    ///
    /// # Panics
    ///
    /// Panics if `outer >= outer_size()`
    pub fn inner_iter(&self, outer: usize) -> InnerIter<'a, S::Scalar> {
        self.inner.inner_iter(outer)
    }

    /// Every outer slice in order, paired with its index
    pub fn outers(&self) -> impl Iterator<Item = (usize, InnerIter<'a, S::Scalar>)> + 'a {
        let inner = self.inner;
        (0..inner.outer_size()).map(move |outer| (outer, inner.inner_iter(outer)))
    }

    /// Visit every live entry as `(row, col, value)` in storage order
    pub fn for_each_nonzero<F: FnMut(usize, usize, S::Scalar)>(&self, mut f: F) {
        let order = self.storage_order();
        for (outer, entries) in self.outers() {
            for (inner, value) in entries {
                let (row, col) = order.to_row_col(outer, inner);
                f(row, col, value);
            }
        }
    }
}

/// Extension trait handing out an evaluator for any readable store
pub trait Evaluate: ReadableSparse {
    fn evaluator(&self) -> SparseEvaluator<'_, Self> {
        SparseEvaluator::new(self)
    }
}

impl<S: ReadableSparse + ?Sized> Evaluate for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::CompressedStore;
    use spref_core::{ColMajor, RowMajor};

    fn sample() -> CompressedStore<f32, RowMajor> {
        // [0 5]
        // [6 7]
        CompressedStore::from_raw_parts(2, 2, vec![0, 1, 3], vec![1, 0, 1], vec![5.0, 6.0, 7.0])
            .unwrap()
    }

    #[test]
    fn test_outer_bounds_and_iter() {
        let m = sample();
        let eval = m.evaluator();
        assert_eq!(eval.nonzeros(), 3);
        assert_eq!(eval.outer_size(), 2);
        assert_eq!(eval.outer_bounds(0), (0, 1));
        assert_eq!(eval.outer_bounds(1), (1, 3));
        let row1: Vec<_> = eval.inner_iter(1).collect();
        assert_eq!(row1, vec![(0, 6.0), (1, 7.0)]);
    }

    #[test]
    fn test_for_each_visits_storage_order() {
        let m = sample();
        let mut seen = Vec::new();
        m.evaluator().for_each_nonzero(|r, c, v| seen.push((r, c, v)));
        assert_eq!(seen, vec![(0, 1, 5.0), (1, 0, 6.0), (1, 1, 7.0)]);
    }

    #[test]
    fn test_column_major_maps_coordinates() {
        let m = CompressedStore::<f32, ColMajor>::from_raw_parts(2, 2, vec![0, 1, 3], vec![1, 0, 1], vec![5.0, 6.0, 7.0])
            .unwrap();
        let mut seen = Vec::new();
        SparseEvaluator::new(&m).for_each_nonzero(|r, c, v| seen.push((r, c, v)));
        assert_eq!(seen, vec![(1, 0, 5.0), (0, 1, 6.0), (1, 1, 7.0)]);
    }

    #[test]
    fn test_views_and_store_agree() {
        let m = sample();
        let view = m.view();
        let a: Vec<_> = m.evaluator().outers().map(|(o, it)| (o, it.collect::<Vec<_>>())).collect();
        let b: Vec<_> = view.evaluator().outers().map(|(o, it)| (o, it.collect::<Vec<_>>())).collect();
        assert_eq!(a, b);
    }
}
