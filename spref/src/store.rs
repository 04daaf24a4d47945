//! Owned compressed sparse storage
//!
//! `CompressedStore` is the canonical representation every reference
//! resolves to: outer offsets, inner indices, values and, while entries are
//! being inserted, per-outer live counts. The layout parameter fixes the
//! major order (and vector-ness) at the type level.

use std::marker::PhantomData;

use spref_core::{
    check_position, validate_parts, Capabilities, ColMajor, CompressedParts, CompressedPartsMut,
    Element, Layout, ReadableSparse, Result, SparseExpr, SparseExprMut, StorageOrder,
    WritableSparse,
};

use crate::evaluator::SparseEvaluator;
use crate::owned;
use crate::view::{MappedView, MappedViewMut};

/// Minimum number of spare slots added to a full outer slice on insert
const MIN_SLICE_GROWTH: usize = 4;

/// Compressed sparse matrix that owns its arrays
///
/// Invariants (checked by every validated constructor):
/// - `outer_offsets` has `outer_size + 1` entries and never decreases
/// - inner indices of each live slice are strictly ascending and in range
/// - `inner_indices.len() == values.len()`
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "StoreRepr<T>"))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "T: serde::Serialize",
        deserialize = "T: Element + serde::Deserialize<'de>, L: Layout"
    ))
)]
pub struct CompressedStore<T, L = ColMajor> {
    rows: usize,
    cols: usize,
    outer_offsets: Vec<usize>,
    inner_indices: Vec<usize>,
    values: Vec<T>,
    /// Present only while the store is uncompressed
    inner_nonzeros: Option<Vec<usize>>,
    #[cfg_attr(feature = "serde", serde(skip))]
    _layout: PhantomData<L>,
}

impl<T: Element, L: Layout> CompressedStore<T, L> {
    /// Create an empty `rows x cols` store
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        L::check_shape(rows, cols)?;
        let outer_size = L::ORDER.outer_size(rows, cols);
        Ok(Self::from_parts_unchecked(
            rows,
            cols,
            vec![0; outer_size + 1],
            Vec::new(),
            Vec::new(),
            None,
        ))
    }

    /// Build a compressed store from raw arrays, validating every invariant
    pub fn from_raw_parts(
        rows: usize,
        cols: usize,
        outer_offsets: Vec<usize>,
        inner_indices: Vec<usize>,
        values: Vec<T>,
    ) -> Result<Self> {
        Self::from_raw_parts_inner(rows, cols, outer_offsets, inner_indices, values, None)
    }

    /// Build an uncompressed store from raw arrays and per-outer live counts
    pub fn from_raw_parts_uncompressed(
        rows: usize,
        cols: usize,
        outer_offsets: Vec<usize>,
        inner_indices: Vec<usize>,
        values: Vec<T>,
        inner_nonzeros: Vec<usize>,
    ) -> Result<Self> {
        Self::from_raw_parts_inner(
            rows,
            cols,
            outer_offsets,
            inner_indices,
            values,
            Some(inner_nonzeros),
        )
    }

    fn from_raw_parts_inner(
        rows: usize,
        cols: usize,
        outer_offsets: Vec<usize>,
        inner_indices: Vec<usize>,
        values: Vec<T>,
        inner_nonzeros: Option<Vec<usize>>,
    ) -> Result<Self> {
        L::check_shape(rows, cols)?;
        validate_parts(&CompressedParts {
            rows,
            cols,
            order: L::ORDER,
            outer_offsets: &outer_offsets,
            inner_indices: &inner_indices,
            values: &values,
            inner_nonzeros: inner_nonzeros.as_deref(),
        })?;
        Ok(Self::from_parts_unchecked(
            rows,
            cols,
            outer_offsets,
            inner_indices,
            values,
            inner_nonzeros,
        ))
    }

    pub(crate) fn from_parts_unchecked(
        rows: usize,
        cols: usize,
        outer_offsets: Vec<usize>,
        inner_indices: Vec<usize>,
        values: Vec<T>,
        inner_nonzeros: Option<Vec<usize>>,
    ) -> Self {
        Self {
            rows,
            cols,
            outer_offsets,
            inner_indices,
            values,
            inner_nonzeros,
            _layout: PhantomData,
        }
    }

    /// Build a store from `(row, col, value)` triplets
    ///
    /// Triplets may come in any order; duplicates are summed.
    pub fn from_triplets(rows: usize, cols: usize, triplets: &[(usize, usize, T)]) -> Result<Self> {
        for &(row, col, _) in triplets {
            check_position(row, col, rows, cols)?;
        }
        Self::from_expr(&TripletSlice {
            rows,
            cols,
            triplets,
        })
    }

    /// Evaluate any sparse expression into a new store
    pub fn from_expr<S>(source: &S) -> Result<Self>
    where
        S: SparseExpr<Scalar = T> + ?Sized,
    {
        L::check_shape(source.rows(), source.cols())?;
        Ok(owned::materialize(source))
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Major order of the arrays
    pub fn storage_order(&self) -> StorageOrder {
        L::ORDER
    }

    /// Number of live entries
    pub fn nonzeros(&self) -> usize {
        match &self.inner_nonzeros {
            Some(counts) => counts.iter().sum(),
            None => self.outer_offsets.last().copied().unwrap_or(0),
        }
    }

    /// Read-only view over this store's arrays
    pub fn view(&self) -> MappedView<'_, T> {
        MappedView::new(self.parts())
    }

    /// Mutable view over this store's values
    pub fn view_mut(&mut self) -> MappedViewMut<'_, T> {
        MappedViewMut::new(self.parts_mut())
    }

    /// Insert or overwrite the value at `(row, col)`
    ///
    /// Returns the previous value when the position was already stored.
    /// Inserting a new entry switches the store to uncompressed mode and
    /// reuses spare room in the target outer slice when there is any.
    pub fn insert(&mut self, row: usize, col: usize, value: T) -> Result<Option<T>> {
        check_position(row, col, self.rows, self.cols)?;

        if let Some(pos) = self.find(row, col) {
            let previous = std::mem::replace(&mut self.values[pos], value);
            return Ok(Some(previous));
        }

        let (outer, inner) = L::ORDER.to_outer_inner(row, col);
        let outer_size = self.outer_size();
        let offsets = &self.outer_offsets;
        let counts = self.inner_nonzeros.get_or_insert_with(|| {
            (0..outer_size)
                .map(|o| offsets[o + 1] - offsets[o])
                .collect()
        });

        let start = self.outer_offsets[outer];
        let end = start + counts[outer];
        if end == self.outer_offsets[outer + 1] {
            let grow = counts[outer].max(MIN_SLICE_GROWTH);
            self.inner_indices.splice(end..end, std::iter::repeat(0).take(grow));
            self.values.splice(end..end, std::iter::repeat(T::zero()).take(grow));
            for offset in &mut self.outer_offsets[outer + 1..] {
                *offset += grow;
            }
        }

        let pos = start + self.inner_indices[start..end].partition_point(|&i| i < inner);
        self.inner_indices.copy_within(pos..end, pos + 1);
        self.values.copy_within(pos..end, pos + 1);
        self.inner_indices[pos] = inner;
        self.values[pos] = value;
        counts[outer] += 1;
        Ok(None)
    }

    /// Remove the slack left by insertions
    pub fn make_compressed(&mut self) {
        let Some(counts) = self.inner_nonzeros.take() else {
            return;
        };

        let mut write = 0;
        for (outer, &count) in counts.iter().enumerate() {
            let start = self.outer_offsets[outer];
            self.inner_indices.copy_within(start..start + count, write);
            self.values.copy_within(start..start + count, write);
            self.outer_offsets[outer] = write;
            write += count;
        }
        let outer_size = counts.len();
        self.outer_offsets[outer_size] = write;
        self.inner_indices.truncate(write);
        self.values.truncate(write);
    }

    /// Take the arrays out of the store, compressing first
    ///
    /// Returns `(outer_offsets, inner_indices, values)`.
    pub fn into_raw_parts(mut self) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        self.make_compressed();
        (self.outer_offsets, self.inner_indices, self.values)
    }
}

impl<T: Element, L: Layout> ReadableSparse for CompressedStore<T, L> {
    type Scalar = T;

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn storage_order(&self) -> StorageOrder {
        L::ORDER
    }

    fn outer_offsets(&self) -> &[usize] {
        &self.outer_offsets
    }

    fn inner_indices(&self) -> &[usize] {
        &self.inner_indices
    }

    fn values(&self) -> &[T] {
        &self.values
    }

    fn inner_nonzeros(&self) -> Option<&[usize]> {
        self.inner_nonzeros.as_deref()
    }
}

impl<T: Element, L: Layout> WritableSparse for CompressedStore<T, L> {
    fn parts_mut(&mut self) -> CompressedPartsMut<'_, T> {
        CompressedPartsMut {
            rows: self.rows,
            cols: self.cols,
            order: L::ORDER,
            outer_offsets: &self.outer_offsets,
            inner_indices: &self.inner_indices,
            values: &mut self.values,
            inner_nonzeros: self.inner_nonzeros.as_deref(),
        }
    }
}

impl<T: Element, L: Layout> SparseExpr for CompressedStore<T, L> {
    type Scalar = T;

    const CAPS: Capabilities = Capabilities::compressed::<L>(true);

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn nonzeros(&self) -> usize {
        CompressedStore::nonzeros(self)
    }

    fn for_each_nonzero<F: FnMut(usize, usize, T)>(&self, f: F) {
        SparseEvaluator::new(self).for_each_nonzero(f)
    }

    fn compressed_parts(&self) -> Option<CompressedParts<'_, T>> {
        Some(self.parts())
    }
}

impl<T: Element, L: Layout> SparseExprMut for CompressedStore<T, L> {
    fn compressed_parts_mut(&mut self) -> CompressedPartsMut<'_, T> {
        self.parts_mut()
    }
}

/// Borrowed triplet list used by `from_triplets`
struct TripletSlice<'a, T> {
    rows: usize,
    cols: usize,
    triplets: &'a [(usize, usize, T)],
}

impl<T: Element> SparseExpr for TripletSlice<'_, T> {
    type Scalar = T;

    const CAPS: Capabilities = Capabilities::expression(false, false);

    fn rows(&self) -> usize {
        self.rows
    }

    fn cols(&self) -> usize {
        self.cols
    }

    fn nonzeros(&self) -> usize {
        self.triplets.len()
    }

    fn for_each_nonzero<F: FnMut(usize, usize, T)>(&self, mut f: F) {
        for &(row, col, value) in self.triplets {
            f(row, col, value);
        }
    }
}

/// Serialized form of a store, validated on the way back in
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct StoreRepr<T> {
    rows: usize,
    cols: usize,
    outer_offsets: Vec<usize>,
    inner_indices: Vec<usize>,
    values: Vec<T>,
    inner_nonzeros: Option<Vec<usize>>,
}

#[cfg(feature = "serde")]
impl<T: Element, L: Layout> TryFrom<StoreRepr<T>> for CompressedStore<T, L> {
    type Error = spref_core::RefError;

    fn try_from(repr: StoreRepr<T>) -> Result<Self> {
        Self::from_raw_parts_inner(
            repr.rows,
            repr.cols,
            repr.outer_offsets,
            repr.inner_indices,
            repr.values,
            repr.inner_nonzeros,
        )
    }
}
