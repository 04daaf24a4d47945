//! Read and write interfaces shared by stores, views and references
//!
//! Anything that keeps its data in compressed form implements
//! [`ReadableSparse`]. The trait only asks for the raw arrays; element
//! lookup, per-outer ranges and iteration are provided on top of them, so
//! an owned store, a borrowed view and a bound reference all answer
//! queries through exactly the same code.

use core::ops::Range;

use super::element::Element;
use crate::layout::StorageOrder;

/// Borrowed compressed arrays of a sparse matrix
///
/// When `inner_nonzeros` is `Some`, the storage is uncompressed: outer slice
/// `o` holds `inner_nonzeros[o]` entries starting at `outer_offsets[o]`.
#[derive(Debug)]
pub struct CompressedParts<'a, T> {
    pub rows: usize,
    pub cols: usize,
    pub order: StorageOrder,
    pub outer_offsets: &'a [usize],
    pub inner_indices: &'a [usize],
    pub values: &'a [T],
    pub inner_nonzeros: Option<&'a [usize]>,
}

impl<T> Clone for CompressedParts<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for CompressedParts<'_, T> {}

impl<'a, T> CompressedParts<'a, T> {
    /// Length of the outer dimension
    pub fn outer_size(&self) -> usize {
        self.order.outer_size(self.rows, self.cols)
    }

    /// Length of the inner dimension
    pub fn inner_size(&self) -> usize {
        self.order.inner_size(self.rows, self.cols)
    }

    /// Number of live entries
    pub fn nonzeros(&self) -> usize {
        match self.inner_nonzeros {
            Some(counts) => counts.iter().sum(),
            None => self.outer_offsets.last().copied().unwrap_or(0),
        }
    }

    /// The same arrays read as the transposed matrix
    pub fn transposed(self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            order: self.order.transposed(),
            ..self
        }
    }
}

/// Compressed arrays with writable values
///
/// The sparsity structure stays read-only; only stored values can change.
#[derive(Debug)]
pub struct CompressedPartsMut<'a, T> {
    pub rows: usize,
    pub cols: usize,
    pub order: StorageOrder,
    pub outer_offsets: &'a [usize],
    pub inner_indices: &'a [usize],
    pub values: &'a mut [T],
    pub inner_nonzeros: Option<&'a [usize]>,
}

impl<'a, T> CompressedPartsMut<'a, T> {
    /// Reborrow as read-only parts
    pub fn as_parts(&self) -> CompressedParts<'_, T> {
        CompressedParts {
            rows: self.rows,
            cols: self.cols,
            order: self.order,
            outer_offsets: self.outer_offsets,
            inner_indices: self.inner_indices,
            values: self.values,
            inner_nonzeros: self.inner_nonzeros,
        }
    }

    /// The same arrays read as the transposed matrix
    pub fn transposed(self) -> Self {
        Self {
            rows: self.cols,
            cols: self.rows,
            order: self.order.transposed(),
            ..self
        }
    }
}

/// Half-open range of storage positions for one outer slice
#[inline]
pub fn outer_range_of(
    outer_offsets: &[usize],
    inner_nonzeros: Option<&[usize]>,
    outer: usize,
) -> Range<usize> {
    let start = outer_offsets[outer];
    let end = match inner_nonzeros {
        Some(counts) => start + counts[outer],
        None => outer_offsets[outer + 1],
    };
    start..end
}

/// Iterator over the `(inner index, value)` pairs of one outer slice
#[derive(Debug, Clone)]
pub struct InnerIter<'a, T> {
    indices: core::slice::Iter<'a, usize>,
    values: core::slice::Iter<'a, T>,
}

impl<'a, T> InnerIter<'a, T> {
    /// Iterate two equally long slices in lockstep
    pub fn new(indices: &'a [usize], values: &'a [T]) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        Self {
            indices: indices.iter(),
            values: values.iter(),
        }
    }
}

impl<T: Copy> Iterator for InnerIter<'_, T> {
    type Item = (usize, T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.indices.next()?;
        let value = *self.values.next()?;
        Some((index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<T: Copy> DoubleEndedIterator for InnerIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let index = *self.indices.next_back()?;
        let value = *self.values.next_back()?;
        Some((index, value))
    }
}

impl<T: Copy> ExactSizeIterator for InnerIter<'_, T> {}

/// Iterator over `(inner index, &mut value)` pairs of one outer slice
#[derive(Debug)]
pub struct InnerIterMut<'a, T> {
    indices: core::slice::Iter<'a, usize>,
    values: core::slice::IterMut<'a, T>,
}

impl<'a, T> InnerIterMut<'a, T> {
    pub fn new(indices: &'a [usize], values: &'a mut [T]) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        Self {
            indices: indices.iter(),
            values: values.iter_mut(),
        }
    }
}

impl<'a, T> Iterator for InnerIterMut<'a, T> {
    type Item = (usize, &'a mut T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let index = *self.indices.next()?;
        let value = self.values.next()?;
        Some((index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<T> ExactSizeIterator for InnerIterMut<'_, T> {}

/// Read interface of a plain compressed sparse store
///
/// Implementors only expose their arrays. Lookup and iteration are
/// provided and never depend on who owns the memory.
pub trait ReadableSparse {
    /// The value type stored in this matrix
    type Scalar: Element;

    /// Number of rows
    fn rows(&self) -> usize;

    /// Number of columns
    fn cols(&self) -> usize;

    /// Major order of the arrays
    fn storage_order(&self) -> StorageOrder;

    /// Outer offsets, `outer_size() + 1` entries
    fn outer_offsets(&self) -> &[usize];

    /// Inner indices of every stored slot
    fn inner_indices(&self) -> &[usize];

    /// Values of every stored slot
    fn values(&self) -> &[Self::Scalar];

    /// Per-outer live counts, present only for uncompressed storage
    fn inner_nonzeros(&self) -> Option<&[usize]>;

    /// Number of live entries
    fn nonzeros(&self) -> usize {
        self.parts().nonzeros()
    }

    /// All arrays at once
    fn parts(&self) -> CompressedParts<'_, Self::Scalar> {
        CompressedParts {
            rows: self.rows(),
            cols: self.cols(),
            order: self.storage_order(),
            outer_offsets: self.outer_offsets(),
            inner_indices: self.inner_indices(),
            values: self.values(),
            inner_nonzeros: self.inner_nonzeros(),
        }
    }

    /// Length of the outer dimension
    fn outer_size(&self) -> usize {
        self.storage_order().outer_size(self.rows(), self.cols())
    }

    /// Length of the inner dimension
    fn inner_size(&self) -> usize {
        self.storage_order().inner_size(self.rows(), self.cols())
    }

    /// True when every outer slice is packed with no slack
    fn is_compressed(&self) -> bool {
        self.inner_nonzeros().is_none()
    }

    /// Storage positions `(start, end)` of an outer slice
    ///
    /// # Panics
    ///
    /// Panics if `outer >= outer_size()`
    fn outer_range(&self, outer: usize) -> Range<usize> {
        outer_range_of(self.outer_offsets(), self.inner_nonzeros(), outer)
    }

    /// Ordered `(inner index, value)` pairs of an outer slice
    ///
    /// # Panics
    ///
    /// Panics if `outer >= outer_size()`
    fn inner_iter(&self, outer: usize) -> InnerIter<'_, Self::Scalar> {
        let range = self.outer_range(outer);
        InnerIter::new(
            &self.inner_indices()[range.clone()],
            &self.values()[range],
        )
    }

    /// Storage position of `(row, col)` if it is stored
    fn find(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        let (outer, inner) = self.storage_order().to_outer_inner(row, col);
        let range = self.outer_range(outer);
        self.inner_indices()[range.clone()]
            .binary_search(&inner)
            .ok()
            .map(|k| range.start + k)
    }

    /// Stored value at `(row, col)`
    ///
    /// Returns `None` if the position is not stored or is out of bounds.
    fn get(&self, row: usize, col: usize) -> Option<Self::Scalar> {
        self.find(row, col).map(|pos| self.values()[pos])
    }

    /// Value at `(row, col)`, zero when not stored
    fn coeff(&self, row: usize, col: usize) -> Self::Scalar {
        self.get(row, col).unwrap_or_else(Self::Scalar::zero)
    }
}

/// Write interface, available only where writes reach real storage
pub trait WritableSparse: ReadableSparse {
    /// Arrays with writable values
    fn parts_mut(&mut self) -> CompressedPartsMut<'_, Self::Scalar>;

    /// Values of every stored slot
    fn values_mut(&mut self) -> &mut [Self::Scalar] {
        self.parts_mut().values
    }

    /// Mutable reference to the stored value at `(row, col)`
    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Self::Scalar> {
        let pos = self.find(row, col)?;
        self.values_mut().get_mut(pos)
    }

    /// Ordered `(inner index, &mut value)` pairs of an outer slice
    ///
    /// # Panics
    ///
    /// Panics if `outer >= outer_size()`
    fn inner_iter_mut(&mut self, outer: usize) -> InnerIterMut<'_, Self::Scalar> {
        let CompressedPartsMut {
            outer_offsets,
            inner_indices,
            values,
            inner_nonzeros,
            ..
        } = self.parts_mut();
        let range = outer_range_of(outer_offsets, inner_nonzeros, outer);
        InnerIterMut::new(&inner_indices[range.clone()], &mut values[range])
    }
}
