//! Non-owning views over compressed arrays
//!
//! A mapped view records the shape, storage order and raw pointers of a
//! source's arrays. Binding one is O(1) and never allocates or copies.
//! The lifetime parameter ties the view to the borrow it was built from,
//! so the source cannot be dropped or restructured while the view lives.

use std::marker::PhantomData;
use std::slice;

use spref_core::{
    CompressedParts, CompressedPartsMut, Element, ReadableSparse, StorageOrder, WritableSparse,
};

/// Macro for slice accessors over raw parts
macro_rules! raw_slice_accessor {
    ($name:ident, $field:ident, $len_field:ident, $type:ty) => {
        fn $name(&self) -> &[$type] {
            // SAFETY: Pointer and length come from a live slice captured at bind time,
            // and the borrow (or owned store) behind it outlives this view
            unsafe { slice::from_raw_parts(self.$field, self.$len_field) }
        }
    };
}

/// Shape and array pointers shared by both view flavours
#[derive(Debug, Clone, Copy)]
struct RawParts {
    rows: usize,
    cols: usize,
    nnz: usize,
    order: StorageOrder,
    outer_offsets: *const usize,
    outer_len: usize,
    inner_indices: *const usize,
    indices_len: usize,
    /// Null for compressed storage
    inner_nonzeros: *const usize,
    counts_len: usize,
}

impl RawParts {
    /// Record pointers and lengths of borrowed arrays
    ///
    /// # Panics
    ///
    /// Panics if `outer_offsets` is empty, if the inner index and value
    /// arrays differ in length, or if the per-outer counts do not have one
    /// entry per outer slice.
    fn capture<T>(parts: &CompressedParts<'_, T>) -> Self {
        assert!(!parts.outer_offsets.is_empty(), "outer offsets must not be empty");
        assert_eq!(
            parts.inner_indices.len(),
            parts.values.len(),
            "inner index and value arrays differ in length"
        );
        if let Some(counts) = parts.inner_nonzeros {
            assert_eq!(
                counts.len(),
                parts.outer_offsets.len() - 1,
                "inner nonzero counts need one entry per outer slice"
            );
        }
        let (inner_nonzeros, counts_len) = parts
            .inner_nonzeros
            .map_or((std::ptr::null(), 0), |counts| (counts.as_ptr(), counts.len()));
        Self {
            rows: parts.rows,
            cols: parts.cols,
            nnz: parts.nonzeros(),
            order: parts.order,
            outer_offsets: parts.outer_offsets.as_ptr(),
            outer_len: parts.outer_offsets.len(),
            inner_indices: parts.inner_indices.as_ptr(),
            indices_len: parts.inner_indices.len(),
            inner_nonzeros,
            counts_len,
        }
    }

    raw_slice_accessor!(outer_offsets, outer_offsets, outer_len, usize);
    raw_slice_accessor!(inner_indices, inner_indices, indices_len, usize);

    fn inner_nonzeros(&self) -> Option<&[usize]> {
        if self.inner_nonzeros.is_null() {
            return None;
        }
        // SAFETY: Non-null only when captured from a live slice of counts_len entries
        Some(unsafe { slice::from_raw_parts(self.inner_nonzeros, self.counts_len) })
    }
}

/// Read-only view bound directly onto existing compressed storage
///
/// Copying a view copies pointers only; both copies alias the same source.
pub struct MappedView<'a, T> {
    raw: RawParts,
    values: *const T,
    values_len: usize,
    _marker: PhantomData<&'a [T]>,
}

impl<T> Clone for MappedView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MappedView<'_, T> {}

// SAFETY: MappedView behaves like a bundle of shared slices:
// 1. It never writes through its pointers
// 2. The borrow it was built from is held for 'a
// 3. Sharing &[T] across threads requires only T: Sync
unsafe impl<T: Sync> Send for MappedView<'_, T> {}
unsafe impl<T: Sync> Sync for MappedView<'_, T> {}

impl<'a, T: Element> MappedView<'a, T> {
    /// Bind a view onto borrowed compressed arrays
    ///
    /// O(1) for compressed storage. Uncompressed storage sums the per-outer
    /// counts once to record the nonzero total.
    ///
    /// # Panics
    ///
    /// Panics if `outer_offsets` is empty, if `inner_indices` and `values`
    /// differ in length, or if `inner_nonzeros` is present without exactly
    /// `outer_offsets.len() - 1` entries.
    pub fn new(parts: CompressedParts<'a, T>) -> Self {
        Self {
            raw: RawParts::capture(&parts),
            values: parts.values.as_ptr(),
            values_len: parts.values.len(),
            _marker: PhantomData,
        }
    }

    /// Re-tag the view with an unrelated lifetime
    ///
    /// # Safety
    ///
    /// The arrays behind the view must stay alive and unmoved for `'b`, and
    /// callers must not hand out the `'b` view itself.
    pub(crate) unsafe fn detach<'b>(self) -> MappedView<'b, T> {
        MappedView {
            raw: self.raw,
            values: self.values,
            values_len: self.values_len,
            _marker: PhantomData,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.raw.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.raw.cols
    }

    /// Number of live entries
    pub fn nonzeros(&self) -> usize {
        self.raw.nnz
    }

    /// Address of the first value slot, for aliasing checks
    pub fn values_ptr(&self) -> *const T {
        self.values
    }
}

impl<T: Element> ReadableSparse for MappedView<'_, T> {
    type Scalar = T;

    fn rows(&self) -> usize {
        self.raw.rows
    }

    fn cols(&self) -> usize {
        self.raw.cols
    }

    fn storage_order(&self) -> StorageOrder {
        self.raw.order
    }

    fn outer_offsets(&self) -> &[usize] {
        self.raw.outer_offsets()
    }

    fn inner_indices(&self) -> &[usize] {
        self.raw.inner_indices()
    }

    fn values(&self) -> &[T] {
        // SAFETY: Captured from a slice of `values_len` values that outlives this view
        unsafe { slice::from_raw_parts(self.values, self.values_len) }
    }

    fn inner_nonzeros(&self) -> Option<&[usize]> {
        self.raw.inner_nonzeros()
    }

    fn nonzeros(&self) -> usize {
        self.raw.nnz
    }
}

impl<T: Element> std::fmt::Debug for MappedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedView")
            .field("rows", &self.raw.rows)
            .field("cols", &self.raw.cols)
            .field("nnz", &self.raw.nnz)
            .field("order", &self.raw.order)
            .finish()
    }
}

/// Mutable view bound directly onto existing compressed storage
///
/// Writes go straight into the source's value array. The sparsity
/// structure is read-only.
pub struct MappedViewMut<'a, T> {
    raw: RawParts,
    values: *mut T,
    values_len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

// SAFETY: MappedViewMut behaves like an exclusive value slice plus shared
// structure slices, so it is Send/Sync under the same bounds as &mut [T]
unsafe impl<T: Send> Send for MappedViewMut<'_, T> {}
unsafe impl<T: Sync> Sync for MappedViewMut<'_, T> {}

impl<'a, T: Element> MappedViewMut<'a, T> {
    /// Bind a view onto compressed arrays with writable values
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`MappedView::new`].
    pub fn new(mut parts: CompressedPartsMut<'a, T>) -> Self {
        let raw = RawParts::capture(&parts.as_parts());
        Self {
            raw,
            values_len: parts.values.len(),
            values: parts.values.as_mut_ptr(),
            _marker: PhantomData,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.raw.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.raw.cols
    }

    /// Number of live entries
    pub fn nonzeros(&self) -> usize {
        self.raw.nnz
    }

    /// Reborrow as a read-only view
    pub fn as_view(&self) -> MappedView<'_, T> {
        MappedView {
            raw: self.raw,
            values: self.values,
            values_len: self.values_len,
            _marker: PhantomData,
        }
    }

    /// Reborrow as a shorter-lived mutable view
    pub fn reborrow(&mut self) -> MappedViewMut<'_, T> {
        MappedViewMut {
            raw: self.raw,
            values: self.values,
            values_len: self.values_len,
            _marker: PhantomData,
        }
    }

    /// Address of the first value slot, for aliasing checks
    pub fn values_ptr(&self) -> *const T {
        self.values
    }
}

impl<T: Element> ReadableSparse for MappedViewMut<'_, T> {
    type Scalar = T;

    fn rows(&self) -> usize {
        self.raw.rows
    }

    fn cols(&self) -> usize {
        self.raw.cols
    }

    fn storage_order(&self) -> StorageOrder {
        self.raw.order
    }

    fn outer_offsets(&self) -> &[usize] {
        self.raw.outer_offsets()
    }

    fn inner_indices(&self) -> &[usize] {
        self.raw.inner_indices()
    }

    fn values(&self) -> &[T] {
        // SAFETY: Captured from a slice of `values_len` values, exclusively borrowed for 'a
        unsafe { slice::from_raw_parts(self.values, self.values_len) }
    }

    fn inner_nonzeros(&self) -> Option<&[usize]> {
        self.raw.inner_nonzeros()
    }

    fn nonzeros(&self) -> usize {
        self.raw.nnz
    }
}

impl<T: Element> WritableSparse for MappedViewMut<'_, T> {
    fn parts_mut(&mut self) -> CompressedPartsMut<'_, T> {
        // SAFETY: The value slice was exclusively borrowed for 'a and &mut self
        // guarantees no other slice derived from this view is alive
        let values = unsafe { slice::from_raw_parts_mut(self.values, self.values_len) };
        CompressedPartsMut {
            rows: self.raw.rows,
            cols: self.raw.cols,
            order: self.raw.order,
            outer_offsets: self.raw.outer_offsets(),
            inner_indices: self.raw.inner_indices(),
            values,
            inner_nonzeros: self.raw.inner_nonzeros(),
        }
    }
}

impl<T: Element> std::fmt::Debug for MappedViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedViewMut")
            .field("rows", &self.raw.rows)
            .field("cols", &self.raw.cols)
            .field("nnz", &self.raw.nnz)
            .field("order", &self.raw.order)
            .finish()
    }
}
