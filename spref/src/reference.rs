//! Binding front-end
//!
//! A [`SparseRef`] binds to any sparse expression in a required layout `L`.
//! When the source's static capabilities satisfy the layout (compressed, and
//! either the major orders agree or one side is a vector) the reference
//! aliases the source's arrays. Otherwise it evaluates the source into an
//! owned [`CompressedStore`] and aliases that instead. Either way readers go
//! through the same cached view.
//!
//! A [`SparseRefMut`] only ever aliases. Binding it to a source that is not
//! writable, or whose layout does not match, fails to compile.

use std::marker::PhantomData;

use spref_core::{
    check_mutable_binding, layout_matches, validate_parts, Capabilities, ColMajor, CompressedParts,
    CompressedPartsMut, Element, Layout, ReadableSparse, RefError, Result, SparseExpr,
    SparseExprMut, StorageOrder, WritableSparse,
};
use tracing::debug;

use crate::config::BindConfig;
use crate::evaluator::SparseEvaluator;
use crate::owned;
use crate::store::CompressedStore;
use crate::view::{MappedView, MappedViewMut};

/// Offsets backing empty references (at most one outer slice)
static EMPTY_OFFSETS: [usize; 2] = [0, 0];

/// How a reference was bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Aliases the source's arrays
    Mapped,
    /// Reads an owned copy evaluated from the source
    Owned,
}

impl Binding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Binding::Mapped => "mapped",
            Binding::Owned => "owned",
        }
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Backing<T, L> {
    Mapped,
    Owned(CompressedStore<T, L>),
}

/// Read-only reference to a sparse expression in layout `L`
///
/// ```
/// use spref::{ColMajor, CompressedStore, ReadableSparse, RowMajor, SparseRef};
///
/// let store = CompressedStore::<f64, RowMajor>::from_triplets(
///     3, 3, &[(0, 0, 1.0), (1, 2, 2.0), (2, 1, 3.0)],
/// ).unwrap();
///
/// // Same layout: aliases the store
/// let same = SparseRef::<f64, RowMajor>::new(&store);
/// assert!(same.is_mapped());
///
/// // Opposite major order: evaluated into an owned copy
/// let flipped = SparseRef::<f64, ColMajor>::new(&store);
/// assert!(flipped.is_owned());
/// assert_eq!(flipped.get(1, 2), Some(2.0));
/// ```
pub struct SparseRef<'a, T, L = ColMajor> {
    /// Points either into the source or into `backing`
    view: MappedView<'a, T>,
    backing: Backing<T, L>,
}

impl<'a, T: Element, L: Layout> SparseRef<'a, T, L> {
    /// Bind `source` with the default configuration
    ///
    /// # Panics
    ///
    /// Panics if `L` is a vector layout and the source shape is not a single
    /// row or column, or if the source hands out malformed compressed arrays
    /// (see [`MappedView::new`]). Use [`SparseRef::with_config`] to get the
    /// shape error instead.
    pub fn new<S>(source: &'a S) -> Self
    where
        S: SparseExpr<Scalar = T> + ?Sized,
    {
        assert!(
            L::check_shape(source.rows(), source.cols()).is_ok(),
            "source shape does not fit a vector layout"
        );
        Self::bind_source(source, true)
    }

    /// Bind `source` under `config`
    ///
    /// Fails when the shape does not fit `L`, or when validation is enabled
    /// and the arrays that would be aliased are malformed.
    pub fn with_config<S>(source: &'a S, config: &BindConfig) -> Result<Self>
    where
        S: SparseExpr<Scalar = T> + ?Sized,
    {
        L::check_shape(source.rows(), source.cols())?;
        if config.validate_source && config.allows_aliasing() && layout_matches(S::CAPS, L::REQUIREMENT) {
            if let Some(parts) = source.compressed_parts() {
                validate_parts(&parts)?;
            }
        }
        Ok(Self::bind_source(source, config.allows_aliasing()))
    }

    /// A bound reference to an empty matrix
    ///
    /// The shape is `0 x 0`, or the empty vector shape for vector layouts.
    pub fn empty() -> Self {
        let (rows, cols) = match (L::IS_VECTOR, L::ORDER) {
            (false, _) => (0, 0),
            (true, StorageOrder::ColMajor) => (0, 1),
            (true, StorageOrder::RowMajor) => (1, 0),
        };
        let outer_size = L::ORDER.outer_size(rows, cols);
        let view = MappedView::new(CompressedParts {
            rows,
            cols,
            order: L::ORDER,
            outer_offsets: &EMPTY_OFFSETS[..outer_size + 1],
            inner_indices: &[],
            values: &[],
            inner_nonzeros: None,
        });
        Self {
            view,
            backing: Backing::Mapped,
        }
    }

    fn bind_source<S>(source: &'a S, allow_alias: bool) -> Self
    where
        S: SparseExpr<Scalar = T> + ?Sized,
    {
        if allow_alias && layout_matches(S::CAPS, L::REQUIREMENT) {
            if let Some(parts) = source.compressed_parts() {
                let view = MappedView::new(parts);
                debug!(
                    mode = Binding::Mapped.as_str(),
                    rows = view.rows(),
                    cols = view.cols(),
                    nnz = view.nonzeros(),
                    source_order = %parts.order,
                    target_order = %L::ORDER,
                    "bound sparse reference"
                );
                return Self {
                    view,
                    backing: Backing::Mapped,
                };
            }
        }

        let store: CompressedStore<T, L> = owned::materialize(source);
        debug!(
            mode = Binding::Owned.as_str(),
            rows = store.rows(),
            cols = store.cols(),
            nnz = store.nonzeros(),
            source_order = %source.storage_order(),
            target_order = %L::ORDER,
            "bound sparse reference"
        );
        Self::from_store(store)
    }

    fn from_store(store: CompressedStore<T, L>) -> Self {
        // SAFETY: The store's Vec buffers move with `backing` without being
        // reallocated, and the view is only handed out reborrowed from &self
        let view = unsafe { store.view().detach() };
        Self {
            view,
            backing: Backing::Owned(store),
        }
    }

    /// How this reference was bound
    pub fn binding(&self) -> Binding {
        match self.backing {
            Backing::Mapped => Binding::Mapped,
            Backing::Owned(_) => Binding::Owned,
        }
    }

    /// True if the reference aliases its source
    pub fn is_mapped(&self) -> bool {
        matches!(self.backing, Backing::Mapped)
    }

    /// True if the reference reads an owned copy
    pub fn is_owned(&self) -> bool {
        matches!(self.backing, Backing::Owned(_))
    }

    /// The cached view every read goes through
    pub fn view(&self) -> MappedView<'_, T> {
        self.view
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.view.rows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.view.cols()
    }

    /// Number of live entries
    pub fn nonzeros(&self) -> usize {
        self.view.nonzeros()
    }

    /// Major order of the referenced arrays
    ///
    /// This is the source's order for a vector aliased across orders, and
    /// the order of `L` otherwise.
    pub fn storage_order(&self) -> StorageOrder {
        ReadableSparse::storage_order(&self.view)
    }

    /// Detach into an owned store in layout `L`
    pub fn into_owned(self) -> CompressedStore<T, L> {
        match self.backing {
            Backing::Owned(store) => store,
            Backing::Mapped => owned::materialize(&self),
        }
    }

    /// Copy the referenced data into a new owned store in layout `L`
    pub fn to_owned_store(&self) -> CompressedStore<T, L> {
        match &self.backing {
            Backing::Owned(store) => store.clone(),
            Backing::Mapped => owned::materialize(self),
        }
    }
}

impl<T: Element, L: Layout> Clone for SparseRef<'_, T, L> {
    /// Mapped references copy their pointers; owned references deep-copy
    /// their store so the clone never aliases the original's buffers
    fn clone(&self) -> Self {
        match &self.backing {
            Backing::Mapped => Self {
                view: self.view,
                backing: Backing::Mapped,
            },
            Backing::Owned(store) => Self::from_store(store.clone()),
        }
    }
}

impl<T: Element, L: Layout> std::fmt::Debug for SparseRef<'_, T, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseRef")
            .field("binding", &self.binding())
            .field("view", &self.view)
            .finish()
    }
}

impl<T: Element, L: Layout> Default for SparseRef<'_, T, L> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Element, L: Layout> ReadableSparse for SparseRef<'_, T, L> {
    type Scalar = T;

    fn rows(&self) -> usize {
        self.view.rows()
    }

    fn cols(&self) -> usize {
        self.view.cols()
    }

    fn storage_order(&self) -> StorageOrder {
        ReadableSparse::storage_order(&self.view)
    }

    fn outer_offsets(&self) -> &[usize] {
        self.view.outer_offsets()
    }

    fn inner_indices(&self) -> &[usize] {
        self.view.inner_indices()
    }

    fn values(&self) -> &[T] {
        self.view.values()
    }

    fn inner_nonzeros(&self) -> Option<&[usize]> {
        self.view.inner_nonzeros()
    }

    fn nonzeros(&self) -> usize {
        self.view.nonzeros()
    }
}

impl<T: Element, L: Layout> SparseExpr for SparseRef<'_, T, L> {
    type Scalar = T;

    const CAPS: Capabilities = Capabilities::compressed::<L>(false);

    fn rows(&self) -> usize {
        self.view.rows()
    }

    fn cols(&self) -> usize {
        self.view.cols()
    }

    fn nonzeros(&self) -> usize {
        self.view.nonzeros()
    }

    fn for_each_nonzero<F: FnMut(usize, usize, T)>(&self, f: F) {
        SparseEvaluator::new(self).for_each_nonzero(f)
    }

    fn compressed_parts(&self) -> Option<CompressedParts<'_, T>> {
        Some(self.view.parts())
    }

    fn storage_order(&self) -> StorageOrder {
        ReadableSparse::storage_order(&self.view)
    }
}

/// Compile-time gate for mutable bindings
struct MutableBinding<S: ?Sized, L>(PhantomData<(L, *const S)>);

impl<S: SparseExpr + ?Sized, L: Layout> MutableBinding<S, L> {
    const CHECK: () = match check_mutable_binding(S::CAPS, L::REQUIREMENT) {
        Ok(()) => (),
        Err(RefError::LayoutMismatch { .. }) => {
            panic!("mutable sparse reference needs a compressed source in a matching storage order")
        }
        Err(_) => panic!("mutable sparse reference needs a writable source"),
    };
}

/// Mutable reference aliasing a writable compressed source in layout `L`
///
/// Writes reach the source's stored values directly. The sparsity
/// structure is never changed through the reference.
///
/// ```
/// use spref::{ColMajor, CompressedStore, ReadableSparse, SparseRefMut, WritableSparse};
///
/// let mut store = CompressedStore::<f64, ColMajor>::from_triplets(2, 2, &[(0, 0, 1.0)]).unwrap();
/// {
///     let mut r = SparseRefMut::<f64, ColMajor>::new(&mut store);
///     *r.get_mut(0, 0).unwrap() = 5.0;
/// }
/// assert_eq!(store.get(0, 0), Some(5.0));
/// ```
///
/// A source stored in the opposite major order is rejected at compile time:
///
/// ```compile_fail
/// use spref::{ColMajor, CompressedStore, RowMajor, SparseRefMut};
///
/// let mut store = CompressedStore::<f64, RowMajor>::new(3, 3).unwrap();
/// let r = SparseRefMut::<f64, ColMajor>::new(&mut store);
/// ```
///
/// So is a source that cannot be written through:
///
/// ```compile_fail
/// use spref::{ColMajor, SparseRefMut, TripletMatrix};
///
/// let mut triplets = TripletMatrix::<f64>::new(3, 3);
/// let r = SparseRefMut::<f64, ColMajor>::new(&mut triplets);
/// ```
pub struct SparseRefMut<'a, T, L = ColMajor> {
    view: MappedViewMut<'a, T>,
    _layout: PhantomData<L>,
}

impl<'a, T: Element, L: Layout> SparseRefMut<'a, T, L> {
    /// Bind a writable source, aliasing its arrays
    ///
    /// # Panics
    ///
    /// Panics if `L` is a vector layout and the source shape is not a single
    /// row or column.
    pub fn new<S>(source: &'a mut S) -> Self
    where
        S: SparseExprMut<Scalar = T> + ?Sized,
    {
        #[allow(clippy::let_unit_value)]
        let () = MutableBinding::<S, L>::CHECK;
        assert!(
            L::check_shape(source.rows(), source.cols()).is_ok(),
            "source shape does not fit a vector layout"
        );

        let view = MappedViewMut::new(source.compressed_parts_mut());
        debug!(
            mode = Binding::Mapped.as_str(),
            rows = view.rows(),
            cols = view.cols(),
            nnz = view.nonzeros(),
            source_order = %ReadableSparse::storage_order(&view),
            target_order = %L::ORDER,
            "bound mutable sparse reference"
        );
        Self {
            view,
            _layout: PhantomData,
        }
    }

    /// Read-only view of the aliased arrays
    pub fn view(&self) -> MappedView<'_, T> {
        self.view.as_view()
    }

    /// Mutable view of the aliased arrays
    pub fn view_mut(&mut self) -> MappedViewMut<'_, T> {
        self.view.reborrow()
    }

    /// Read-only reference borrowing this one
    pub fn as_const(&self) -> SparseRef<'_, T, L> {
        SparseRef {
            view: self.view.as_view(),
            backing: Backing::Mapped,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.view.rows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.view.cols()
    }

    /// Number of live entries
    pub fn nonzeros(&self) -> usize {
        self.view.nonzeros()
    }

    /// Major order of the aliased arrays
    pub fn storage_order(&self) -> StorageOrder {
        ReadableSparse::storage_order(&self.view)
    }
}

impl<T: Element, L: Layout> std::fmt::Debug for SparseRefMut<'_, T, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseRefMut")
            .field("view", &self.view)
            .finish()
    }
}

impl<T: Element, L: Layout> ReadableSparse for SparseRefMut<'_, T, L> {
    type Scalar = T;

    fn rows(&self) -> usize {
        self.view.rows()
    }

    fn cols(&self) -> usize {
        self.view.cols()
    }

    fn storage_order(&self) -> StorageOrder {
        ReadableSparse::storage_order(&self.view)
    }

    fn outer_offsets(&self) -> &[usize] {
        self.view.outer_offsets()
    }

    fn inner_indices(&self) -> &[usize] {
        self.view.inner_indices()
    }

    fn values(&self) -> &[T] {
        self.view.values()
    }

    fn inner_nonzeros(&self) -> Option<&[usize]> {
        self.view.inner_nonzeros()
    }

    fn nonzeros(&self) -> usize {
        self.view.nonzeros()
    }
}

impl<T: Element, L: Layout> WritableSparse for SparseRefMut<'_, T, L> {
    fn parts_mut(&mut self) -> CompressedPartsMut<'_, T> {
        self.view.parts_mut()
    }
}

impl<T: Element, L: Layout> SparseExpr for SparseRefMut<'_, T, L> {
    type Scalar = T;

    const CAPS: Capabilities = Capabilities::compressed::<L>(true);

    fn rows(&self) -> usize {
        self.view.rows()
    }

    fn cols(&self) -> usize {
        self.view.cols()
    }

    fn nonzeros(&self) -> usize {
        self.view.nonzeros()
    }

    fn for_each_nonzero<F: FnMut(usize, usize, T)>(&self, f: F) {
        SparseEvaluator::new(self).for_each_nonzero(f)
    }

    fn compressed_parts(&self) -> Option<CompressedParts<'_, T>> {
        Some(self.view.parts())
    }

    fn storage_order(&self) -> StorageOrder {
        ReadableSparse::storage_order(&self.view)
    }
}

impl<T: Element, L: Layout> SparseExprMut for SparseRefMut<'_, T, L> {
    fn compressed_parts_mut(&mut self) -> CompressedPartsMut<'_, T> {
        self.view.parts_mut()
    }
}

/// A reference that has not been bound yet
///
/// Holds the required layout and the bind configuration. Binding consumes
/// it, so a reference is bound exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbound<T, L = ColMajor> {
    config: BindConfig,
    _marker: PhantomData<fn() -> (T, L)>,
}

impl<T: Element, L: Layout> Unbound<T, L> {
    pub fn new() -> Self {
        Self::with_config(BindConfig::default())
    }

    pub fn with_config(config: BindConfig) -> Self {
        Self {
            config,
            _marker: PhantomData,
        }
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Bind a const reference to `source`
    pub fn bind<S>(self, source: &S) -> Result<SparseRef<'_, T, L>>
    where
        S: SparseExpr<Scalar = T> + ?Sized,
    {
        SparseRef::with_config(source, &self.config)
    }

    /// Bind a mutable reference to `source`
    ///
    /// Mutable references always alias, so the alias/copy policy does not
    /// apply to them.
    pub fn bind_mut<S>(self, source: &mut S) -> SparseRefMut<'_, T, L>
    where
        S: SparseExprMut<Scalar = T> + ?Sized,
    {
        SparseRefMut::new(source)
    }
}
