//! spref - Zero-copy or owned-copy references to compressed sparse matrices
//!
//! A `SparseRef` binds to a sparse expression in a fixed storage layout. If
//! the source already keeps compressed arrays in a compatible layout the
//! reference aliases them; otherwise the expression is evaluated once into
//! an owned compressed copy. Downstream code reads both cases through the
//! same interface and never needs to know which one it got.
//!
//! ## Architecture
//!
//! - **spref-core**: layouts, the compatibility predicate, errors, validation
//!   and the read/write and source traits (no allocation)
//! - **spref**: owned stores, mapped views, the binding front-end and the
//!   evaluator
//!
//! ## Quick Start
//!
//! ```rust
//! use spref::{ColMajor, CompressedStore, ReadableSparse, RowMajor, SparseRef};
//!
//! fn example() -> spref::Result<()> {
//!     let store = CompressedStore::<f64, RowMajor>::from_triplets(
//!         3,
//!         3,
//!         &[(0, 0, 1.0), (0, 2, 2.0), (1, 1, 3.0), (2, 2, 4.0)],
//!     )?;
//!
//!     // Compatible layout: no allocation, reads go straight to `store`
//!     let mapped = SparseRef::<f64, RowMajor>::new(&store);
//!     assert!(mapped.is_mapped());
//!
//!     // Incompatible layout: evaluated into an owned column-major copy
//!     let owned = SparseRef::<f64, ColMajor>::new(&store);
//!     assert!(owned.is_owned());
//!     assert_eq!(owned.get(0, 2), Some(2.0));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! ## Features
//!
//! - **Mapped views**: O(1) binding onto borrowed arrays
//! - **Owned-copy fallback**: counting-sort evaluation of any expression
//! - **Compile-time checks**: mutable references reject read-only or
//!   mismatched sources at build time
//! - **serde**: optional (de)serialization of `CompressedStore`, validated on load

// Re-export core abstractions
pub use spref_core::{
    // Layouts and the compatibility predicate
    check_mutable_binding, layout_matches, Capabilities, ColMajor, ColVector, Layout, Requirement,
    RowMajor, RowVector, StorageOrder,
    // Traits
    CompressedParts, CompressedPartsMut, Element, InnerIter, InnerIterMut, ReadableSparse,
    SparseExpr, SparseExprMut, WritableSparse,
    // Error handling
    RefError, Result,
    // Validation utilities
    check_position, validate_parts, validate_slice,
};

// Implementation modules
pub mod config;
pub mod evaluator;
pub mod expr;
mod owned;
pub mod reference;
pub mod store;
pub mod view;

// Public exports
pub use config::{BindConfig, BindPolicy};
pub use evaluator::{Evaluate, SparseEvaluator};
pub use expr::{Scaled, SparseExprExt, Transpose, TripletMatrix};
pub use reference::{Binding, SparseRef, SparseRefMut, Unbound};
pub use store::CompressedStore;
pub use view::{MappedView, MappedViewMut};
