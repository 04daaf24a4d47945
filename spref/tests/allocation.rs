//! Binding a compatible source must not touch the heap

use std::alloc::{GlobalAlloc, Layout as AllocLayout, System};
use std::cell::Cell;

use spref::{
    ColMajor, ColVector, CompressedStore, ReadableSparse, RowMajor, SparseExprExt, SparseRef,
    SparseRefMut, WritableSparse,
};

struct CountingAlloc;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

fn bump() {
    let _ = ALLOCATIONS.try_with(|count| count.set(count.get() + 1));
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: AllocLayout) -> *mut u8 {
        bump();
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: AllocLayout) -> *mut u8 {
        bump();
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: AllocLayout, new_size: usize) -> *mut u8 {
        bump();
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: AllocLayout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

/// Run `f` and count heap allocations made on this thread meanwhile
fn allocations_during<R>(f: impl FnOnce() -> R) -> (R, usize) {
    let before = ALLOCATIONS.with(Cell::get);
    let result = f();
    let after = ALLOCATIONS.with(Cell::get);
    (result, after - before)
}

fn row_major() -> CompressedStore<f64, RowMajor> {
    CompressedStore::from_triplets(3, 3, &[(0, 0, 1.0), (0, 2, 2.0), (1, 1, 3.0), (2, 2, 4.0)])
        .unwrap()
}

#[test]
fn mapped_binding_does_not_allocate() {
    let store = row_major();
    // First bind registers the logging callsite
    drop(SparseRef::<f64, RowMajor>::new(&store));

    let (r, count) = allocations_during(|| SparseRef::<f64, RowMajor>::new(&store));
    assert_eq!(count, 0);
    assert!(r.is_mapped());
    assert_eq!(r.get(1, 1), Some(3.0));
}

#[test]
fn vector_across_orders_does_not_allocate() {
    let v = CompressedStore::<f64, ColVector>::from_triplets(5, 1, &[(0, 0, 1.0), (3, 0, 4.0)]).unwrap();
    drop(SparseRef::<f64, RowMajor>::new(&v));

    let (r, count) = allocations_during(|| SparseRef::<f64, RowMajor>::new(&v));
    assert_eq!(count, 0);
    assert!(r.is_mapped());
    assert_eq!(r.coeff(3, 0), 4.0);
}

#[test]
fn transpose_binding_does_not_allocate() {
    let store = row_major();
    let t = store.transpose();
    drop(SparseRef::<f64, ColMajor>::new(&t));

    let (r, count) = allocations_during(|| SparseRef::<f64, ColMajor>::new(&t));
    assert_eq!(count, 0);
    assert_eq!(r.get(2, 0), Some(2.0));
}

#[test]
fn mapped_clone_does_not_allocate() {
    let store = row_major();
    let r = SparseRef::<f64, RowMajor>::new(&store);

    let (copy, count) = allocations_during(|| r.clone());
    assert_eq!(count, 0);
    assert!(copy.is_mapped());
}

#[test]
fn mutable_binding_does_not_allocate() {
    let mut store = row_major();
    drop(SparseRefMut::<f64, RowMajor>::new(&mut store));

    let ((), count) = allocations_during(|| {
        let mut r = SparseRefMut::<f64, RowMajor>::new(&mut store);
        if let Some(v) = r.get_mut(2, 2) {
            *v = 40.0;
        }
    });
    assert_eq!(count, 0);
    assert_eq!(store.get(2, 2), Some(40.0));
}

#[test]
fn owned_binding_allocates() {
    let store = row_major();
    let (r, count) = allocations_during(|| SparseRef::<f64, ColMajor>::new(&store));
    assert!(count > 0);
    assert!(r.is_owned());

    let (copy, count) = allocations_during(|| r.clone());
    assert!(count > 0);
    assert!(copy.is_owned());
}
