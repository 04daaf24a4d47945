use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spref::{
    layout_matches, BindConfig, Binding, Capabilities, ColMajor, ColVector, CompressedParts,
    CompressedStore, Evaluate, Layout, ReadableSparse, RefError, Requirement, RowMajor, RowVector,
    SparseEvaluator, SparseExpr, SparseRef, SparseRefMut, StorageOrder, TripletMatrix, Unbound,
    WritableSparse,
};

fn dense<S: ReadableSparse<Scalar = f64>>(m: &S) -> Vec<Vec<f64>> {
    (0..m.rows())
        .map(|r| (0..m.cols()).map(|c| m.coeff(r, c)).collect())
        .collect()
}

fn random_triplets(rng: &mut StdRng, rows: usize, cols: usize, count: usize) -> Vec<(usize, usize, f64)> {
    (0..count)
        .map(|_| {
            (
                rng.gen_range(0..rows),
                rng.gen_range(0..cols),
                f64::from(rng.gen_range(1..100u32)),
            )
        })
        .collect()
}

#[test]
fn scenario_row_major_bound_as_column_major() {
    // [1 0 2]
    // [0 3 0]
    // [0 0 4]
    let store = CompressedStore::<f64, RowMajor>::from_raw_parts(
        3,
        3,
        vec![0, 2, 3, 4],
        vec![0, 2, 1, 2],
        vec![1.0, 2.0, 3.0, 4.0],
    )
    .unwrap();

    let r = SparseRef::<f64, ColMajor>::new(&store);
    assert_eq!(r.binding(), Binding::Owned);
    assert_eq!(r.storage_order(), StorageOrder::ColMajor);
    assert_eq!(r.nonzeros(), 4);
    assert_eq!(r.outer_offsets(), &[0, 1, 2, 4]);
    assert_eq!(r.inner_indices(), &[0, 1, 0, 2]);
    assert_eq!(r.values(), &[1.0, 3.0, 2.0, 4.0]);
    assert_eq!(dense(&r), dense(&store));
}

#[test]
fn scenario_column_vector_bound_as_row_major() {
    let v = CompressedStore::<f64, ColVector>::from_triplets(5, 1, &[(0, 0, 1.0), (2, 0, 3.0), (4, 0, 5.0)])
        .unwrap();
    let r = SparseRef::<f64, RowMajor>::new(&v);
    assert_eq!(r.binding(), Binding::Mapped);
    assert_eq!(r.view().values_ptr(), v.values().as_ptr());
    assert_eq!((r.rows(), r.cols()), (5, 1));
    assert_eq!(dense(&r), dense(&v));
}

#[test]
fn predicate_agrees_with_binding_mode() {
    let caps = Capabilities::compressed::<RowMajor>(true);
    assert!(layout_matches(caps, Requirement::of::<RowMajor>()));
    assert!(!layout_matches(caps, Requirement::of::<ColMajor>()));
    assert!(layout_matches(caps, Requirement::of::<ColVector>()));
    assert!(!layout_matches(TripletMatrix::<f64>::CAPS, RowMajor::REQUIREMENT));

    let store = CompressedStore::<f64, RowMajor>::from_triplets(1, 4, &[(0, 1, 2.0)]).unwrap();
    assert!(SparseRef::<f64, RowMajor>::new(&store).is_mapped());
    assert!(SparseRef::<f64, RowVector>::new(&store).is_mapped());
    assert!(SparseRef::<f64, ColMajor>::new(&store).is_owned());
}

#[test]
fn random_stores_read_back_identically() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let rows = rng.gen_range(1..12);
        let cols = rng.gen_range(1..12);
        let count = rng.gen_range(0..rows * cols);
        let triplets = random_triplets(&mut rng, rows, cols, count);
        let store = CompressedStore::<f64, RowMajor>::from_triplets(rows, cols, &triplets).unwrap();
        let snapshot = store.clone();

        let mapped = SparseRef::<f64, RowMajor>::new(&store);
        let owned = SparseRef::<f64, ColMajor>::new(&store);
        assert!(mapped.is_mapped());
        assert!(owned.is_owned());
        assert_eq!(dense(&mapped), dense(&store));
        assert_eq!(dense(&owned), dense(&store));
        assert_eq!(owned.nonzeros(), store.nonzeros());

        // Source untouched by either binding
        assert_eq!(store.values(), snapshot.values());
        assert_eq!(store.inner_indices(), snapshot.inner_indices());
    }
}

#[test]
fn triplets_match_dense_accumulation() {
    let mut rng = StdRng::seed_from_u64(17);
    let (rows, cols) = (6, 9);
    let triplets = random_triplets(&mut rng, rows, cols, 80);

    let mut expected = vec![vec![0.0; cols]; rows];
    let mut list = TripletMatrix::new(rows, cols);
    for &(r, c, v) in &triplets {
        expected[r][c] += v;
        list.push(r, c, v).unwrap();
    }

    let from_slice = CompressedStore::<f64, ColMajor>::from_triplets(rows, cols, &triplets).unwrap();
    let from_list = SparseRef::<f64, RowMajor>::new(&list);
    assert_eq!(dense(&from_slice), expected);
    assert_eq!(dense(&from_list), expected);
}

type Summary = (usize, usize, (usize, usize), Vec<(usize, usize, f64)>);

fn summarize<S: ReadableSparse<Scalar = f64>>(e: SparseEvaluator<'_, S>) -> Summary {
    let mut seen = Vec::new();
    e.for_each_nonzero(|r, c, v| seen.push((r, c, v)));
    (e.nonzeros(), e.outer_size(), e.outer_bounds(1), seen)
}

#[test]
fn evaluator_hides_binding_mode() {
    let store = CompressedStore::<f64, ColMajor>::from_triplets(
        4,
        4,
        &[(3, 0, 1.0), (0, 1, 2.0), (2, 1, 3.0), (1, 3, 4.0)],
    )
    .unwrap();
    let mapped = SparseRef::<f64, ColMajor>::new(&store);
    let owned = SparseRef::<f64, ColMajor>::with_config(&store, &BindConfig::always_copy()).unwrap();
    assert!(owned.is_owned());

    assert_eq!(summarize(mapped.evaluator()), summarize(owned.evaluator()));
}

#[test]
fn write_through_reaches_source() {
    let mut store = CompressedStore::<f64, ColMajor>::from_triplets(3, 3, &[(0, 0, 1.0), (2, 1, 2.0)]).unwrap();
    {
        let mut r = SparseRefMut::<f64, ColMajor>::new(&mut store);
        *r.get_mut(2, 1).unwrap() = 20.0;
        for (_, v) in r.inner_iter_mut(0) {
            *v *= 10.0;
        }
    }
    assert_eq!(store.get(0, 0), Some(10.0));
    assert_eq!(store.get(2, 1), Some(20.0));
}

#[test]
fn owned_clone_is_independent() {
    let store = CompressedStore::<f64, RowMajor>::from_triplets(2, 2, &[(0, 1, 1.0), (1, 0, 2.0)]).unwrap();
    let original = SparseRef::<f64, ColMajor>::new(&store);
    let copy = original.clone();
    assert_ne!(copy.view().values_ptr(), original.view().values_ptr());

    let mut detached = copy.into_owned();
    detached.insert(0, 0, 5.0).unwrap();
    assert_eq!(original.get(0, 0), None);
    assert_eq!(detached.get(0, 0), Some(5.0));
}

#[test]
fn references_rebind_to_other_layouts() {
    let mut store = CompressedStore::<f64, RowMajor>::from_triplets(2, 3, &[(0, 2, 1.0), (1, 0, 2.0)]).unwrap();
    let mut outer = SparseRefMut::<f64, RowMajor>::new(&mut store);
    {
        let mut inner = SparseRefMut::<f64, RowMajor>::new(&mut outer);
        *inner.get_mut(1, 0).unwrap() = 7.0;
    }
    let flipped = SparseRef::<f64, ColMajor>::new(&outer);
    assert!(flipped.is_owned());
    assert_eq!(flipped.get(1, 0), Some(7.0));
    drop(flipped);
    drop(outer);
    assert_eq!(store.get(1, 0), Some(7.0));
}

#[test]
fn uncompressed_source_binds_mapped() {
    let mut store = CompressedStore::<f64, RowMajor>::new(3, 4).unwrap();
    store.insert(2, 3, 1.0).unwrap();
    store.insert(0, 1, 2.0).unwrap();
    store.insert(2, 0, 3.0).unwrap();
    assert!(!store.is_compressed());

    let mapped = SparseRef::<f64, RowMajor>::new(&store);
    assert!(mapped.is_mapped());
    assert!(!mapped.is_compressed());
    assert_eq!(mapped.nonzeros(), 3);
    let row2: Vec<_> = mapped.inner_iter(2).collect();
    assert_eq!(row2, vec![(0, 3.0), (3, 1.0)]);

    let owned = mapped.to_owned_store();
    assert!(owned.is_compressed());
    assert_eq!(owned.values().len(), 3);
    assert_eq!(dense(&owned), dense(&store));
}

/// Compressed source handing out arbitrary arrays
struct RawSource {
    offsets: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseExpr for RawSource {
    type Scalar = f64;

    const CAPS: Capabilities = Capabilities::compressed::<RowMajor>(false);

    fn rows(&self) -> usize {
        self.offsets.len() - 1
    }

    fn cols(&self) -> usize {
        4
    }

    fn nonzeros(&self) -> usize {
        self.values.len()
    }

    fn for_each_nonzero<F: FnMut(usize, usize, f64)>(&self, mut f: F) {
        for row in 0..self.rows() {
            for k in self.offsets[row]..self.offsets[row + 1] {
                f(row, self.indices[k], self.values[k]);
            }
        }
    }

    fn compressed_parts(&self) -> Option<CompressedParts<'_, f64>> {
        Some(CompressedParts {
            rows: self.rows(),
            cols: self.cols(),
            order: StorageOrder::RowMajor,
            outer_offsets: &self.offsets,
            inner_indices: &self.indices,
            values: &self.values,
            inner_nonzeros: None,
        })
    }
}

#[test]
fn validation_rejects_malformed_sources() {
    let bad = RawSource {
        offsets: vec![0, 2, 3],
        indices: vec![3, 1, 0],
        values: vec![1.0, 2.0, 3.0],
    };
    let config = BindConfig::default().with_validation(true);
    let err = SparseRef::<f64, RowMajor>::with_config(&bad, &config).unwrap_err();
    assert_eq!(err, RefError::UnsortedInner { outer: 0 });

    // Copying never aliases the arrays, so validation is skipped
    let copied = SparseRef::<f64, ColMajor>::with_config(&bad, &config).unwrap();
    assert_eq!(copied.get(0, 3), Some(1.0));
    assert_eq!(copied.get(0, 1), Some(2.0));

    let good = RawSource {
        offsets: vec![0, 2, 3],
        indices: vec![1, 3, 0],
        values: vec![1.0, 2.0, 3.0],
    };
    let r = Unbound::<f64, RowMajor>::with_config(config).bind(&good).unwrap();
    assert!(r.is_mapped());
}

#[test]
#[should_panic(expected = "inner index and value arrays differ in length")]
fn mapped_binding_rejects_short_value_array() {
    let short = RawSource {
        offsets: vec![0, 2, 3],
        indices: vec![1, 3, 0],
        values: vec![1.0],
    };
    let _ = SparseRef::<f64, RowMajor>::new(&short);
}

#[test]
fn constructors_report_structural_errors() {
    let err = CompressedStore::<f64, ColMajor>::from_raw_parts(2, 2, vec![0, 1, 3], vec![0, 1], vec![1.0, 2.0])
        .unwrap_err();
    assert_eq!(err, RefError::SliceOverflow { outer: 1 });

    let err =
        CompressedStore::<f64, ColMajor>::from_raw_parts(2, 2, vec![0, 1, 2], vec![0, 2], vec![1.0, 2.0])
            .unwrap_err();
    assert_eq!(
        err,
        RefError::InnerIndexOutOfBounds {
            outer: 1,
            index: 2,
            bound: 2
        }
    );

    let err = CompressedStore::<f64, ColVector>::from_triplets(2, 2, &[]).unwrap_err();
    assert_eq!(err, RefError::NotAVector { rows: 2, cols: 2 });
}
