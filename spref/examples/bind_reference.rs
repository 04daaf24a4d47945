//! Bind references to a few sources and show how each one was resolved

use spref::{
    BindConfig, ColMajor, ColVector, CompressedStore, ReadableSparse, RowMajor, SparseExprExt,
    SparseRef, SparseRefMut, TripletMatrix, WritableSparse,
};

fn describe<S: ReadableSparse<Scalar = f64>>(name: &str, binding: impl std::fmt::Display, m: &S) {
    println!(
        "{name:<28} {binding:<7} {}x{} nnz={} order={}",
        m.rows(),
        m.cols(),
        m.nonzeros(),
        m.storage_order()
    );
}

fn main() -> spref::Result<()> {
    let mut store = CompressedStore::<f64, RowMajor>::from_triplets(
        3,
        3,
        &[(0, 0, 1.0), (0, 2, 2.0), (1, 1, 3.0), (2, 2, 4.0)],
    )?;

    println!("Binding references to a 3x3 row-major store:");
    let same = SparseRef::<f64, RowMajor>::new(&store);
    describe("row-major -> row-major", same.binding(), &same);

    let flipped = SparseRef::<f64, ColMajor>::new(&store);
    describe("row-major -> col-major", flipped.binding(), &flipped);

    let transposed = store.transpose();
    let through_transpose = SparseRef::<f64, ColMajor>::new(&transposed);
    describe("transpose -> col-major", through_transpose.binding(), &through_transpose);

    let scaled = store.scaled(0.5);
    let halved = SparseRef::<f64, RowMajor>::new(&scaled);
    describe("scaled -> row-major", halved.binding(), &halved);

    let copied = SparseRef::<f64, RowMajor>::with_config(&store, &BindConfig::always_copy())?;
    describe("always copy", copied.binding(), &copied);

    println!("\nVectors ignore major order:");
    let column = CompressedStore::<f64, ColVector>::from_triplets(5, 1, &[(1, 0, 7.0), (4, 0, 9.0)])?;
    let as_rows = SparseRef::<f64, RowMajor>::new(&column);
    describe("col vector -> row-major", as_rows.binding(), &as_rows);

    println!("\nCoordinate lists are always evaluated:");
    let mut list = TripletMatrix::new(2, 2);
    list.push(0, 1, 1.0)?;
    list.push(0, 1, 2.0)?;
    let from_list = SparseRef::<f64, ColMajor>::new(&list);
    describe("triplets -> col-major", from_list.binding(), &from_list);
    println!("   (0, 1) = {}", from_list.coeff(0, 1));

    println!("\nWriting through a mutable reference:");
    {
        let mut writer = SparseRefMut::<f64, RowMajor>::new(&mut store);
        for value in writer.values_mut() {
            *value *= 10.0;
        }
    }
    for (row, entries) in (0..store.rows()).map(|r| (r, store.inner_iter(r))) {
        let entries: Vec<_> = entries.collect();
        println!("   row {row}: {entries:?}");
    }

    Ok(())
}
