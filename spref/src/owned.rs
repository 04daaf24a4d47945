//! Owned-copy fallback
//!
//! Evaluates any sparse expression into a fresh `CompressedStore` in the
//! requested layout. Sources already compressed in that order are copied
//! slice by slice. Everything else goes through a counting pass over the
//! outer dimension and a scatter pass, after which out-of-order slices are
//! sorted and duplicate coordinates summed.

use spref_core::{CompressedParts, Element, Layout, SparseExpr};
use tracing::trace;

use crate::store::CompressedStore;

/// Materialize `source` into a compressed store with layout `L`
///
/// The result is always compressed, with strictly ascending inner indices
/// in every outer slice.
pub(crate) fn materialize<S, L>(source: &S) -> CompressedStore<S::Scalar, L>
where
    S: SparseExpr + ?Sized,
    L: Layout,
{
    if let Some(parts) = source.compressed_parts() {
        if parts.order == L::ORDER {
            return pack(&parts);
        }
    }
    scatter(source)
}

/// Copy compressed arrays of the same order, dropping any slack
fn pack<T: Element, L: Layout>(parts: &CompressedParts<'_, T>) -> CompressedStore<T, L> {
    let outer_size = parts.outer_size();
    let nnz = parts.nonzeros();
    let mut outer_offsets = Vec::with_capacity(outer_size + 1);
    let mut inner_indices = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);

    outer_offsets.push(0);
    for outer in 0..outer_size {
        let range = spref_core::outer_range_of(parts.outer_offsets, parts.inner_nonzeros, outer);
        inner_indices.extend_from_slice(&parts.inner_indices[range.clone()]);
        values.extend_from_slice(&parts.values[range]);
        outer_offsets.push(inner_indices.len());
    }

    trace!(entries = nnz, outer_size, "packed compressed source");
    CompressedStore::from_parts_unchecked(
        parts.rows,
        parts.cols,
        outer_offsets,
        inner_indices,
        values,
        None,
    )
}

/// Evaluate an arbitrary expression through counting sort on the outer index
fn scatter<S, L>(source: &S) -> CompressedStore<S::Scalar, L>
where
    S: SparseExpr + ?Sized,
    L: Layout,
{
    let order = L::ORDER;
    let rows = source.rows();
    let cols = source.cols();
    let outer_size = order.outer_size(rows, cols);

    // Single pass over the source; expressions may be costly to re-evaluate
    let mut entries: Vec<(usize, usize, S::Scalar)> = Vec::with_capacity(source.nonzeros());
    source.for_each_nonzero(|row, col, value| {
        let (outer, inner) = order.to_outer_inner(row, col);
        entries.push((outer, inner, value));
    });

    let mut outer_offsets = vec![0usize; outer_size + 1];
    for &(outer, _, _) in &entries {
        outer_offsets[outer + 1] += 1;
    }
    for outer in 0..outer_size {
        outer_offsets[outer + 1] += outer_offsets[outer];
    }

    let total = entries.len();
    let mut cursor = outer_offsets[..outer_size].to_vec();
    let mut inner_indices = vec![0usize; total];
    let mut values = vec![S::Scalar::zero(); total];
    for (outer, inner, value) in entries {
        let slot = cursor[outer];
        inner_indices[slot] = inner;
        values[slot] = value;
        cursor[outer] += 1;
    }

    let mut sorted_slices = 0usize;
    for outer in 0..outer_size {
        let range = outer_offsets[outer]..outer_offsets[outer + 1];
        if is_strictly_ascending(&inner_indices[range.clone()]) {
            continue;
        }
        sort_slice(&mut inner_indices[range.clone()], &mut values[range]);
        sorted_slices += 1;
    }

    let merged = if sorted_slices > 0 {
        sum_duplicates(&mut outer_offsets, &mut inner_indices, &mut values)
    } else {
        0
    };

    trace!(
        entries = total,
        sorted_slices,
        merged,
        outer_size,
        "materialized sparse expression"
    );
    CompressedStore::from_parts_unchecked(rows, cols, outer_offsets, inner_indices, values, None)
}

fn is_strictly_ascending(indices: &[usize]) -> bool {
    indices.windows(2).all(|w| w[0] < w[1])
}

/// Stable sort of one slice by inner index
fn sort_slice<T: Element>(indices: &mut [usize], values: &mut [T]) {
    let mut pairs: Vec<(usize, T)> = indices.iter().copied().zip(values.iter().copied()).collect();
    pairs.sort_by_key(|&(index, _)| index);
    for (k, (index, value)) in pairs.into_iter().enumerate() {
        indices[k] = index;
        values[k] = value;
    }
}

/// Fold equal neighbours within each slice and close the gaps
///
/// Returns the number of entries merged away.
fn sum_duplicates<T: Element>(
    outer_offsets: &mut [usize],
    inner_indices: &mut Vec<usize>,
    values: &mut Vec<T>,
) -> usize {
    let outer_size = outer_offsets.len() - 1;
    let mut write = 0usize;
    let mut start = outer_offsets[0];
    for outer in 0..outer_size {
        let end = outer_offsets[outer + 1];
        let slice_start = write;
        for read in start..end {
            let index = inner_indices[read];
            let value = values[read];
            if write > slice_start && inner_indices[write - 1] == index {
                values[write - 1] = values[write - 1] + value;
            } else {
                inner_indices[write] = index;
                values[write] = value;
                write += 1;
            }
        }
        outer_offsets[outer] = slice_start;
        start = end;
    }
    outer_offsets[outer_size] = write;

    let merged = inner_indices.len() - write;
    inner_indices.truncate(write);
    values.truncate(write);
    merged
}
