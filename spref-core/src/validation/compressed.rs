//! Invariant checks for compressed arrays
//!
//! A set of compressed arrays is valid when:
//! - the outer offsets have `outer_size + 1` entries and never decrease
//! - inner index and value arrays have the same length
//! - every outer slice fits inside the arrays (and inside the room up to the
//!   next offset, for uncompressed storage)
//! - inner indices of each slice are strictly ascending and below the inner size

use super::bounds::checked_outer_end;
use crate::error::RefError;
use crate::traits::CompressedParts;

/// Validate the inner indices of a single outer slice
///
/// Indices must be strictly ascending (hence unique) and below `inner_size`.
pub fn validate_slice(outer: usize, indices: &[usize], inner_size: usize) -> Result<(), RefError> {
    let mut previous: Option<usize> = None;
    for &index in indices {
        if index >= inner_size {
            return Err(RefError::InnerIndexOutOfBounds {
                outer,
                index,
                bound: inner_size,
            });
        }
        if previous.is_some_and(|p| p >= index) {
            return Err(RefError::UnsortedInner { outer });
        }
        previous = Some(index);
    }
    Ok(())
}

/// Validate a full set of compressed arrays
///
/// Returns the number of live entries on success.
pub fn validate_parts<T>(parts: &CompressedParts<'_, T>) -> Result<usize, RefError> {
    let outer_size = parts.outer_size();
    let inner_size = parts.inner_size();
    let offsets = parts.outer_offsets;

    if offsets.len() != outer_size + 1 {
        return Err(RefError::OuterOffsetsLength {
            expected: outer_size + 1,
            got: offsets.len(),
        });
    }

    if parts.inner_indices.len() != parts.values.len() {
        return Err(RefError::ArrayLengthMismatch {
            indices: parts.inner_indices.len(),
            values: parts.values.len(),
        });
    }

    for outer in 0..outer_size {
        if offsets[outer] > offsets[outer + 1] {
            return Err(RefError::DecreasingOffsets { outer });
        }
    }

    let capacity = parts.inner_indices.len();
    if offsets[outer_size] > capacity {
        return Err(RefError::SliceOverflow {
            outer: outer_size.saturating_sub(1),
        });
    }

    if let Some(counts) = parts.inner_nonzeros {
        if counts.len() != outer_size {
            return Err(RefError::InnerNonZerosLength {
                expected: outer_size,
                got: counts.len(),
            });
        }
    }

    let mut nnz = 0usize;
    for outer in 0..outer_size {
        let start = offsets[outer];
        let end = match parts.inner_nonzeros {
            Some(counts) => checked_outer_end(outer, start, counts[outer], offsets[outer + 1])?,
            None => offsets[outer + 1],
        };
        validate_slice(outer, &parts.inner_indices[start..end], inner_size)?;
        nnz += end - start;
    }

    Ok(nnz)
}
