//! Position and offset bounds checks
//!
//! Pure arithmetic helpers with overflow protection.

use crate::error::RefError;

/// Validate that `(row, col)` lies inside a `rows x cols` matrix
pub const fn check_position(row: usize, col: usize, rows: usize, cols: usize) -> Result<(), RefError> {
    if row >= rows || col >= cols {
        return Err(RefError::IndexOutOfBounds {
            row,
            col,
            rows,
            cols,
        });
    }
    Ok(())
}

/// End of an outer slice holding `count` entries from `start`
///
/// Fails with [`RefError::SliceOverflow`] if the sum overflows or runs past
/// `limit`.
pub const fn checked_outer_end(
    outer: usize,
    start: usize,
    count: usize,
    limit: usize,
) -> Result<usize, RefError> {
    match start.checked_add(count) {
        Some(end) if end <= limit => Ok(end),
        _ => Err(RefError::SliceOverflow { outer }),
    }
}
