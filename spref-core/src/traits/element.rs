//! Scalar types that can be stored in sparse matrices
//!
//! This module defines the trait that constrains what types can be
//! stored as values in compressed sparse storage.

use core::fmt::Debug;
use core::ops::{Add, Mul};

use bytemuck::{Pod, Zeroable};

/// Trait for types that can be stored as sparse matrix values
///
/// Element types must be plain old data so that value arrays can be
/// aliased and copied freely:
/// - Pod: Copy, no padding, any bit pattern valid
/// - PartialEq + Debug: Can be compared and printed in tests
/// - Add: Duplicate coordinates are summed during materialization
/// - Mul: Scaled expressions multiply by a factor
pub trait Element:
    Pod + PartialEq + Debug + Send + Sync + Add<Output = Self> + Mul<Output = Self>
{
    /// The implicit value of positions that are not stored
    #[inline]
    fn zero() -> Self {
        <Self as Zeroable>::zeroed()
    }
}

macro_rules! impl_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {}
        )*
    };
}

impl_element!(f32, f64, i32, i64, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_all_bits_clear() {
        assert_eq!(f64::zero(), 0.0);
        assert_eq!(i32::zero(), 0);
        assert_eq!(u64::zero(), 0);
    }

    fn sum_of_products<T: Element>(pairs: &[(T, T)]) -> T {
        pairs.iter().fold(T::zero(), |acc, &(a, b)| acc + a * b)
    }

    #[test]
    fn test_arithmetic_bounds_cover_scalars() {
        assert_eq!(sum_of_products(&[(2.0f32, 3.0), (1.0, 0.5)]), 6.5);
        assert_eq!(sum_of_products(&[(-2i64, 3), (4, 1)]), -2);
        assert_eq!(sum_of_products::<u32>(&[]), 0);
    }
}
