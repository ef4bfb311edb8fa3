//! Comparator adaptation.
//!
//! Every ordering decision in this crate goes through [`TreeOrd`]. Primitive
//! types get their natural order, floats get the IEEE 754 total order, and a
//! custom element type implements the trait itself to supply a bespoke
//! three-way comparison. A tree must see one consistent strategy for its
//! element type over its whole lifetime.

use std::cmp::Ordering;

/// Three-way comparison used by the trees and the sorted-slice routines.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use ordtree::TreeOrd;
///
/// struct Celsius(f64);
///
/// impl TreeOrd for Celsius {
///     fn tree_cmp(&self, other: &Self) -> Ordering {
///         self.0.total_cmp(&other.0)
///     }
/// }
///
/// assert_eq!(Celsius(20.0).tree_cmp(&Celsius(21.5)), Ordering::Less);
/// ```
pub trait TreeOrd {
    /// Compares `self` against `other`, returning where `self` sorts.
    fn tree_cmp(&self, other: &Self) -> Ordering;
}

macro_rules! natural_ord {
    ($($t:ty),* $(,)?) => {$(
        impl TreeOrd for $t {
            fn tree_cmp(&self, other: &Self) -> Ordering {
                self.cmp(other)
            }
        }
    )*};
}

natural_ord!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String, &str,
);

impl TreeOrd for f32 {
    fn tree_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl TreeOrd for f64 {
    fn tree_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}
