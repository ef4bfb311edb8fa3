//! Intersection of sorted sequences.

use std::cmp::Ordering;

use crate::cmp::TreeOrd;

/// Intersects two ascending slices with a two-pointer merge: advance the
/// cursor over the lesser-valued side; on equality emit the value once and
/// advance both. Runs in `O(a.len() + b.len())`.
///
/// # Examples
///
/// ```
/// use ordtree::intersect::intersection_sorted;
///
/// assert_eq!(intersection_sorted(&[1, 2, 3], &[-1, 0, 1]), vec![1]);
/// assert_eq!(intersection_sorted::<i32>(&[], &[1, 2, 3]), vec![]);
/// ```
pub fn intersection_sorted<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: TreeOrd + Clone,
{
    let mut intersection = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].tree_cmp(&b[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                intersection.push(a[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    intersection
}
