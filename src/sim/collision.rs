//! Axis-aligned overlap tests
//!
//! Overlap is a binary trigger: there is no push-out or bounce. Touching
//! edges do not count, only intersections with non-zero area.

use super::entity::Bounds;

/// True iff the two bounding boxes intersect with non-zero area
#[inline]
pub fn overlaps(a: &impl Bounds, b: &impl Bounds) -> bool {
    let a = a.bounds();
    let b = b.bounds();
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Index of the first candidate (in collection order) overlapping `subject`
pub fn first_overlap<T: Bounds>(subject: &impl Bounds, candidates: &[T]) -> Option<usize> {
    candidates.iter().position(|c| overlaps(subject, c))
}
