//! Ordered, mutable binary search trees where every node is a handle into
//! the whole structure.
//!
//! ## The linked tree
//!
//! [`linked::Tree`] is the centerpiece. Each of its nodes carries a non-owning
//! back-reference to its parent and the size of its own subtree, which buys a
//! few things a plain child-pointer BST cannot offer:
//!
//! 1. In-order navigation from any node: [`Node::previous`][linked::Node::previous]
//!    and [`Node::next`][linked::Node::next] step through the *whole* tree in
//!    sorted order, no matter where the node sits.
//! 2. Rank selection: [`Node::at`][linked::Node::at] finds the i-th smallest
//!    element of a subtree by steering on left-subtree sizes.
//! 3. Edits from anywhere: a [`CursorMut`][linked::CursorMut] can delete the
//!    node it points at, and ancestor sizes are repaired by walking the parent
//!    chain back to the root.
//!
//! The most important invariants are:
//!
//! 1. For every node, all values in its left subtree compare strictly less
//!    than its own value, and all values in its right subtree compare
//!    greater-or-equal. Duplicates are routed right, so in-order iteration is
//!    non-decreasing and equal values keep their insertion order.
//! 2. For every node, `size == 1 + size(left) + size(right)`.
//! 3. Exactly one node has no parent; every other node is pointed at by the
//!    left or right link of its recorded parent.
//!
//! The tree does no rebalancing, so depth is `O(n)` in the worst case, and it
//! is never empty: it is built from a value and refuses to delete its last
//! node.
//!
//! ## Companions
//!
//! [`simple::Tree`] is an insert-only tree for when all you need is "values
//! in, sorted iteration out". [`intersect::intersection_sorted`] merges two
//! ascending slices into their ascending intersection. Both order themselves
//! through the same [`TreeOrd`] comparison the linked tree uses.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod cmp;
pub mod error;
pub mod intersect;
pub mod linked;
pub mod simple;

#[cfg(test)]
mod test;

pub use cmp::TreeOrd;
pub use error::TreeError;
pub use linked::Tree;
