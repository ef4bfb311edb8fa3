//! A parent-linked BST. Children are owned links, the parent is a non-owning
//! back-pointer, and every node tracks the size of its own subtree. That
//! combination lets any node answer rank queries, walk to its in-order
//! neighbors, and be deleted in place while the bookkeeping above it stays
//! correct.
//!
//! # Examples
//!
//! ```
//! use ordtree::linked::Tree;
//!
//! let mut tree = Tree::new(5);
//! tree.insert(3).insert(8).insert(3);
//!
//! assert_eq!(tree.size(), 4);
//! assert_eq!(tree.to_vec(), vec![3, 3, 5, 8]);
//!
//! // Any node is a handle: rank-select the smallest, then walk forward.
//! let smallest = tree.at(0).unwrap();
//! assert_eq!(smallest.value(), &3);
//! assert_eq!(smallest.next().map(|n| n.value()), Some(&3));
//!
//! // Deleting a present value shrinks the tree by exactly one node.
//! assert_eq!(tree.delete(&3), Ok(true));
//! assert_eq!(tree.to_vec(), vec![3, 5, 8]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::cmp::TreeOrd;
use crate::error::TreeError;

const INSERT_AT_ROOT: &str = "insert is only allowed at the root node";
const CANNOT_EMPTY: &str = "cannot delete the last node of a tree";

/// An ordered tree of at least one node.
///
/// The handle owns the whole structure. It is constructed from its first
/// value and can never become empty: deleting the last node is refused.
///
/// # Examples
///
/// ```
/// use ordtree::linked::Tree;
///
/// let mut tree = Tree::new(2);
/// tree.insert(1).insert(3);
///
/// assert_eq!(tree.find(&3).map(|n| n.value()), Some(&3));
/// assert!(tree.find(&42).is_none());
/// ```
pub struct Tree<T> {
    // Never dangling: the root allocation is created in `new` and only freed
    // in `drop`. Deletion swaps values downward, so the root never moves.
    root: NonNull<Node<T>>,
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        // Reclaim without recursing so a degenerate chain cannot blow the
        // stack.
        let mut pending = vec![self.root];
        while let Some(node) = pending.pop() {
            // SAFETY: every node is owned by exactly one child link (or the
            // root handle) and is pushed here exactly once, so each `Box` is
            // reclaimed exactly once. The boxes were allocated in
            // `Node::new_boxed`.
            let node = unsafe { Box::from_raw(node.as_ptr()) };
            if let Some(left) = node.left.0 {
                pending.push(left);
            }
            if let Some(right) = node.right.0 {
                pending.push(right);
            }
        }
    }
}

impl<T: Clone> Clone for Tree<T> {
    fn clone(&self) -> Self {
        // SAFETY: `self.root` is live and the clone builds a disjoint
        // allocation graph with its own parent links.
        let root = unsafe { clone_subtree(self.root) };
        Self { root }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree").field("root", self.root()).finish()
    }
}

impl<T> Tree<T> {
    /// Builds a one-node tree holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            root: NonNull::from(Box::leak(Node::new_boxed(value))),
        }
    }

    /// The root node. Every navigation and lookup method of [`Node`] is
    /// available from here.
    pub fn root(&self) -> &Node<T> {
        // SAFETY: the root allocation is live for as long as the tree and we
        // hand out a reference tied to `&self`.
        unsafe { &*self.root.as_ptr() }
    }

    /// Total number of nodes in the tree. Always at least 1.
    pub fn size(&self) -> usize {
        self.root().size
    }

    /// Inserts `value`, routing strictly-less values left and everything else
    /// right, so repeated inserts of an equal value accumulate rightward.
    /// Returns the tree again to allow chaining.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::linked::Tree;
    ///
    /// let mut tree = Tree::new(5.0);
    /// tree.insert(3.0).insert(4.0).insert(4.5);
    ///
    /// assert_eq!(tree.to_vec(), vec![3.0, 4.0, 4.5, 5.0]);
    /// ```
    pub fn insert(&mut self, value: T) -> &mut Self
    where
        T: TreeOrd,
    {
        // SAFETY: the root is live and `&mut self` makes this the only
        // reference into the tree.
        unsafe { self.root.as_mut() }.insert_descend(value);
        self
    }

    /// Deletes one node holding `value` and reports whether one existed.
    ///
    /// Fails with [`TreeError::InvalidOperation`] when the tree has exactly
    /// one node, even if `value` is absent; a tree may not become empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::linked::Tree;
    ///
    /// let mut tree = Tree::new(2);
    /// tree.insert(1).insert(3);
    ///
    /// assert_eq!(tree.delete(&3), Ok(true));
    /// assert_eq!(tree.delete(&3), Ok(false));
    /// assert_eq!(tree.to_vec(), vec![1, 2]);
    /// ```
    pub fn delete(&mut self, value: &T) -> Result<bool, TreeError>
    where
        T: TreeOrd,
    {
        if self.size() == 1 {
            return Err(TreeError::InvalidOperation(CANNOT_EMPTY));
        }
        // SAFETY: `&mut self` gives exclusive access to every node; the
        // sole-node case was rejected above, so the leaf the removal walk
        // reaches always has a parent.
        match unsafe { find_raw(self.root, value) } {
            Some(target) => {
                unsafe { remove_node(target) };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// A mutable cursor positioned at the root. The cursor is the write
    /// counterpart of a [`Node`] reference: it can be walked to any node and
    /// remove the node it points at.
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            node: self.root,
            tree: self,
        }
    }

    /// Finds a node holding `value`, starting at the root.
    pub fn find(&self, value: &T) -> Option<&Node<T>>
    where
        T: TreeOrd,
    {
        self.root().find(value)
    }

    /// The node holding the greatest value strictly less than `value`,
    /// whether or not `value` itself is present. See
    /// [`Node::find_previous`].
    pub fn find_previous(&self, value: &T) -> Option<&Node<T>>
    where
        T: TreeOrd,
    {
        self.root().find_previous(value)
    }

    /// The node holding the smallest value strictly greater than `value`,
    /// whether or not `value` itself is present. See [`Node::find_next`].
    pub fn find_next(&self, value: &T) -> Option<&Node<T>>
    where
        T: TreeOrd,
    {
        self.root().find_next(value)
    }

    /// The node at rank `index` in sorted order. See [`Node::at`].
    pub fn at(&self, index: usize) -> Result<&Node<T>, TreeError> {
        self.root().at(index)
    }

    /// The node holding the minimum value.
    pub fn first(&self) -> &Node<T> {
        self.root().first()
    }

    /// The node holding the maximum value.
    pub fn last(&self) -> &Node<T> {
        self.root().last()
    }

    /// In-order iterator over every node.
    pub fn iter(&self) -> Iter<'_, T> {
        self.root().iter()
    }

    /// In-order iterator over every value.
    pub fn values(&self) -> Values<'_, T> {
        self.root().values()
    }

    /// Materializes the values in ascending order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.root().to_vec()
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Values<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}

struct Link<T>(Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Link<T> {}

impl<T> Link<T> {
    fn node(&self) -> Option<&Node<T>> {
        // SAFETY: a link is either empty or points at a live node owned by
        // the same tree. The reference is tied to the borrow of the link,
        // which in turn is reachable only through a borrow of the tree.
        unsafe { self.0.map(|ptr| &*ptr.as_ptr()) }
    }
}

/// A node of a [`Tree`]: the value it holds, the size of its subtree, and a
/// full read-only handle into the rest of the structure.
///
/// References to nodes are obtained from lookups ([`Tree::find`],
/// [`Tree::at`], ...) and from navigation on other nodes. All methods here
/// are relative to `self`: [`first`][Node::first], [`last`][Node::last],
/// [`at`][Node::at], and [`iter`][Node::iter] cover the subtree rooted at
/// this node, while [`previous`][Node::previous] and [`next`][Node::next]
/// travel the whole tree through the parent links.
pub struct Node<T> {
    value: T,
    size: usize,
    left: Link<T>,
    right: Link<T>,
    parent: Link<T>,
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("value", &self.value)
            .field("size", &self.size)
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<T> Node<T> {
    fn new_boxed(value: T) -> Box<Self> {
        Box::new(Self {
            value,
            size: 1,
            left: Link(None),
            right: Link(None),
            parent: Link(None),
        })
    }

    /// The value stored in this node.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Number of nodes in the subtree rooted here, including this node.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The left child, holding values strictly less than this node's.
    pub fn left(&self) -> Option<&Self> {
        self.left.node()
    }

    /// The right child, holding values greater than or equal to this node's.
    pub fn right(&self) -> Option<&Self> {
        self.right.node()
    }

    /// The parent node, or `None` on the tree's root.
    pub fn parent(&self) -> Option<&Self> {
        self.parent.node()
    }

    /// Whether this node is the tree's root.
    pub fn is_root(&self) -> bool {
        self.parent.0.is_none()
    }

    /// Descends by three-way comparison and increments `size` on every node
    /// of the path, including the starting node.
    fn insert_descend(&mut self, value: T)
    where
        T: TreeOrd,
    {
        let mut node = NonNull::from(self);
        loop {
            // SAFETY: the descent starts from an exclusive borrow and only
            // ever moves down owned child links, so no other reference into
            // this subtree exists.
            let n = unsafe { node.as_mut() };
            n.size += 1;
            let slot = if value.tree_cmp(&n.value) == Ordering::Less {
                &mut n.left
            } else {
                &mut n.right
            };
            match slot.0 {
                Some(child) => node = child,
                None => {
                    let mut leaf = Node::new_boxed(value);
                    leaf.parent = Link(Some(node));
                    slot.0 = Some(NonNull::from(Box::leak(leaf)));
                    return;
                }
            }
        }
    }

    /// Finds a node holding `value` within the subtree rooted here.
    ///
    /// With duplicates present this returns the first match on the descent
    /// path; the others sit in that node's right subtree.
    pub fn find(&self, value: &T) -> Option<&Self>
    where
        T: TreeOrd,
    {
        let mut node = self;
        loop {
            node = match value.tree_cmp(&node.value) {
                Ordering::Less => node.left()?,
                Ordering::Equal => return Some(node),
                Ordering::Greater => node.right()?,
            };
        }
    }

    /// Descends as `find` would, returning the match (`Ok`) or the last node
    /// visited before running out of children (`Err`).
    fn seek(&self, value: &T) -> Result<&Self, &Self>
    where
        T: TreeOrd,
    {
        let mut node = self;
        loop {
            let child = match value.tree_cmp(&node.value) {
                Ordering::Less => node.left(),
                Ordering::Equal => return Ok(node),
                Ordering::Greater => node.right(),
            };
            match child {
                Some(child) => node = child,
                None => return Err(node),
            }
        }
    }

    /// The node holding the greatest value strictly less than `value`.
    /// `value` itself does not have to be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::linked::Tree;
    ///
    /// let mut tree = Tree::new(5);
    /// tree.insert(3);
    ///
    /// // 4 is absent; its predecessor is 3.
    /// assert_eq!(tree.find_previous(&4).map(|n| n.value()), Some(&3));
    /// // 3 is present and is the minimum, so it has no predecessor.
    /// assert!(tree.find_previous(&3).is_none());
    /// ```
    pub fn find_previous(&self, value: &T) -> Option<&Self>
    where
        T: TreeOrd,
    {
        match self.seek(value) {
            Ok(found) => found.previous(),
            Err(last) => match last.value.tree_cmp(value) {
                Ordering::Less => Some(last),
                _ => last.previous(),
            },
        }
    }

    /// The node holding the smallest value strictly greater than `value`.
    /// `value` itself does not have to be present.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::linked::Tree;
    ///
    /// let mut tree = Tree::new(5);
    /// tree.insert(7);
    ///
    /// assert_eq!(tree.find_next(&6).map(|n| n.value()), Some(&7));
    /// assert!(tree.find_next(&7).is_none());
    /// ```
    pub fn find_next(&self, value: &T) -> Option<&Self>
    where
        T: TreeOrd,
    {
        match self.seek(value) {
            Ok(found) => found.next(),
            Err(last) => match last.value.tree_cmp(value) {
                Ordering::Greater => Some(last),
                _ => last.next(),
            },
        }
    }

    /// The node at rank `index` (0-indexed) within the subtree rooted here:
    /// `at(i)` holds the value that in-order iteration of this subtree yields
    /// at position `i`. Selection steers on left-subtree sizes, so no part of
    /// the sequence is materialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::linked::Tree;
    ///
    /// let mut tree = Tree::new(20);
    /// tree.insert(10).insert(30);
    ///
    /// assert_eq!(tree.at(0).unwrap().value(), &10);
    /// assert_eq!(tree.at(2).unwrap().value(), &30);
    /// assert!(tree.at(3).is_err());
    /// ```
    pub fn at(&self, index: usize) -> Result<&Self, TreeError> {
        if index >= self.size {
            return Err(TreeError::IndexOutOfRange {
                index,
                size: self.size,
            });
        }

        let mut node = self;
        let mut index = index;
        loop {
            let left_size = node.left().map_or(0, Node::size);
            match index.cmp(&left_size) {
                Ordering::Less => {
                    node = node
                        .left()
                        .expect("a rank below the left subtree size implies a left child");
                }
                Ordering::Equal => return Ok(node),
                Ordering::Greater => {
                    index -= left_size + 1;
                    node = node
                        .right()
                        .expect("a rank beyond the left subtree implies a right child");
                }
            }
        }
    }

    /// The leftmost node of the subtree rooted here. A node without a left
    /// child is its own `first`.
    pub fn first(&self) -> &Self {
        // SAFETY: `first_raw` only follows live child links.
        unsafe { &*first_raw(NonNull::from(self)).as_ptr() }
    }

    /// The rightmost node of the subtree rooted here.
    pub fn last(&self) -> &Self {
        // SAFETY: `last_raw` only follows live child links.
        unsafe { &*last_raw(NonNull::from(self)).as_ptr() }
    }

    /// The in-order predecessor within the whole tree, or `None` if this node
    /// holds the minimum. This may leave the subtree rooted here: it is the
    /// rightmost descendant of the left child if one exists, otherwise the
    /// first ancestor reached from a right-hand side.
    pub fn previous(&self) -> Option<&Self> {
        // SAFETY: only live child and parent links are followed; the result
        // is tied to the borrow of `self`.
        unsafe { previous_raw(NonNull::from(self)).map(|ptr| &*ptr.as_ptr()) }
    }

    /// The in-order successor within the whole tree, or `None` if this node
    /// holds the maximum.
    ///
    /// `previous` and `next` invert each other everywhere they are defined.
    pub fn next(&self) -> Option<&Self> {
        // SAFETY: as for `previous`.
        unsafe { next_raw(NonNull::from(self)).map(|ptr| &*ptr.as_ptr()) }
    }

    /// Lazy in-order iteration over the subtree rooted here. Each call
    /// produces an independent iterator that starts over from the smallest
    /// node.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: Some(self.first()),
            remaining: self.size,
        }
    }

    /// Lazy in-order iteration over the values of the subtree rooted here.
    pub fn values(&self) -> Values<'_, T> {
        Values { inner: self.iter() }
    }

    /// Materializes this subtree's values in ascending order. Duplicates are
    /// preserved in their insertion order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.values().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a Node<T> {
    type Item = &'a T;
    type IntoIter = Values<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values()
    }
}

/// In-order iterator over the nodes of a subtree. Created by [`Node::iter`].
pub struct Iter<'a, T> {
    next: Option<&'a Node<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.next?;
        self.remaining -= 1;
        // In-order traversal visits a subtree contiguously, so counting down
        // `remaining` stops us at the subtree boundary.
        self.next = node.next();
        Some(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// In-order iterator over the values of a subtree. Created by
/// [`Node::values`].
pub struct Values<'a, T> {
    inner: Iter<'a, T>,
}

impl<'a, T> Iterator for Values<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Node::value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Values<'_, T> {}

/// A mutable handle on one node of a [`Tree`].
///
/// While [`Node`] references cover all read-side operations, structural edits
/// away from the root go through a cursor: walk it to any node, then
/// [`remove`][CursorMut::remove] that node, or [`insert`][CursorMut::insert]
/// when the cursor is at the root.
///
/// # Examples
///
/// ```
/// use ordtree::linked::Tree;
///
/// let mut tree = Tree::new(5);
/// tree.insert(3).insert(8).insert(7);
///
/// let mut cursor = tree.cursor_mut();
/// assert!(cursor.move_to(&8));
/// assert_eq!(cursor.remove(), Ok(8));
///
/// assert_eq!(tree.to_vec(), vec![3, 5, 7]);
/// ```
pub struct CursorMut<'a, T> {
    tree: &'a mut Tree<T>,
    node: NonNull<Node<T>>,
}

impl<T> CursorMut<'_, T> {
    /// The value of the node the cursor points at.
    pub fn value(&self) -> &T {
        // SAFETY: the cursor's node is live for as long as the tree borrow
        // the cursor holds.
        unsafe { &(*self.node.as_ptr()).value }
    }

    /// Subtree size of the node the cursor points at.
    pub fn size(&self) -> usize {
        self.node_ref().size
    }

    /// Whether the cursor points at the tree's root.
    pub fn is_root(&self) -> bool {
        self.node_ref().is_root()
    }

    /// Read-only handle on the current node, for lookups and navigation that
    /// should not move the cursor.
    pub fn node(&self) -> &Node<T> {
        self.node_ref()
    }

    fn node_ref(&self) -> &Node<T> {
        // SAFETY: as for `value`.
        unsafe { &*self.node.as_ptr() }
    }

    /// Moves to the root.
    pub fn move_root(&mut self) {
        self.node = self.tree.root;
    }

    /// Moves to the smallest node of the current subtree.
    pub fn move_first(&mut self) {
        // SAFETY: the cursor's node is live and only live links are followed.
        self.node = unsafe { first_raw(self.node) };
    }

    /// Moves to the largest node of the current subtree.
    pub fn move_last(&mut self) {
        // SAFETY: as for `move_first`.
        self.node = unsafe { last_raw(self.node) };
    }

    /// Moves to the parent. Returns `false` (and stays put) at the root.
    pub fn move_parent(&mut self) -> bool {
        match self.node_ref().parent.0 {
            Some(parent) => {
                self.node = parent;
                true
            }
            None => false,
        }
    }

    /// Moves to the in-order predecessor. Returns `false` (and stays put) at
    /// the tree's minimum.
    pub fn move_previous(&mut self) -> bool {
        // SAFETY: as for `move_first`.
        match unsafe { previous_raw(self.node) } {
            Some(node) => {
                self.node = node;
                true
            }
            None => false,
        }
    }

    /// Moves to the in-order successor. Returns `false` (and stays put) at
    /// the tree's maximum.
    pub fn move_next(&mut self) -> bool {
        // SAFETY: as for `move_first`.
        match unsafe { next_raw(self.node) } {
            Some(node) => {
                self.node = node;
                true
            }
            None => false,
        }
    }

    /// Moves to a node holding `value`, searching the current subtree.
    /// Returns `false` (and stays put) if no such node exists.
    pub fn move_to(&mut self, value: &T) -> bool
    where
        T: TreeOrd,
    {
        // SAFETY: as for `move_first`.
        match unsafe { find_raw(self.node, value) } {
            Some(node) => {
                self.node = node;
                true
            }
            None => false,
        }
    }

    /// Moves to the node at rank `index` within the current subtree.
    pub fn move_at(&mut self, index: usize) -> Result<(), TreeError> {
        // SAFETY: as for `move_first`.
        self.node = unsafe { at_raw(self.node, index) }?;
        Ok(())
    }

    /// Inserts `value` into the tree. Insertion is root-only: if the cursor
    /// points anywhere else this fails with [`TreeError::InvalidOperation`]
    /// and the tree is untouched.
    pub fn insert(&mut self, value: T) -> Result<(), TreeError>
    where
        T: TreeOrd,
    {
        // SAFETY: the cursor holds the tree exclusively, so this is the only
        // live reference into it.
        let node = unsafe { self.node.as_mut() };
        if node.parent.0.is_some() {
            return Err(TreeError::InvalidOperation(INSERT_AT_ROOT));
        }
        node.insert_descend(value);
        Ok(())
    }

    /// Removes the node the cursor points at and returns its value. The
    /// cursor repositions to the root, since the removal walk may have moved
    /// other values into the vacated spot.
    ///
    /// Fails with [`TreeError::InvalidOperation`] when the tree has exactly
    /// one node.
    pub fn remove(&mut self) -> Result<T, TreeError> {
        if self.tree.size() == 1 {
            return Err(TreeError::InvalidOperation(CANNOT_EMPTY));
        }
        // SAFETY: the cursor holds the tree exclusively and the sole-node
        // case was rejected above.
        let value = unsafe { remove_node(self.node) };
        self.node = self.tree.root;
        Ok(value)
    }
}

/// Leftmost node reachable from `node` through left links.
///
/// # Safety
///
/// `node` must point at a live node whose tree is borrowed by the caller.
unsafe fn first_raw<T>(mut node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    while let Some(left) = node.as_ref().left.0 {
        node = left;
    }
    node
}

/// Rightmost node reachable from `node` through right links.
///
/// # Safety
///
/// As for [`first_raw`].
unsafe fn last_raw<T>(mut node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    while let Some(right) = node.as_ref().right.0 {
        node = right;
    }
    node
}

/// In-order predecessor of `node` within the whole tree: the rightmost
/// descendant of the left child, or otherwise the first ancestor that is
/// entered from its right side.
///
/// # Safety
///
/// As for [`first_raw`].
unsafe fn previous_raw<T>(node: NonNull<Node<T>>) -> Option<NonNull<Node<T>>> {
    if let Some(left) = node.as_ref().left.0 {
        return Some(last_raw(left));
    }
    let mut child = node;
    loop {
        let parent = child.as_ref().parent.0?;
        if parent.as_ref().right.0 == Some(child) {
            return Some(parent);
        }
        // Still on a left spine. Reaching the root from here means `node`
        // holds the minimum.
        child = parent;
    }
}

/// In-order successor of `node` within the whole tree.
///
/// # Safety
///
/// As for [`first_raw`].
unsafe fn next_raw<T>(node: NonNull<Node<T>>) -> Option<NonNull<Node<T>>> {
    if let Some(right) = node.as_ref().right.0 {
        return Some(first_raw(right));
    }
    let mut child = node;
    loop {
        let parent = child.as_ref().parent.0?;
        if parent.as_ref().left.0 == Some(child) {
            return Some(parent);
        }
        child = parent;
    }
}

/// Comparison descent for `value` starting at `node`.
///
/// # Safety
///
/// As for [`first_raw`].
unsafe fn find_raw<T>(mut node: NonNull<Node<T>>, value: &T) -> Option<NonNull<Node<T>>>
where
    T: TreeOrd,
{
    loop {
        let n = node.as_ref();
        node = match value.tree_cmp(&n.value) {
            Ordering::Less => n.left.0?,
            Ordering::Equal => return Some(node),
            Ordering::Greater => n.right.0?,
        };
    }
}

/// Rank descent for `index` within the subtree rooted at `node`.
///
/// # Safety
///
/// As for [`first_raw`].
unsafe fn at_raw<T>(
    mut node: NonNull<Node<T>>,
    mut index: usize,
) -> Result<NonNull<Node<T>>, TreeError> {
    let size = node.as_ref().size;
    if index >= size {
        return Err(TreeError::IndexOutOfRange { index, size });
    }
    loop {
        let n = node.as_ref();
        let left_size = match n.left.0 {
            Some(left) => left.as_ref().size,
            None => 0,
        };
        match index.cmp(&left_size) {
            Ordering::Less => {
                node = n
                    .left
                    .0
                    .expect("a rank below the left subtree size implies a left child");
            }
            Ordering::Equal => return Ok(node),
            Ordering::Greater => {
                index -= left_size + 1;
                node = n
                    .right
                    .0
                    .expect("a rank beyond the left subtree implies a right child");
            }
        }
    }
}

/// Unlinks `node` from its tree and returns its value.
///
/// An internal node is deleted by swapping values toward a leaf: the in-order
/// predecessor when a left child exists, the successor otherwise. Only the
/// values move; the structure is untouched until a leaf is finally unlinked.
/// The ancestor walk at the end keeps every subtree size above the leaf
/// correct no matter where in the tree the deletion started.
///
/// # Safety
///
/// `node` must belong to a tree the caller borrows exclusively, and it must
/// not be the sole node of that tree.
unsafe fn remove_node<T>(mut node: NonNull<Node<T>>) -> T {
    loop {
        let n = node.as_ref();
        if n.left.0.is_none() && n.right.0.is_none() {
            let mut parent = n.parent.0.expect("a non-sole leaf always has a parent");
            {
                let p = parent.as_mut();
                if p.left.0 == Some(node) {
                    p.left = Link(None);
                } else {
                    p.right = Link(None);
                }
            }
            let mut ancestor = Some(parent);
            while let Some(mut a) = ancestor {
                a.as_mut().size -= 1;
                ancestor = a.as_ref().parent.0;
            }
            let leaf = Box::from_raw(node.as_ptr());
            return leaf.value;
        }

        let swap = if n.left.0.is_some() {
            previous_raw(node).expect("a left child implies an in-order predecessor")
        } else {
            next_raw(node).expect("a right child implies an in-order successor")
        };
        // `swap` is a distinct node strictly closer to a leaf, so the loop
        // terminates. After the exchange the value being deleted rides along
        // with `swap`.
        mem::swap(&mut (*node.as_ptr()).value, &mut (*swap.as_ptr()).value);
        node = swap;
    }
}

/// Deep-copies the subtree rooted at `node`, wiring up fresh parent links.
///
/// # Safety
///
/// `node` must point at a live node of a tree borrowed by the caller.
unsafe fn clone_subtree<T: Clone>(node: NonNull<Node<T>>) -> NonNull<Node<T>> {
    let n = node.as_ref();
    let mut copy = Node::new_boxed(n.value.clone());
    copy.size = n.size;
    let copy = NonNull::from(Box::leak(copy));
    if let Some(left) = n.left.0 {
        let mut new_left = clone_subtree(left);
        new_left.as_mut().parent = Link(Some(copy));
        (*copy.as_ptr()).left = Link(Some(new_left));
    }
    if let Some(right) = n.right.0 {
        let mut new_right = clone_subtree(right);
        new_right.as_mut().parent = Link(Some(copy));
        (*copy.as_ptr()).right = Link(Some(new_right));
    }
    copy
}

/// Walks the whole tree asserting the size, ordering, and parent/child
/// invariants.
#[cfg(test)]
pub(crate) fn check_invariants<T: TreeOrd>(tree: &Tree<T>) {
    assert!(tree.root().parent().is_none());
    assert_eq!(check_node(tree.root()), tree.size());
    let values: Vec<&T> = tree.values().collect();
    for pair in values.windows(2) {
        assert_ne!(pair[0].tree_cmp(pair[1]), Ordering::Greater);
    }
}

#[cfg(test)]
fn check_node<T: TreeOrd>(node: &Node<T>) -> usize {
    let mut total = 1;
    if let Some(left) = node.left() {
        assert!(std::ptr::eq(
            left.parent().expect("left child must point back at its parent"),
            node
        ));
        assert_eq!(left.value().tree_cmp(node.value()), Ordering::Less);
        total += check_node(left);
    }
    if let Some(right) = node.right() {
        assert!(std::ptr::eq(
            right.parent().expect("right child must point back at its parent"),
            node
        ));
        assert_ne!(right.value().tree_cmp(node.value()), Ordering::Less);
        total += check_node(right);
    }
    assert_eq!(node.size(), total);
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_node_tree() {
        let tree = Tree::new(7);
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.root().value(), &7);
        assert!(tree.root().is_root());
        assert!(std::ptr::eq(tree.first(), tree.root()));
        assert!(std::ptr::eq(tree.last(), tree.root()));
        assert!(tree.root().previous().is_none());
        assert!(tree.root().next().is_none());
    }

    #[test]
    fn insert_chains_and_sorts() {
        let mut tree = Tree::new(5.0);
        tree.insert(3.0).insert(4.0).insert(4.5);

        assert_eq!(tree.size(), 4);
        assert_eq!(tree.to_vec(), vec![3.0, 4.0, 4.5, 5.0]);
        check_invariants(&tree);
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Keyed {
        key: i32,
        tag: char,
    }

    impl TreeOrd for Keyed {
        fn tree_cmp(&self, other: &Self) -> Ordering {
            self.key.cmp(&other.key)
        }
    }

    #[test]
    fn duplicate_keys_keep_insertion_order() {
        let mut tree = Tree::new(Keyed { key: 1, tag: 'a' });
        tree.insert(Keyed { key: 1, tag: 'b' })
            .insert(Keyed { key: 0, tag: 'c' })
            .insert(Keyed { key: 1, tag: 'd' });

        let tags: Vec<char> = tree.values().map(|v| v.tag).collect();
        assert_eq!(tags, vec!['c', 'a', 'b', 'd']);
        check_invariants(&tree);
    }

    #[test]
    fn find_hits_and_misses() {
        let mut tree = Tree::new(5);
        tree.insert(3).insert(8).insert(7);

        assert_eq!(tree.find(&7).map(|n| n.value()), Some(&7));
        assert!(tree.find(&6).is_none());
        // A lookup can start at any node.
        let eight = tree.find(&8).unwrap();
        assert_eq!(eight.find(&7).map(|n| n.value()), Some(&7));
        assert!(eight.find(&3).is_none());
    }

    #[test]
    fn approximate_lookups_fall_between_keys() {
        let mut tree = Tree::new(5);
        tree.insert(3);

        assert_eq!(tree.find_previous(&4).map(|n| n.value()), Some(&3));
        assert_eq!(tree.find_previous(&9).map(|n| n.value()), Some(&5));
        assert!(tree.find_previous(&3).is_none());
        assert_eq!(tree.find_next(&3).map(|n| n.value()), Some(&5));

        let mut tree = Tree::new(5);
        tree.insert(7);

        assert_eq!(tree.find_next(&6).map(|n| n.value()), Some(&7));
        assert_eq!(tree.find_next(&0).map(|n| n.value()), Some(&5));
        assert!(tree.find_next(&7).is_none());
        assert_eq!(tree.find_previous(&7).map(|n| n.value()), Some(&5));
    }

    #[test]
    fn rank_selection_matches_in_order() {
        let mut tree = Tree::new(50);
        for x in [30, 70, 20, 40, 60, 80, 35, 45, 75] {
            tree.insert(x);
        }

        let values = tree.to_vec();
        for (i, value) in values.iter().enumerate() {
            assert_eq!(tree.at(i).unwrap().value(), value);
        }
        assert_eq!(
            tree.at(values.len()).unwrap_err(),
            TreeError::IndexOutOfRange {
                index: values.len(),
                size: values.len(),
            }
        );

        // Ranks are relative to the receiving subtree.
        let seventy = tree.find(&70).unwrap();
        assert_eq!(seventy.at(0).unwrap().value(), &60);
        assert_eq!(seventy.at(seventy.size() - 1).unwrap().value(), &80);
    }

    #[test]
    fn previous_and_next_walk_the_whole_tree() {
        let mut tree = Tree::new(4);
        tree.insert(2).insert(1).insert(3).insert(6).insert(5).insert(7);

        let mut seen = Vec::new();
        let mut node = Some(tree.first());
        while let Some(n) = node {
            seen.push(*n.value());
            node = n.next();
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7]);

        assert!(tree.first().previous().is_none());
        assert!(tree.last().next().is_none());

        // `3` sits at the bottom of the left subtree; its successor is the
        // root, reached through the ancestor walk.
        let three = tree.find(&3).unwrap();
        assert!(std::ptr::eq(three.next().unwrap(), tree.root()));
        assert!(std::ptr::eq(tree.root().previous().unwrap(), three));
    }

    #[test]
    fn deleting_the_root_value_promotes_the_successor() {
        let mut tree = Tree::new(6);
        tree.insert(7).insert(8).insert(9);

        assert_eq!(tree.delete(&6), Ok(true));
        assert_eq!(tree.root().value(), &7);
        assert_eq!(tree.to_vec(), vec![7, 8, 9]);
        check_invariants(&tree);
    }

    #[test]
    fn deleting_a_branch_swaps_in_the_predecessor() {
        let mut tree = Tree::new(5);
        tree.insert(3).insert(2).insert(4);

        assert_eq!(tree.delete(&3), Ok(true));
        assert_eq!(tree.to_vec(), vec![2, 4, 5]);

        // The branch position is now occupied by the predecessor value, and
        // its subtree shrank by one.
        let branch = tree.root().left().unwrap();
        assert_eq!(branch.value(), &2);
        assert_eq!(branch.size(), 2);
        check_invariants(&tree);
    }

    #[test]
    fn deleting_an_absent_value_changes_nothing() {
        let mut tree = Tree::new(5);
        tree.insert(3);

        assert_eq!(tree.delete(&4), Ok(false));
        assert_eq!(tree.to_vec(), vec![3, 5]);
        assert_eq!(tree.size(), 2);
    }

    #[test]
    fn the_last_node_cannot_be_deleted() {
        let mut tree = Tree::new(1);
        assert_eq!(
            tree.delete(&1),
            Err(TreeError::InvalidOperation(CANNOT_EMPTY))
        );
        // The sole-node check applies before the absence check.
        assert!(tree.delete(&2).is_err());
        assert!(tree.cursor_mut().remove().is_err());
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn deleting_every_value_but_one() {
        let mut tree = Tree::new(50);
        for x in [30, 70, 20, 40, 60, 80, 35, 45, 75] {
            tree.insert(x);
        }

        for x in [50, 20, 80, 35, 30, 75, 45, 60, 70] {
            let before = tree.size();
            assert_eq!(tree.delete(&x), Ok(true));
            assert_eq!(tree.size(), before - 1);
            check_invariants(&tree);
        }
        assert_eq!(tree.to_vec(), vec![40]);
        assert!(tree.delete(&40).is_err());
    }

    #[test]
    fn cursor_removes_from_a_nested_node() {
        let mut tree = Tree::new(5);
        tree.insert(3).insert(2).insert(4).insert(8).insert(7);

        let mut cursor = tree.cursor_mut();
        assert!(cursor.move_to(&4));
        assert_eq!(cursor.remove(), Ok(4));
        assert!(cursor.is_root());
        drop(cursor);

        // Every ancestor of the removed leaf shrank by one.
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.find(&3).unwrap().size(), 2);
        assert_eq!(tree.to_vec(), vec![2, 3, 5, 7, 8]);
        check_invariants(&tree);
    }

    #[test]
    fn cursor_self_deletion_at_the_root() {
        let mut tree = Tree::new(6);
        tree.insert(7).insert(8).insert(9);

        assert_eq!(tree.cursor_mut().remove(), Ok(6));
        assert_eq!(tree.root().value(), &7);
        assert_eq!(tree.to_vec(), vec![7, 8, 9]);
        check_invariants(&tree);
    }

    #[test]
    fn insert_away_from_the_root_is_rejected() {
        let mut tree = Tree::new(5);
        tree.insert(3);

        let mut cursor = tree.cursor_mut();
        cursor.move_first();
        assert!(!cursor.is_root());
        assert_eq!(
            cursor.insert(1),
            Err(TreeError::InvalidOperation(INSERT_AT_ROOT))
        );
        cursor.move_root();
        assert_eq!(cursor.insert(1), Ok(()));
        drop(cursor);

        assert_eq!(tree.to_vec(), vec![1, 3, 5]);
        check_invariants(&tree);
    }

    #[test]
    fn cursor_navigation() {
        let mut tree = Tree::new(4);
        tree.insert(2).insert(1).insert(3).insert(6).insert(5).insert(7);

        let mut cursor = tree.cursor_mut();
        cursor.move_first();
        assert_eq!(cursor.value(), &1);
        assert!(cursor.move_next());
        assert_eq!(cursor.value(), &2);
        assert!(cursor.move_previous());
        assert!(!cursor.move_previous());
        assert_eq!(cursor.value(), &1);

        cursor.move_last();
        assert_eq!(cursor.value(), &7);
        assert!(!cursor.move_next());

        assert!(cursor.move_to(&6));
        assert_eq!(cursor.size(), 3);
        assert!(cursor.move_parent());
        assert_eq!(cursor.value(), &4);
        assert!(!cursor.move_parent());

        cursor.move_at(2).unwrap();
        assert_eq!(cursor.value(), &3);
        assert!(cursor.move_at(7).is_err());
    }

    #[test]
    fn iteration_is_lazy_and_restartable() {
        let mut tree = Tree::new(2);
        tree.insert(1).insert(3);

        let first: Vec<i32> = tree.values().copied().collect();
        let second: Vec<i32> = tree.values().copied().collect();
        assert_eq!(first, second);
        assert_eq!(tree.iter().len(), 3);

        let mut total = 0;
        for v in &tree {
            total += *v;
        }
        assert_eq!(total, 6);

        // A subtree iterator stops at the subtree boundary.
        let three = tree.find(&3).unwrap();
        assert_eq!(three.to_vec(), vec![3]);
    }

    #[test]
    fn clone_is_deep() {
        let mut tree = Tree::new(5);
        tree.insert(3).insert(8);

        let mut copy = tree.clone();
        copy.insert(4);
        assert_eq!(copy.delete(&8), Ok(true));

        assert_eq!(tree.to_vec(), vec![3, 5, 8]);
        assert_eq!(copy.to_vec(), vec![3, 4, 5]);
        check_invariants(&tree);
        check_invariants(&copy);
    }

    #[test]
    fn debug_output_nests_children() {
        let mut tree = Tree::new(2);
        tree.insert(1);
        let rendered = format!("{tree:?}");
        assert!(rendered.contains("value: 2"));
        assert!(rendered.contains("value: 1"));
    }
}
