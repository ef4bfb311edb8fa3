//! An insert-only BST: values go in, sorted iteration comes out. There is no
//! deletion, no parent bookkeeping, and no rank machinery, so the nodes are
//! plain owned boxes and the whole thing stays tiny.

use std::cmp::Ordering;

use crate::cmp::TreeOrd;

/// An insert-only ordered tree.
///
/// `insert` consumes and returns the tree, so building one reads like a fold:
///
/// ```
/// use ordtree::simple::Tree;
///
/// let tree = [2, 1, 3, 2].into_iter().fold(Tree::new(), Tree::insert);
/// assert_eq!(tree.to_vec(), vec![1, 2, 2, 3]);
/// ```
pub enum Tree<T> {
    /// The empty slot below a leaf node, or an empty tree.
    Leaf,
    /// A value with two (possibly empty) children.
    Node(Node<T>),
}

/// A node of a [`Tree`]: one value and its two subtrees.
pub struct Node<T> {
    value: T,
    left: Box<Tree<T>>,
    right: Box<Tree<T>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// An empty tree.
    pub fn new() -> Self {
        Tree::Leaf
    }

    /// Inserts `value`, routing strictly-less values left and everything else
    /// right, and returns the tree.
    pub fn insert(self, value: T) -> Self
    where
        T: TreeOrd,
    {
        match self {
            Tree::Leaf => Tree::Node(Node {
                value,
                left: Box::new(Tree::Leaf),
                right: Box::new(Tree::Leaf),
            }),
            Tree::Node(n) => match value.tree_cmp(&n.value) {
                Ordering::Less => Tree::Node(Node {
                    left: Box::new(n.left.insert(value)),
                    ..n
                }),
                _ => Tree::Node(Node {
                    right: Box::new(n.right.insert(value)),
                    ..n
                }),
            },
        }
    }

    /// In-order iterator over the values.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self);
        iter
    }

    /// Materializes the values in ascending order.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<'a, T> IntoIterator for &'a Tree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Stack-driven in-order iterator over a [`Tree`]. Created by [`Tree::iter`].
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    /// Pushes every node on the left spine of `tree`, so the smallest
    /// unvisited value ends up on top of the stack.
    fn push_left_spine(&mut self, mut tree: &'a Tree<T>) {
        while let Tree::Node(node) = tree {
            self.stack.push(node);
            tree = &node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        Some(&node.value)
    }
}
