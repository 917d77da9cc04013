//! Lazy in-order traversal.

use std::iter::FusedIterator;

use crate::common::Key;
use crate::index::btree::BTreeNode;

/// In-order iterator over `(key, value)` pairs of a subtree.
///
/// Holds one `(node, next key index)` frame per level, so memory is
/// bounded by the tree height. Created by [`BTreeNode::traverse`] or
/// [`BTree::traverse`](super::BTree::traverse); calling either again
/// restarts from the smallest key.
///
/// The iterator borrows the tree, so no insertion can interleave with it.
///
/// `size_hint` is exact for iterators from [`BTree::traverse`](super::BTree::traverse),
/// which knows its key count. A subtree iterator from
/// [`BTreeNode::traverse`] does not, and counting up front would cost a
/// full walk, so `Iter` does not implement `ExactSizeIterator`.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    stack: Vec<(&'a BTreeNode, usize)>,
    remaining: Option<usize>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(root: &'a BTreeNode) -> Self {
        let mut iter = Self {
            stack: Vec::with_capacity(root.height()),
            remaining: None,
        };
        iter.descend_leftmost(root);
        iter
    }

    /// Iterator whose exact length is known up front.
    pub(crate) fn with_len(root: &'a BTreeNode, len: usize) -> Self {
        let mut iter = Self::new(root);
        iter.remaining = Some(len);
        iter
    }

    fn descend_leftmost(&mut self, mut node: &'a BTreeNode) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = &**child,
                None => break,
            }
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (Key, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            let node: &'a BTreeNode = top.0;
            let i = top.1;

            if i < node.keys.len() {
                top.1 += 1;
                // Everything in children[i + 1] sorts between keys[i] and keys[i + 1]
                if !node.is_leaf {
                    self.descend_leftmost(&node.children[i + 1]);
                }
                if let Some(n) = self.remaining.as_mut() {
                    *n = n.saturating_sub(1);
                }
                return Some((node.keys[i], node.values[i].as_str()));
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(n) => (n, Some(n)),
            None if self.stack.is_empty() => (0, Some(0)),
            None => (0, None),
        }
    }
}

impl FusedIterator for Iter<'_> {}
