//! B-tree node: storage, search, insertion and splitting.
//!
//! A [`BTreeNode`] is self-similar: the tree is simply a distinguished root
//! node (held by [`BTree`](super::BTree)) plus its exclusively owned
//! descendants.
//!
//! # Layout
//! ```text
//!                 keys:     [ k0 | k1 | k2 ]
//!                 values:   [ v0 | v1 | v2 ]
//!                 children: [ c0 | c1 | c2 | c3 ]   (internal nodes only)
//!
//!   c0: keys < k0    c1: k0 < keys < k1    c2: k1 < keys < k2    c3: keys > k2
//! ```
//!
//! Values travel with their key. When a split promotes a median key into
//! the parent, its value moves with it, so every key in the tree (leaf or
//! internal) owns exactly one value.

use std::cmp::Ordering;
use std::fmt;

use crate::common::{Degree, Error, Key, Result, Value};
use crate::index::btree::Iter;

/// A single node of the B-tree.
///
/// # Capacity
/// Bounded by the tree's [`Degree`]:
/// - keys/values: `0..=2*degree - 1`
/// - children: `keys + 1` for internal nodes, `0` for leaves
///
/// Storage is reserved up front for a full node, so a node never
/// reallocates between creation and its first split.
#[derive(Debug)]
pub struct BTreeNode {
    /// Branching factor shared by every node in the tree.
    pub(super) degree: Degree,

    /// Strictly increasing keys.
    pub(super) keys: Vec<Key>,

    /// `values[i]` belongs to `keys[i]`.
    pub(super) values: Vec<Value>,

    /// Owned children (empty for leaves).
    pub(super) children: Vec<Box<BTreeNode>>,

    /// Fixed at creation.
    pub(super) is_leaf: bool,
}

impl BTreeNode {
    /// Create an empty node.
    pub fn new(degree: Degree, is_leaf: bool) -> Self {
        let children = if is_leaf {
            Vec::new()
        } else {
            Vec::with_capacity(degree.max_children())
        };

        Self {
            degree,
            keys: Vec::with_capacity(degree.max_keys()),
            values: Vec::with_capacity(degree.max_keys()),
            children,
            is_leaf,
        }
    }

    /// Create an empty node from a raw degree.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `degree < 2`
    pub fn try_new(degree: usize, is_leaf: bool) -> Result<Self> {
        Ok(Self::new(Degree::new(degree)?, is_leaf))
    }

    /// Create a keyless internal node whose sole child is `old_root`.
    ///
    /// This is the first half of root growth: the caller must follow up
    /// with `split_child(0)` before the node is used for anything else,
    /// since a keyless node with one child breaks the child-count rule.
    pub fn new_root(old_root: BTreeNode) -> Self {
        let mut root = Self::new(old_root.degree, false);
        root.children.push(Box::new(old_root));
        root
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Branching factor of the tree this node belongs to.
    #[inline]
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Whether this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    /// Number of keys currently stored.
    #[inline]
    pub fn num_keys(&self) -> usize {
        self.keys.len()
    }

    /// Whether the node holds `2*degree - 1` keys and must be split
    /// before anything can be inserted through it.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() == self.degree.max_keys()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Values aligned with [`keys`](Self::keys).
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of children (0 for leaves).
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Child at position `i`, if any.
    pub fn child(&self, i: usize) -> Option<&BTreeNode> {
        self.children.get(i).map(Box::as_ref)
    }

    /// Number of levels in the subtree rooted here (1 for a leaf).
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self;
        while let Some(child) = node.children.first() {
            node = &**child;
            height += 1;
        }
        height
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Locate `key` in the subtree rooted here.
    ///
    /// Returns the node holding the key and its index within that node,
    /// or `None` if the key is absent. Visits at most one node per level.
    /// An internal node that has no child to descend into (freshly built
    /// by `new` or `new_root`) reports the key as absent.
    pub fn search(&self, key: Key) -> Option<(&BTreeNode, usize)> {
        let mut node = self;
        loop {
            match node.keys.binary_search(&key) {
                Ok(i) => return Some((node, i)),
                Err(_) if node.is_leaf => return None,
                // Child i sits right after the last key < target
                Err(i) => node = node.children.get(i).map(Box::as_ref)?,
            }
        }
    }

    /// Mutable access to the value stored for `key`.
    pub(super) fn value_mut(&mut self, key: Key) -> Option<&mut Value> {
        match self.keys.binary_search(&key) {
            Ok(i) => Some(&mut self.values[i]),
            Err(_) if self.is_leaf => None,
            Err(i) => self.children.get_mut(i)?.value_mut(key),
        }
    }

    /// Smallest entry in the subtree rooted here.
    pub fn first(&self) -> Option<(Key, &str)> {
        let mut node = self;
        while let Some(child) = node.children.first() {
            node = &**child;
        }
        node.keys
            .first()
            .map(|&k| (k, node.values[0].as_str()))
    }

    /// Largest entry in the subtree rooted here.
    pub fn last(&self) -> Option<(Key, &str)> {
        let mut node = self;
        while let Some(child) = node.children.last() {
            node = &**child;
        }
        let i = node.keys.len().checked_sub(1)?;
        Some((node.keys[i], node.values[i].as_str()))
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert `(key, value)` into the subtree rooted at this non-full node.
    ///
    /// Full children met on the way down are split before descending, so
    /// the node receiving the entry always has room for it.
    ///
    /// Returns the number of child splits performed.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is already present. Splits done
    ///   before the duplicate was found are kept; they preserve every
    ///   invariant.
    /// - `Error::InvariantViolation` if an internal node on the path has
    ///   no child for the key's range, e.g. an empty internal node from
    ///   `new`. Nothing is modified in that case.
    ///
    /// # Panics
    /// Panics if this node is full.
    pub fn insert_non_full(&mut self, key: Key, value: Value) -> Result<usize> {
        assert!(!self.is_full(), "insert_non_full called on a full node");

        let mut i = match self.keys.binary_search(&key) {
            Ok(_) => return Err(Error::DuplicateKey(key)),
            Err(i) => i,
        };

        if self.is_leaf {
            // Vec::insert shifts the tail right by one
            self.keys.insert(i, key);
            self.values.insert(i, value);
            self.debug_assert_capacity();
            return Ok(0);
        }

        let child_full = match self.children.get(i) {
            Some(child) => child.is_full(),
            None => {
                return Err(violation(format!(
                    "internal node with {} keys has no child {}",
                    self.keys.len(),
                    i
                )))
            }
        };

        let mut splits = 0;
        if child_full {
            self.split_child(i);
            splits += 1;

            // The promoted median now sits at keys[i]
            match key.cmp(&self.keys[i]) {
                Ordering::Less => {}
                Ordering::Equal => return Err(Error::DuplicateKey(key)),
                Ordering::Greater => i += 1,
            }
        }

        Ok(splits + self.children[i].insert_non_full(key, value)?)
    }

    /// Split the full child at position `i`.
    ///
    /// With `mid = degree - 1`:
    /// ```text
    ///   before:  self [ .. | a | .. ]          child i = [ 0..mid | mid | mid+1.. ]
    ///
    ///   after:   self [ .. | a | mid | .. ]
    ///                       /     \
    ///            child i [0..mid]   child i+1 [mid+1..]
    /// ```
    /// Both halves end with exactly `degree - 1` keys. For internal
    /// children, the left half keeps children `0..=mid` and the new sibling
    /// takes `mid+1..`, i.e. `degree` children each.
    ///
    /// # Panics
    /// Panics if `self` is a leaf, if `self` is full, or if child `i` is
    /// not full.
    pub fn split_child(&mut self, i: usize) {
        assert!(!self.is_leaf, "split_child called on a leaf");
        assert!(!self.is_full(), "split_child called on a full parent");

        let mid = self.degree.median();
        let full = &mut self.children[i];
        assert!(full.is_full(), "split_child called on a non-full child");

        let mut sibling = BTreeNode::new(self.degree, full.is_leaf);
        sibling.keys.extend(full.keys.drain(mid + 1..));
        sibling.values.extend(full.values.drain(mid + 1..));
        if !full.is_leaf {
            sibling.children.extend(full.children.drain(mid + 1..));
        }

        // Only the median remains past the lower half
        let median_key = full.keys.remove(mid);
        let median_value = full.values.remove(mid);

        full.debug_assert_capacity();
        sibling.debug_assert_capacity();

        tracing::debug!(
            median = median_key,
            position = i,
            leaf = sibling.is_leaf,
            "split child node"
        );

        self.keys.insert(i, median_key);
        self.values.insert(i, median_value);
        self.children.insert(i + 1, Box::new(sibling));
        self.debug_assert_capacity();
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// In-order iterator over the subtree rooted here.
    pub fn traverse(&self) -> Iter<'_> {
        Iter::new(self)
    }

    // ========================================================================
    // Invariant checks
    // ========================================================================

    fn debug_assert_capacity(&self) {
        debug_assert!(self.keys.len() <= self.degree.max_keys());
        debug_assert_eq!(self.keys.len(), self.values.len());
        debug_assert!(self.is_leaf || self.children.len() == self.keys.len() + 1);
        debug_assert!(!self.is_leaf || self.children.is_empty());
    }

    /// Check every structural invariant of the subtree rooted here.
    ///
    /// `lower`/`upper` are the exclusive key bounds inherited from the
    /// parent. `leaf_depth` records the depth of the first leaf reached;
    /// every other leaf must match it.
    pub(super) fn validate(
        &self,
        is_root: bool,
        lower: Option<Key>,
        upper: Option<Key>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<()> {
        let n = self.keys.len();

        if self.values.len() != n {
            return Err(violation(format!(
                "depth {}: {} keys but {} values",
                depth,
                n,
                self.values.len()
            )));
        }
        if n > self.degree.max_keys() {
            return Err(violation(format!(
                "depth {}: {} keys exceeds max {}",
                depth,
                n,
                self.degree.max_keys()
            )));
        }
        if !is_root && n < self.degree.min_keys() {
            return Err(violation(format!(
                "depth {}: {} keys below min {}",
                depth,
                n,
                self.degree.min_keys()
            )));
        }
        if self.keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(violation(format!(
                "depth {}: keys not strictly increasing: {:?}",
                depth, self.keys
            )));
        }
        if let (Some(lo), Some(&first)) = (lower, self.keys.first()) {
            if first <= lo {
                return Err(violation(format!(
                    "depth {}: key {} not above separator {}",
                    depth, first, lo
                )));
            }
        }
        if let (Some(hi), Some(&last)) = (upper, self.keys.last()) {
            if last >= hi {
                return Err(violation(format!(
                    "depth {}: key {} not below separator {}",
                    depth, last, hi
                )));
            }
        }

        if self.is_leaf {
            if !self.children.is_empty() {
                return Err(violation(format!("depth {}: leaf with children", depth)));
            }
            return match *leaf_depth {
                None => {
                    *leaf_depth = Some(depth);
                    Ok(())
                }
                Some(d) if d == depth => Ok(()),
                Some(d) => Err(violation(format!(
                    "leaf at depth {} but another leaf at depth {}",
                    depth, d
                ))),
            };
        }

        if self.children.len() != n + 1 {
            return Err(violation(format!(
                "depth {}: {} keys but {} children",
                depth,
                n,
                self.children.len()
            )));
        }

        for (i, child) in self.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { Some(self.keys[i - 1]) };
            let hi = if i == n { upper } else { Some(self.keys[i]) };
            child.validate(false, lo, hi, depth + 1, leaf_depth)?;
        }
        Ok(())
    }

    /// Write an indented dump of the subtree rooted here.
    pub(super) fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(
            f,
            "{:indent$}{} {:?}",
            "",
            if self.is_leaf { "leaf" } else { "node" },
            self.keys,
            indent = depth * 2
        )?;
        for child in &self.children {
            child.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

fn violation(msg: String) -> Error {
    Error::InvariantViolation(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degree(d: usize) -> Degree {
        Degree::new(d).unwrap()
    }

    /// Build a full leaf holding keys `start, start+step, ...`.
    fn full_leaf(d: Degree, start: Key, step: Key) -> BTreeNode {
        let mut leaf = BTreeNode::new(d, true);
        for j in 0..d.max_keys() as Key {
            let k = start + j * step;
            leaf.insert_non_full(k, format!("v{}", k)).unwrap();
        }
        assert!(leaf.is_full());
        leaf
    }

    #[test]
    fn test_new_node_is_empty() {
        let leaf = BTreeNode::new(degree(2), true);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.num_keys(), 0);
        assert_eq!(leaf.num_children(), 0);
        assert!(!leaf.is_full());
        assert_eq!(leaf.height(), 1);

        let internal = BTreeNode::new(degree(2), false);
        assert!(!internal.is_leaf());
        assert_eq!(internal.num_keys(), 0);
    }

    #[test]
    fn test_try_new_rejects_degree_one() {
        assert!(matches!(
            BTreeNode::try_new(1, true),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(BTreeNode::try_new(2, false).is_ok());
    }

    #[test]
    fn test_leaf_insert_keeps_order() {
        let mut leaf = BTreeNode::new(degree(3), true);
        for k in [30, 10, 50, 20, 40] {
            assert_eq!(leaf.insert_non_full(k, format!("v{}", k)).unwrap(), 0);
        }
        assert_eq!(leaf.keys(), &[10, 20, 30, 40, 50]);
        assert_eq!(leaf.values()[0], "v10");
        assert_eq!(leaf.values()[4], "v50");
    }

    #[test]
    fn test_leaf_insert_duplicate_rejected() {
        let mut leaf = BTreeNode::new(degree(2), true);
        leaf.insert_non_full(5, "a".into()).unwrap();
        assert_eq!(
            leaf.insert_non_full(5, "b".into()),
            Err(Error::DuplicateKey(5))
        );
        assert_eq!(leaf.keys(), &[5]);
        assert_eq!(leaf.values(), &["a".to_string()]);
    }

    #[test]
    #[should_panic(expected = "full node")]
    fn test_insert_into_full_node_panics() {
        let mut leaf = full_leaf(degree(2), 1, 1);
        let _ = leaf.insert_non_full(100, "x".into());
    }

    #[test]
    fn test_split_leaf_child() {
        let d = degree(2);
        let mut root = BTreeNode::new_root(full_leaf(d, 1, 1));
        root.split_child(0);

        assert_eq!(root.keys(), &[2]);
        assert_eq!(root.values(), &["v2".to_string()]);
        assert_eq!(root.num_children(), 2);

        let left = root.child(0).unwrap();
        let right = root.child(1).unwrap();
        assert_eq!(left.keys(), &[1]);
        assert_eq!(right.keys(), &[3]);
        assert_eq!(left.num_keys(), d.min_keys());
        assert_eq!(right.num_keys(), d.min_keys());
        assert!(left.is_leaf() && right.is_leaf());

        // Median value moved up with its key, nothing lost
        let pairs: Vec<_> = root.traverse().collect();
        assert_eq!(pairs, vec![(1, "v1"), (2, "v2"), (3, "v3")]);

        let mut leaf_depth = None;
        root.validate(true, None, None, 0, &mut leaf_depth).unwrap();
    }

    #[test]
    fn test_split_larger_degree() {
        let d = degree(4);
        let mut root = BTreeNode::new_root(full_leaf(d, 10, 10));
        root.split_child(0);

        // 7 keys: 10..70, median index 3 => 40
        assert_eq!(root.keys(), &[40]);
        assert_eq!(root.child(0).unwrap().keys(), &[10, 20, 30]);
        assert_eq!(root.child(1).unwrap().keys(), &[50, 60, 70]);
    }

    #[test]
    fn test_split_internal_child() {
        let d = degree(2);

        // Grow a height-2 tree by hand until its root is full:
        // root [2, 4, 6] over leaves [1] [3] [5] [7, 8]
        let mut node = BTreeNode::new(d, true);
        for k in 1..=8 {
            if node.is_full() {
                let mut root = BTreeNode::new_root(node);
                root.split_child(0);
                node = root;
            }
            node.insert_non_full(k, k.to_string()).unwrap();
        }

        assert_eq!(node.keys(), &[2, 4, 6]);
        assert_eq!(node.num_children(), 4);

        let mut root = BTreeNode::new_root(node);
        assert!(root.child(0).unwrap().is_full());
        root.split_child(0);

        let left = root.child(0).unwrap();
        let right = root.child(1).unwrap();
        assert_eq!(root.keys(), &[4]);
        assert_eq!(left.keys(), &[2]);
        assert_eq!(right.keys(), &[6]);
        assert_eq!(left.num_children(), 2);
        assert_eq!(right.num_children(), 2);
        assert_eq!(left.child(0).unwrap().keys(), &[1]);
        assert_eq!(left.child(1).unwrap().keys(), &[3]);
        assert_eq!(right.child(0).unwrap().keys(), &[5]);
        assert_eq!(right.child(1).unwrap().keys(), &[7, 8]);

        let keys: Vec<Key> = root.traverse().map(|(k, _)| k).collect();
        assert_eq!(keys, (1..=8).collect::<Vec<_>>());

        let mut leaf_depth = None;
        root.validate(true, None, None, 0, &mut leaf_depth).unwrap();
    }

    #[test]
    fn test_internal_insert_splits_full_child() {
        let d = degree(2);
        let mut root = BTreeNode::new_root(full_leaf(d, 10, 10));
        root.split_child(0);
        // root [20], children [10] [30]
        root.insert_non_full(40, "v40".into()).unwrap();
        root.insert_non_full(50, "v50".into()).unwrap();
        // right child now full: [30, 40, 50]
        assert!(root.child(1).unwrap().is_full());

        let splits = root.insert_non_full(45, "v45".into()).unwrap();
        assert_eq!(splits, 1);
        assert_eq!(root.keys(), &[20, 40]);
        assert_eq!(root.child(2).unwrap().keys(), &[45, 50]);
    }

    #[test]
    fn test_internal_insert_duplicate_of_median() {
        let d = degree(2);
        let mut root = BTreeNode::new_root(full_leaf(d, 10, 10));
        root.split_child(0);
        root.insert_non_full(40, "v40".into()).unwrap();
        root.insert_non_full(50, "v50".into()).unwrap();

        // 40 is the median of the full right child
        assert_eq!(
            root.insert_non_full(40, "dup".into()),
            Err(Error::DuplicateKey(40))
        );
        assert_eq!(root.search(40).map(|(n, i)| n.values()[i].as_str()), Some("v40"));
    }

    #[test]
    fn test_search_node_and_index() {
        let d = degree(2);
        let mut root = BTreeNode::new_root(full_leaf(d, 1, 1));
        root.split_child(0);

        let (node, i) = root.search(2).unwrap();
        assert!(!node.is_leaf());
        assert_eq!(i, 0);

        let (node, i) = root.search(3).unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.keys()[i], 3);

        assert!(root.search(0).is_none());
        assert!(root.search(4).is_none());
    }

    #[test]
    fn test_search_childless_internal_node() {
        let internal = BTreeNode::new(degree(2), false);
        assert!(internal.search(5).is_none());
        assert_eq!(internal.first(), None);
        assert_eq!(internal.last(), None);
        assert_eq!(internal.traverse().next(), None);
    }

    #[test]
    fn test_insert_childless_internal_node() {
        let mut internal = BTreeNode::new(degree(2), false);
        let err = internal.insert_non_full(5, "x".into()).unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
        assert_eq!(internal.num_keys(), 0);
        assert_eq!(internal.num_children(), 0);
    }

    #[test]
    fn test_new_root_before_split() {
        // Keyless root over an empty leaf: search misses, insert routes into the leaf
        let mut root = BTreeNode::new_root(BTreeNode::new(degree(2), true));
        assert!(root.search(1).is_none());

        root.insert_non_full(1, "a".into()).unwrap();
        assert_eq!(root.child(0).unwrap().keys(), &[1]);
        assert!(root.search(1).is_some());
    }

    #[test]
    fn test_first_last() {
        let empty = BTreeNode::new(degree(2), true);
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);

        let mut root = BTreeNode::new_root(full_leaf(degree(2), 5, 5));
        root.split_child(0);
        assert_eq!(root.first(), Some((5, "v5")));
        assert_eq!(root.last(), Some((15, "v15")));
    }

    #[test]
    fn test_validate_detects_bad_order() {
        let mut leaf = BTreeNode::new(degree(2), true);
        leaf.keys = vec![3, 1];
        leaf.values = vec!["a".into(), "b".into()];

        let mut leaf_depth = None;
        let err = leaf
            .validate(true, None, None, 0, &mut leaf_depth)
            .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_validate_detects_underfull_child() {
        let d = degree(3);
        let mut root = BTreeNode::new(d, false);
        let mut left = BTreeNode::new(d, true);
        let mut right = BTreeNode::new(d, true);
        left.insert_non_full(1, "a".into()).unwrap();
        right.insert_non_full(9, "b".into()).unwrap();
        right.insert_non_full(10, "c".into()).unwrap();
        root.keys.push(5);
        root.values.push("m".into());
        root.children.push(Box::new(left));
        root.children.push(Box::new(right));

        let mut leaf_depth = None;
        let err = root
            .validate(true, None, None, 0, &mut leaf_depth)
            .unwrap_err();
        assert!(err.to_string().contains("below min"));
    }
}
