//! The tree handle: root ownership and root growth.

use std::fmt;

use crate::common::{Degree, Error, Key, Result, Value};
use crate::index::btree::{BTreeNode, Iter, TreeStats};

/// An in-memory B-tree mapping `i64` keys to `String` values.
///
/// # Architecture
/// ```text
/// ┌────────────────────────────────────────────┐
/// │ BTree                                      │
/// │   degree ── fixed at creation              │
/// │   root ───▶ BTreeNode                      │
/// │               ├─▶ Box<BTreeNode> ...       │
/// │               └─▶ Box<BTreeNode> ...       │
/// └────────────────────────────────────────────┘
/// ```
///
/// Every node is exclusively owned by its parent, and the root by the
/// handle. Dropping the handle releases the whole tree.
///
/// # Concurrency
/// Mutation needs `&mut self`, so readers and an inserter can never
/// overlap. The tree carries no internal locking; wrap it in a lock to
/// share it across threads.
///
/// # Usage
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(2)?;
/// tree.insert(10, "a")?;
/// tree.insert(5, "b")?;
///
/// assert_eq!(tree.search(10)?, "a");
/// assert!(tree.search(7).is_err());
///
/// let keys: Vec<i64> = tree.traverse().map(|(k, _)| k).collect();
/// assert_eq!(keys, vec![5, 10]);
/// # Ok::<(), btree_index::Error>(())
/// ```
#[derive(Debug)]
pub struct BTree {
    root: BTreeNode,

    degree: Degree,

    /// Number of keys stored.
    len: usize,

    /// Running split counters, reported through `stats()`.
    splits: u64,
    root_splits: u64,
}

impl BTree {
    /// Create an empty tree with the given minimum degree.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `degree < 2`
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self::from_degree(Degree::new(degree)?))
    }

    /// Create an empty tree with [`DEFAULT_DEGREE`](crate::common::config::DEFAULT_DEGREE).
    pub fn with_default_degree() -> Self {
        Self::from_degree(Degree::DEFAULT)
    }

    /// Create an empty tree from an already validated degree.
    pub fn from_degree(degree: Degree) -> Self {
        tracing::debug!(degree = degree.get(), "creating B-tree");

        Self {
            root: BTreeNode::new(degree, true),
            degree,
            len: 0,
            splits: 0,
            root_splits: 0,
        }
    }

    // ========================================================================
    // Public API: Accessors
    // ========================================================================

    /// The branching factor fixed at creation.
    pub fn degree(&self) -> Degree {
        self.degree
    }

    /// Number of keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; an empty tree is a single empty leaf (height 1).
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Read-only access to the root node.
    pub fn root(&self) -> &BTreeNode {
        &self.root
    }

    // ========================================================================
    // Public API: Insert and update
    // ========================================================================

    /// Insert a new key.
    ///
    /// If the root is full it is split first, growing the tree by one
    /// level; this is the only way the height increases.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is already present. The tree is
    ///   left untouched.
    pub fn insert(&mut self, key: Key, value: impl Into<Value>) -> Result<()> {
        tracing::trace!(key, "insert");

        if self.contains_key(key) {
            return Err(Error::DuplicateKey(key));
        }

        if self.root.is_full() {
            self.grow_root();
        }

        let splits = self.root.insert_non_full(key, value.into())?;
        self.splits += splits as u64;
        self.len += 1;
        Ok(())
    }

    /// Replace the value of an existing key, returning the old value.
    ///
    /// Never changes the shape of the tree.
    ///
    /// # Errors
    /// - `Error::NotFound` if `key` is absent
    pub fn update(&mut self, key: Key, value: impl Into<Value>) -> Result<Value> {
        tracing::trace!(key, "update");

        match self.root.value_mut(key) {
            Some(slot) => Ok(std::mem::replace(slot, value.into())),
            None => Err(Error::NotFound(key)),
        }
    }

    /// Put a fresh root above the full current root and split it.
    fn grow_root(&mut self) {
        let old_root = std::mem::replace(&mut self.root, BTreeNode::new(self.degree, true));
        self.root = BTreeNode::new_root(old_root);
        self.root.split_child(0);

        self.splits += 1;
        self.root_splits += 1;
        tracing::debug!(height = self.root.height(), "root split, tree grew");
    }

    // ========================================================================
    // Public API: Lookup
    // ========================================================================

    /// Look up the value stored for `key`.
    ///
    /// # Errors
    /// - `Error::NotFound` if `key` is absent. This is an ordinary
    ///   negative answer; use [`get`](Self::get) to receive an `Option`.
    pub fn search(&self, key: Key) -> Result<&str> {
        self.get(key).ok_or(Error::NotFound(key))
    }

    /// Look up the value stored for `key`.
    pub fn get(&self, key: Key) -> Option<&str> {
        self.root
            .search(key)
            .map(|(node, i)| node.values()[i].as_str())
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: Key) -> bool {
        self.root.search(key).is_some()
    }

    /// Smallest entry.
    pub fn first(&self) -> Option<(Key, &str)> {
        self.root.first()
    }

    /// Largest entry.
    pub fn last(&self) -> Option<(Key, &str)> {
        self.root.last()
    }

    /// In-order iterator over all `(key, value)` pairs.
    pub fn traverse(&self) -> Iter<'_> {
        Iter::with_len(&self.root, self.len)
    }

    // ========================================================================
    // Public API: Diagnostics
    // ========================================================================

    /// Snapshot of the tree's shape and split counters.
    pub fn stats(&self) -> TreeStats {
        TreeStats::collect(&self.root, self.splits, self.root_splits)
    }

    /// Check every B-tree invariant.
    ///
    /// Verifies child counts, per-node key bounds (root exempt from the
    /// minimum), key ordering within and across nodes, uniform leaf depth,
    /// and that the stored length matches the number of keys.
    ///
    /// # Errors
    /// - `Error::InvariantViolation` describing the first broken rule
    pub fn validate(&self) -> Result<()> {
        let mut leaf_depth = None;
        self.root.validate(true, None, None, 0, &mut leaf_depth)?;

        let counted = self.traverse().count();
        if counted != self.len {
            return Err(Error::InvariantViolation(format!(
                "len is {} but tree holds {} keys",
                self.len, counted
            )));
        }
        Ok(())
    }
}

impl Default for BTree {
    fn default() -> Self {
        Self::with_default_degree()
    }
}

impl<'a> IntoIterator for &'a BTree {
    type Item = (Key, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.traverse()
    }
}

impl fmt::Display for BTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BTree {{ degree: {}, len: {}, height: {} }}",
            self.degree.get(),
            self.len,
            self.height()
        )?;
        self.root.fmt_tree(f, 1)
    }
}
