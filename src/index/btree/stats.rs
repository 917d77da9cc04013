//! Tree shape statistics.

use std::fmt;

use crate::index::btree::BTreeNode;

/// A point-in-time snapshot of a tree's shape.
///
/// Produced by [`BTree::stats`](super::BTree::stats). The structural
/// counts come from a full walk of the tree; `splits` and `root_splits`
/// are running totals kept by the tree handle since creation.
///
/// # Example
/// ```
/// use btree_index::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// for k in 0..4 {
///     tree.insert(k, "x").unwrap();
/// }
/// let stats = tree.stats();
/// assert_eq!(stats.height, 2);
/// assert_eq!(stats.root_splits, 1);
/// println!("{}", stats);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    /// Number of levels (1 for a lone root).
    pub height: usize,

    /// Total number of nodes.
    pub node_count: usize,

    /// Number of leaf nodes.
    pub leaf_count: usize,

    /// Total number of keys across all nodes.
    pub key_count: usize,

    /// Key capacity of a single node (`2*degree - 1`).
    pub max_keys_per_node: usize,

    /// Node splits performed, root splits included.
    pub splits: u64,

    /// Splits that grew the tree by one level.
    pub root_splits: u64,
}

impl TreeStats {
    /// Walk `root` and count its nodes and keys.
    pub(crate) fn collect(root: &BTreeNode, splits: u64, root_splits: u64) -> Self {
        let mut stats = TreeStats {
            height: root.height(),
            max_keys_per_node: root.degree().max_keys(),
            splits,
            root_splits,
            ..Default::default()
        };

        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            stats.node_count += 1;
            stats.key_count += node.num_keys();
            if node.is_leaf() {
                stats.leaf_count += 1;
            }
            pending.extend(node.children.iter().map(Box::as_ref));
        }
        stats
    }

    /// Fraction of key slots in use (0.0 to 1.0).
    pub fn fill_factor(&self) -> f64 {
        let capacity = self.node_count * self.max_keys_per_node;
        if self.key_count == 0 || capacity == 0 {
            0.0
        } else {
            self.key_count as f64 / capacity as f64
        }
    }

    /// Number of internal (non-leaf) nodes.
    pub fn internal_count(&self) -> usize {
        self.node_count - self.leaf_count
    }
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ keys: {}, nodes: {}, leaves: {}, height: {}, splits: {}, fill: {:.2}% }}",
            self.key_count,
            self.node_count,
            self.leaf_count,
            self.height,
            self.splits,
            self.fill_factor() * 100.0
        )
    }
}
