//! B-tree index implementation.
//!
//! # Components
//! - [`BTree`] - The tree handle (root ownership, root growth)
//! - [`BTreeNode`] - A node: search, insertion, splitting
//! - [`Iter`] - Lazy in-order traversal
//! - [`TreeStats`] - Shape statistics snapshot

mod iter;
mod node;
mod stats;
mod tree;

pub use iter::Iter;
pub use node::BTreeNode;
pub use stats::TreeStats;
pub use tree::BTree;
