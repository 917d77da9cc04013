//! btree_index - An in-memory B-tree mapping integer keys to string values.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          btree_index                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Tree handle (index::btree::BTree)           │   │
//! │  │     root ownership + root growth + split counters        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Nodes (index::btree::BTreeNode)             │   │
//! │  │     search → insert_non_full → split_child → traverse    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                  Common (common/)                        │   │
//! │  │          Degree + Error/Result + config constants        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (Degree, Error, config)
//! - [`index`] - Index structures (B-tree)
//!
//! # Quick Start
//! ```
//! use btree_index::BTree;
//!
//! let mut tree = BTree::new(2).unwrap();
//! for (k, v) in [(10, "a"), (20, "b"), (5, "c")] {
//!     tree.insert(k, v).unwrap();
//! }
//!
//! assert_eq!(tree.search(20).unwrap(), "b");
//! assert_eq!(tree.first(), Some((5, "c")));
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_DEGREE, MIN_DEGREE};
pub use common::{Degree, Error, Key, Result, Value};

pub use index::btree::{BTree, BTreeNode, Iter, TreeStats};
