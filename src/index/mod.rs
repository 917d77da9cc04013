//! Index structures.
//!
//! Currently implements:
//! - [`btree`] - In-memory B-tree keyed by `i64`

pub mod btree;
