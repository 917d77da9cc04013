//! Configuration constants for the B-tree index.

/// Smallest legal minimum degree.
///
/// A degree of 1 would allow nodes with zero keys and two children, and
/// a full node (1 key) could not be split into two non-empty halves.
pub const MIN_DEGREE: usize = 2;

/// Degree used by [`BTree::default`](crate::BTree).
///
/// With degree 3:
/// - Max keys per node: 5
/// - Max children per node: 6
/// - Min keys per non-root node: 2
pub const DEFAULT_DEGREE: usize = 3;
