//! Error types for the B-tree index.

use thiserror::Error;

use crate::common::Key;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the index.
///
/// Every error is local and synchronous: it is returned to the caller of
/// the operation that detected it and nothing is retried internally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The tree was created with an unusable branching factor.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The key is already present in the tree.
    ///
    /// Insertion never overwrites; use `BTree::update` for that.
    #[error("Key {0} already exists")]
    DuplicateKey(Key),

    /// The key is not present in the tree.
    ///
    /// This is an expected negative result of a lookup, not a fault.
    #[error("Key {0} not found")]
    NotFound(Key),

    /// A structural check found a broken B-tree invariant.
    ///
    /// This indicates a bug in the node split/insert logic.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Whether this error is the ordinary "key absent" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
