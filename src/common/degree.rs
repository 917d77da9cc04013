//! Minimum-degree type.

use std::fmt;

use crate::common::config::{DEFAULT_DEGREE, MIN_DEGREE};
use crate::common::{Error, Result};

/// The minimum branching factor of a B-tree, fixed at tree creation.
///
/// Every capacity bound of a node is derived from it:
/// - `max_keys = 2 * degree - 1`
/// - `max_children = 2 * degree`
/// - `min_keys = degree - 1` (all nodes except the root)
///
/// A `Degree` can only be built through [`Degree::new`], so holding one
/// means the value is at least [`MIN_DEGREE`].
///
/// # Example
/// ```
/// use btree_index::Degree;
///
/// let degree = Degree::new(2).unwrap();
/// assert_eq!(degree.max_keys(), 3);
/// assert_eq!(degree.max_children(), 4);
/// assert!(Degree::new(1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Degree(usize);

impl Degree {
    /// The degree trees get when none is specified.
    pub const DEFAULT: Degree = Degree(DEFAULT_DEGREE);

    /// Validate and wrap a minimum degree.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `degree < MIN_DEGREE`
    pub fn new(degree: usize) -> Result<Self> {
        if degree < MIN_DEGREE {
            return Err(Error::InvalidConfiguration(format!(
                "degree must be at least {}, got {}",
                MIN_DEGREE, degree
            )));
        }
        Ok(Degree(degree))
    }

    /// The raw degree value.
    #[inline]
    pub fn get(&self) -> usize {
        self.0
    }

    /// Maximum number of keys a node may hold.
    #[inline]
    pub fn max_keys(&self) -> usize {
        2 * self.0 - 1
    }

    /// Maximum number of children an internal node may hold.
    #[inline]
    pub fn max_children(&self) -> usize {
        2 * self.0
    }

    /// Minimum number of keys for every node except the root.
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.0 - 1
    }

    /// Index of the median key in a full node.
    #[inline]
    pub fn median(&self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Degree({})", self.0)
    }
}
