//! Common types and utilities shared across the index.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - The validated [`Degree`] newtype
//! - Key and value type aliases

pub mod config;
mod degree;
pub mod error;

pub use degree::Degree;
pub use error::{Error, Result};

/// Key type stored in the tree.
pub type Key = i64;

/// Value type associated with each key.
pub type Value = String;
