//! # matchX Core
//!
//! Core types shared by the matchX crates:
//!
//! - [`ProfileRecord`] - A user's matching attributes with defaulted fields
//! - [`ProfileCorpus`] - An immutable snapshot of profiles with uid lookup
//! - [`Vector`] - Dense feature vector with cosine similarity
//! - [`Error`] - The error taxonomy returned by every matchX operation
//!
//! ## Example
//!
//! ```rust
//! use matchx_core::{ProfileCorpus, ProfileRecord};
//!
//! let corpus = ProfileCorpus::new(vec![
//!     ProfileRecord::new("a", "Alex").with_age(30).with_gender("Male"),
//!     ProfileRecord::new("b", "Bea").with_age(28).with_gender("Female"),
//! ])
//! .unwrap();
//!
//! assert_eq!(corpus.position("b"), Some(1));
//! ```

pub mod error;
pub mod profile;
pub mod vector;

pub use error::{Error, Result};
pub use profile::{CategoricalColumn, NumericColumn, ProfileCorpus, ProfileRecord, MAX_AGE};
pub use vector::Vector;
