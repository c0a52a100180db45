//! Core domain model for cantor.
//!
//! This crate defines the hymn catalog model, the error taxonomy shared by
//! the search layer, the [`Catalog`] interface with its predicate sets, and
//! the SQLite schema that implements it.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod error;
pub mod filter;
pub mod model;
pub mod schema;
pub mod text;
pub mod trigram;

pub use catalog::Catalog;
pub use error::{Error, Result};
pub use filter::{HymnFilter, LyricTerm, NameField};
