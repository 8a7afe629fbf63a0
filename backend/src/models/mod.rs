//! Domain model for the patient registry.
//!
//! Entities mirror the relational schema one-to-one. Optional columns are
//! `Option<T>`; a missing value is never encoded as an empty string.

pub mod catalog;
pub mod date;
pub mod macros;
pub mod patient;
pub mod relationship;

pub use catalog::*;
pub use date::*;
pub use patient::*;
pub use relationship::*;
