//! Flatteners, one per roster table.
//!
//! Each chamber module turns a parsed feed into its tables; the metadata
//! flattener is shared and switches on the chamber.

pub mod house;
mod metadata;
pub mod senate;

pub use metadata::flatten_metadata;
