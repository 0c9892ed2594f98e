//! Storage layer for the Bahi posting core.
//!
//! This crate provides:
//! - [`MemoryStore`], a serializable all-or-nothing implementation of the
//!   core's repository traits
//! - [`StaticPartyDirectory`], a fixed party-to-jurisdiction lookup

pub mod memory;
pub mod parties;

pub use memory::{MemoryStore, MemoryTx};
pub use parties::StaticPartyDirectory;
