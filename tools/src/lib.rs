//! Data layer for the copilot orchestrator: record types, the [`DataStore`]
//! seam to the platform's relational store, and an in-memory implementation
//! used by tests and the demo gateway.

pub mod memory;
pub mod records;
pub mod store;

pub use memory::MemoryStore;
pub use records::*;
pub use store::*;
