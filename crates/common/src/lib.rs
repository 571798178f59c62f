//! Shared types for the entry API crates.

mod types;

pub use types::AggregateId;
