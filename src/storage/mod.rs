//! Storage layer for the castaway ledger
//!
//! This module provides a clean abstraction over the SQLite database,
//! organized into logical components:
//! - `models`: Data structures
//! - `schema`: Database connection and schema management
//! - `queries`: Reads plus the collaborator-owned writes the engine consumes
//! - `fixture`: Bulk seeding from a JSON document

pub mod fixture;
pub mod models;
pub mod queries;
pub mod schema;

#[cfg(test)]
mod tests;

// Re-export the main types and database struct for easy access
pub use fixture::{Fixture, FixtureSummary};
pub use models::*;
pub use schema::LedgerDatabase;
