//! In-process persistence backend.
//!
//! Used when no database is configured, and by the HTTP tests.

mod store;

pub use store::InMemoryStore;
