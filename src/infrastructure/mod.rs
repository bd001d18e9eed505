//! Infrastructure layer for external integrations.
//!
//! Implements the persistence and suggestion traits defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`memory`] - In-process repositories for database-less runs and tests
//! - [`suggestions`] - HTTP and no-op suggestion providers

pub mod memory;
pub mod persistence;
pub mod suggestions;
