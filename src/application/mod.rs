//! Application layer services implementing business logic.
//!
//! This layer orchestrates the conversation: it owns the live sessions, runs
//! the network work they request through repository and provider traits, and
//! turns drafts into tracking links.
//!
//! # Available Services
//!
//! - [`services::conversation_service::ConversationService`] - Session lifecycle and effects
//! - [`services::tag_service::TagService`] - Tag registration with conflict resolution
//! - [`services::link_generator`] - Tracking URL construction
//! - [`session_store::SessionStore`] - In-memory registry of live sessions

pub mod services;
pub mod session_store;
