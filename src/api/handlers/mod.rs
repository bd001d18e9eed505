//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod sessions;

pub use health::health_handler;
pub use sessions::{
    apply_action_handler, create_session_handler, delete_session_handler, get_session_handler,
};
