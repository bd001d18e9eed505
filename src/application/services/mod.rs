//! Business logic services for the application layer.

pub mod conversation_service;
pub mod link_generator;
pub mod tag_service;

pub use conversation_service::{ConversationService, Gateway};
pub use link_generator::{LinkGenerationError, generate_links};
pub use tag_service::TagService;
