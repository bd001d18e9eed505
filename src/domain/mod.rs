//! Domain layer containing business entities and logic.
//!
//! Nothing in this layer performs I/O. Repository and provider traits define
//! the contracts that the infrastructure layer implements.
//!
//! # Architecture
//!
//! - [`entities`] - the campaign draft and the records it produces
//! - [`conversation`] - the step state machine and transcript
//! - [`retry_controller`] - consecutive-failure accounting
//! - [`repositories`] - persistence gateway and suggestion traits

pub mod conversation;
pub mod entities;
pub mod repositories;
pub mod retry_controller;
