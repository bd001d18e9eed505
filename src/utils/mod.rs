//! Input sanitization and validation helpers.
//!
//! - [`sanitize`] - Tracking-parameter sanitization and field validation
//! - [`url_validator`] - Landing-page URL validation and cleaning

pub mod sanitize;
pub mod url_validator;
