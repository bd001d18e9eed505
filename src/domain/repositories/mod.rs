//! Repository and provider trait definitions for the domain layer.
//!
//! These traits are the persistence gateway and suggestion boundary the
//! conversation calls through. Implementations live in
//! `crate::infrastructure`; mocks are generated with `mockall` for tests.
//!
//! # Available Traits
//!
//! - [`CampaignRepository`] - recent campaign names
//! - [`LandingPageRepository`] - known landing pages and landing page creation
//! - [`TagRepository`] - account tags
//! - [`TrackingLinkRepository`] - generated link storage
//! - [`SuggestionProvider`] - content and term suggestions

pub mod campaign_repository;
pub mod landing_page_repository;
pub mod suggestion_provider;
pub mod tag_repository;
pub mod tracking_link_repository;

pub use campaign_repository::CampaignRepository;
pub use landing_page_repository::LandingPageRepository;
pub use suggestion_provider::SuggestionProvider;
pub use tag_repository::TagRepository;
pub use tracking_link_repository::TrackingLinkRepository;

#[cfg(test)]
pub use campaign_repository::MockCampaignRepository;
#[cfg(test)]
pub use landing_page_repository::MockLandingPageRepository;
#[cfg(test)]
pub use suggestion_provider::MockSuggestionProvider;
#[cfg(test)]
pub use tag_repository::MockTagRepository;
#[cfg(test)]
pub use tracking_link_repository::MockTrackingLinkRepository;
