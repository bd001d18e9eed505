//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgCampaignRepository`] - Recent campaign names
//! - [`PgLandingPageRepository`] - Landing pages per campaign
//! - [`PgTagRepository`] - Account tags
//! - [`PgTrackingLinkRepository`] - Generated tracking links

pub mod pg_campaign_repository;
pub mod pg_landing_page_repository;
pub mod pg_tag_repository;
pub mod pg_tracking_link_repository;

pub use pg_campaign_repository::PgCampaignRepository;
pub use pg_landing_page_repository::PgLandingPageRepository;
pub use pg_tag_repository::PgTagRepository;
pub use pg_tracking_link_repository::PgTrackingLinkRepository;
