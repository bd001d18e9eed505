//! Core domain entities.
//!
//! Plain data structures for the campaign draft and everything it produces.
//!
//! # Entity Types
//!
//! - [`CampaignDraft`] - the in-progress selections of one conversation
//! - [`LandingPage`] - a target URL chosen in a draft
//! - [`GeneratedLink`] - a finished tracking link
//! - [`Tag`] - an organizational tag known to an account
//! - [`Suggestion`] - a candidate value offered on a step
//!
//! `New*` structs carry the data needed to persist a record; `*Record`
//! structs are what the persistence gateway returns.

pub mod draft;
pub mod landing_page;
pub mod suggestion;
pub mod tag;
pub mod tracking_link;

pub use draft::{CampaignDraft, DraftError, Toggled, pair_key};
pub use landing_page::{LandingPage, LandingPageRecord, NewLandingPage};
pub use suggestion::{Suggestion, TermSuggestion, rank_most_used};
pub use tag::{NewTag, Tag, TagOutcome};
pub use tracking_link::{Combination, GeneratedLink, NewTrackingLink, TrackingLinkRecord};
