//! Conversation state machine for building a campaign's tracking links.
//!
//! # Flow
//!
//! 1. The client sends a [`UserAction`] to a [`CampaignSession`]
//! 2. [`transition`] applies it to the draft and returns a [`Directive`]
//! 3. The session queues bot turns, re-renders the step with [`render`] and
//!    flushes the queue into the [`Transcript`]
//! 4. Any network work comes back as an [`Effect`] for the application layer

pub mod action;
pub mod render;
pub mod session;
pub mod settings;
pub mod step;
pub mod transcript;
pub mod transition;
pub mod turns;

pub use action::{ActionKind, UserAction};
pub use render::{FailureNotice, Prompt, RenderContext, render};
pub use session::{CampaignSession, Effect, Owner, SessionSnapshot, Ticket};
pub use settings::{FlowSettings, TermSelection};
pub use step::{Step, SuggestionSource};
pub use transcript::{Actor, Message, OfferedOption, OptionState, Transcript};
pub use transition::{Directive, TransitionContext, transition};
pub use turns::{BotTurn, TurnQueue};
