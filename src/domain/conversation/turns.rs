//! Queued bot turns.
//!
//! A transition never writes bot messages directly. It enqueues the turns it
//! wants to emit and the session flushes the queue into the transcript in
//! order once the transition is complete, with no timers involved.

use std::collections::VecDeque;

use super::transcript::{Actor, OfferedOption, Transcript};

/// A bot message waiting to be emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotTurn {
    pub text: String,
    pub options: Option<Vec<OfferedOption>>,
}

impl BotTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: None,
        }
    }

    pub fn with_options(text: impl Into<String>, options: Vec<OfferedOption>) -> Self {
        Self {
            text: text.into(),
            options: Some(options),
        }
    }
}

/// FIFO of pending bot turns.
#[derive(Debug, Clone, Default)]
pub struct TurnQueue {
    pending: VecDeque<BotTurn>,
}

impl TurnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, turn: BotTurn) {
        self.pending.push_back(turn);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops queued turns without emitting them (restart).
    pub fn discard(&mut self) {
        self.pending.clear();
    }

    /// Emits every pending turn into the transcript, oldest first.
    ///
    /// Returns the number of emitted turns.
    pub fn flush(&mut self, transcript: &mut Transcript) -> usize {
        let mut emitted = 0;
        while let Some(turn) = self.pending.pop_front() {
            transcript.push(Actor::Bot, turn.text, turn.options);
            emitted += 1;
        }
        emitted
    }
}
