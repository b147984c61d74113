//! Per-chat conversational state
//!
//! Lives only in memory and is owned by the chat's worker task, so no locking
//! is needed.

use crate::channels::MessageRef;
use crate::controller::State;
use crate::word::Candidate;

/// Ephemeral state of one chat
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    state: State,
    pending: Option<Candidate>,
    review_cursor: usize,
    last_message: Option<MessageRef>,
    last_audio: Option<MessageRef>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current controller state
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Replace the candidate awaiting a decision
    pub fn set_pending(&mut self, candidate: Candidate) {
        self.pending = Some(candidate);
    }

    /// Candidate awaiting a decision; reading does not clear it
    #[must_use]
    pub const fn pending(&self) -> Option<&Candidate> {
        self.pending.as_ref()
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Offset of the review entry currently shown
    #[must_use]
    pub const fn review_cursor(&self) -> usize {
        self.review_cursor
    }

    pub fn advance_review_cursor(&mut self) {
        self.review_cursor += 1;
    }

    pub fn reset_review_cursor(&mut self) {
        self.review_cursor = 0;
    }

    /// Remember the card and clip just sent, replacing any earlier refs
    pub fn set_last_artifacts(&mut self, message: Option<MessageRef>, audio: Option<MessageRef>) {
        self.last_message = message;
        self.last_audio = audio;
    }

    /// Hand over the last card and clip for deletion, clearing both
    pub fn take_last_artifacts(&mut self) -> (Option<MessageRef>, Option<MessageRef>) {
        (self.last_message.take(), self.last_audio.take())
    }

    /// Undo decision and review progress made since `snapshot`
    ///
    /// Artifact refs are left alone: messages deleted in the meantime are
    /// already gone.
    pub fn restore_progress(&mut self, snapshot: &Self) {
        self.state = snapshot.state;
        self.pending.clone_from(&snapshot.pending);
        self.review_cursor = snapshot.review_cursor;
    }
}
