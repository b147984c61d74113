//! Conversation states

use std::fmt;

/// Where a chat is in its conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum State {
    /// Main menu, nothing in flight
    #[default]
    Idle,
    /// A candidate card is shown with Remember/Skip buttons
    AwaitingLearnDecision,
    /// A learned word is shown with Next/End repetition buttons
    Reviewing,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingLearnDecision => "awaiting_learn_decision",
            Self::Reviewing => "reviewing",
        };
        f.write_str(name)
    }
}
