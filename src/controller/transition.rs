//! Pure state transition function
//!
//! Given the same state, context and event it always yields the same next
//! state and effects. All I/O happens in the executor.

use thiserror::Error;

use super::effect::{
    ACTION_FAILED, Effect, REVIEW_COMPLETE, REVIEW_ENDED, STORE_FAILED, WORDS_DELETED,
};
use super::{Event, State};

/// Facts about the chat the transition may depend on
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionContext<'a> {
    /// Word of the candidate awaiting a decision
    pub pending_word: Option<&'a str>,
}

/// Result of a state transition
#[derive(Debug, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: State,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub const fn new(state: State) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// Decision for a word other than the pending one
    #[error("button for '{pressed}' does not match the pending word")]
    StaleDecision { pressed: String },
    #[error("invalid transition: {event} in state {state}")]
    InvalidTransition { state: State, event: String },
}

/// Pure transition function
///
/// # Errors
///
/// Returns error if the event does not apply to the current state
pub fn transition(
    state: State,
    context: &TransitionContext<'_>,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Menu selections work from anywhere
        (_, Event::Start) => Ok(TransitionResult::new(State::Idle).with_effects([
            Effect::ClearPending,
            Effect::ResetReviewCursor,
            Effect::ShowMenu,
        ])),

        (State::Reviewing, Event::Learn) => Ok(TransitionResult::new(
            State::AwaitingLearnDecision,
        )
        .with_effects([Effect::ResetReviewCursor, Effect::PresentCandidate])),

        (_, Event::Learn) => Ok(TransitionResult::new(State::AwaitingLearnDecision)
            .with_effect(Effect::PresentCandidate)),

        (_, Event::Repeat) => Ok(TransitionResult::new(State::Reviewing).with_effects([
            Effect::ClearPending,
            Effect::ResetReviewCursor,
            Effect::ShowReviewEntry,
        ])),

        (_, Event::ClearHistory) => Ok(TransitionResult::new(State::Idle).with_effects([
            Effect::ClearLexicon,
            Effect::ClearPending,
            Effect::ResetReviewCursor,
            Effect::notify(WORDS_DELETED),
            Effect::ShowMenu,
        ])),

        // Learn mode decisions
        (State::AwaitingLearnDecision, Event::Remember { word }) => {
            ensure_pending(context, word)?;
            Ok(TransitionResult::new(State::AwaitingLearnDecision).with_effects([
                Effect::CommitLearned,
                Effect::CleanupArtifacts,
                Effect::PresentCandidate,
            ]))
        }

        (State::AwaitingLearnDecision, Event::Skip { word }) => {
            let word = ensure_pending(context, word)?;
            Ok(TransitionResult::new(State::AwaitingLearnDecision).with_effects([
                Effect::CommitSkipped { word },
                Effect::CleanupArtifacts,
                Effect::PresentCandidate,
            ]))
        }

        // Review mode
        (State::Reviewing, Event::Next) => Ok(TransitionResult::new(State::Reviewing)
            .with_effects([
                Effect::CleanupArtifacts,
                Effect::AdvanceReviewCursor,
                Effect::ShowReviewEntry,
            ])),

        (State::Reviewing, Event::EndReview) => Ok(TransitionResult::new(State::Idle)
            .with_effects([
                Effect::ResetReviewCursor,
                Effect::notify(REVIEW_ENDED),
                Effect::ShowMenu,
            ])),

        (State::Reviewing, Event::ReviewExhausted) => Ok(TransitionResult::new(State::Idle)
            .with_effects([Effect::ResetReviewCursor, Effect::notify(REVIEW_COMPLETE)])),

        // Failures raised while executing effects
        (_, Event::ActionFailed) => Ok(TransitionResult::new(State::Idle).with_effects([
            Effect::ClearPending,
            Effect::ResetReviewCursor,
            Effect::notify(ACTION_FAILED),
        ])),

        (_, Event::StoreFailed { resume }) => {
            Ok(TransitionResult::new(resume).with_effect(Effect::notify(STORE_FAILED)))
        }

        (state, event) => Err(TransitionError::InvalidTransition {
            state,
            event: format!("{event:?}"),
        }),
    }
}

/// The pressed word must be the candidate currently shown
fn ensure_pending(
    context: &TransitionContext<'_>,
    pressed: String,
) -> Result<String, TransitionError> {
    if context.pending_word == Some(pressed.as_str()) {
        Ok(pressed)
    } else {
        Err(TransitionError::StaleDecision { pressed })
    }
}
