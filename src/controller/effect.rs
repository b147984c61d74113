//! Side effects requested by a transition

/// Greeting shown with the main menu
pub const MENU_PROMPT: &str = "Choose an option:";

/// Sent while a candidate is being sourced
pub const LOADING_NOTICE: &str = "Wait for the words...";

/// Review ran past the last learned word, or there were none
pub const REVIEW_COMPLETE: &str = "All learned words are repeated.";

/// Learner ended the review early
pub const REVIEW_ENDED: &str = "Repetition is over.";

/// Lexicon cleared
pub const WORDS_DELETED: &str = "All learned words are deleted.";

/// Lookup or delivery failed; the learner can retry from the menu
pub const ACTION_FAILED: &str = "Something went wrong while fetching the word. Please try again.";

/// Persistence failed; nothing was saved
pub const STORE_FAILED: &str = "Could not save your progress right now. Please try again.";

/// Button from an old card, or one that no longer fits the conversation
pub const STALE_BUTTON: &str = "This card is no longer active.";

/// An effect for the executor to carry out, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the main menu keyboard
    ShowMenu,
    /// Delete the last card and clip, swallowing failures
    CleanupArtifacts,
    /// Source a candidate, remember it as pending and render it
    PresentCandidate,
    /// Persist the pending candidate as learned
    CommitLearned,
    /// Persist a word as skipped
    CommitSkipped { word: String },
    /// Delete every learned and skipped word of the chat
    ClearLexicon,
    ClearPending,
    ResetReviewCursor,
    AdvanceReviewCursor,
    /// Render the learned word at the review cursor
    ShowReviewEntry,
    /// Send a plain notice
    Notify { text: &'static str },
}

impl Effect {
    #[must_use]
    pub const fn notify(text: &'static str) -> Self {
        Self::Notify { text }
    }

    /// Whether the effect changes the chat's persisted lexicon
    #[must_use]
    pub const fn writes_lexicon(&self) -> bool {
        matches!(
            self,
            Self::CommitLearned | Self::CommitSkipped { .. } | Self::ClearLexicon
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_lexicon_writes_are_classified_as_writes() {
        assert!(Effect::CommitLearned.writes_lexicon());
        assert!(
            Effect::CommitSkipped {
                word: "dog".to_string()
            }
            .writes_lexicon()
        );
        assert!(Effect::ClearLexicon.writes_lexicon());

        assert!(!Effect::PresentCandidate.writes_lexicon());
        assert!(!Effect::ShowReviewEntry.writes_lexicon());
        assert!(!Effect::ClearPending.writes_lexicon());
        assert!(!Effect::notify(STORE_FAILED).writes_lexicon());
    }
}
