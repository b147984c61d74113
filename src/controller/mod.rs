//! Conversation controller
//!
//! A pure transition table decides the next state and the effects; the
//! `Controller` executes those effects against the pipeline, the lexicon
//! store and the chat channel. Failures raised while executing feed back in
//! as events, so recovery is part of the table too.

pub mod artifacts;
pub mod effect;
pub mod event;
pub mod state;
pub mod transition;

use std::sync::Arc;

pub use effect::Effect;
pub use event::{ButtonAction, Event};
pub use state::State;
pub use transition::{TransitionContext, TransitionError, TransitionResult, transition};

use crate::channels::{ChatChannel, InlineButton, Keyboard, MessageRef};
use crate::db::LexiconStore;
use crate::pipeline::Pipeline;
use crate::session::SessionState;
use crate::word::ChatId;
use crate::Result;

/// Executes transitions for chats
pub struct Controller {
    pipeline: Pipeline,
    store: Arc<dyn LexiconStore>,
    channel: Arc<dyn ChatChannel>,
}

impl Controller {
    #[must_use]
    pub fn new(
        pipeline: Pipeline,
        store: Arc<dyn LexiconStore>,
        channel: Arc<dyn ChatChannel>,
    ) -> Self {
        Self {
            pipeline,
            store,
            channel,
        }
    }

    /// Handle one event to completion
    ///
    /// Never fails: every error is either fed back into the transition table
    /// or logged.
    ///
    /// A store failure before anything was written rolls the session back to
    /// where it was before `event`. Once a lexicon write has gone through the
    /// session is not rolled back, since that would revive a decided word.
    pub async fn handle(&self, chat_id: ChatId, session: &mut SessionState, event: Event) {
        let snapshot = session.clone();
        let mut events = vec![event];
        let mut written = false;

        while let Some(current) = events.pop() {
            let pending_word = session.pending().map(|c| c.word.clone());
            let context = TransitionContext {
                pending_word: pending_word.as_deref(),
            };

            let result = match transition(session.state(), &context, current) {
                Ok(result) => result,
                Err(e) => {
                    tracing::info!(chat_id, state = %session.state(), error = %e, "ignoring stale event");
                    self.reject_stale(chat_id).await;
                    return;
                }
            };

            if result.new_state != session.state() {
                tracing::debug!(
                    chat_id,
                    from = %session.state(),
                    to = %result.new_state,
                    "state change"
                );
            }
            session.set_state(result.new_state);

            for effect in result.effects {
                let writes = effect.writes_lexicon();
                match self.execute_effect(chat_id, session, effect).await {
                    Ok(None) => written |= writes,
                    Ok(Some(feedback)) => {
                        events.push(feedback);
                        break;
                    }
                    Err(e) if e.is_store_failure() && !written => {
                        tracing::error!(chat_id, error = %e, "lexicon store failed");
                        session.restore_progress(&snapshot);
                        events.push(Event::StoreFailed {
                            resume: snapshot.state(),
                        });
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(chat_id, error = %e, "action failed");
                        events.push(Event::ActionFailed);
                        break;
                    }
                }
            }
        }
    }

    /// Answer a button that no longer belongs to the conversation
    ///
    /// Nothing is written; the learner gets a notice and the menu.
    pub async fn reject_stale(&self, chat_id: ChatId) {
        self.notify(chat_id, effect::STALE_BUTTON).await;
        self.show_menu(chat_id).await;
    }

    async fn execute_effect(
        &self,
        chat_id: ChatId,
        session: &mut SessionState,
        effect: Effect,
    ) -> Result<Option<Event>> {
        match effect {
            Effect::ShowMenu => self.show_menu(chat_id).await,
            Effect::CleanupArtifacts => self.cleanup_artifacts(chat_id, session).await,
            Effect::PresentCandidate => self.present_candidate(chat_id, session).await?,
            Effect::CommitLearned => {
                if let Some(candidate) = session.pending() {
                    self.store.commit_learned(chat_id, candidate)?;
                    tracing::info!(chat_id, word = %candidate.word, "word learned");
                }
            }
            Effect::CommitSkipped { word } => {
                self.store.commit_skipped(chat_id, &word)?;
                tracing::info!(chat_id, word = %word, "word skipped");
            }
            Effect::ClearLexicon => self.store.clear_all(chat_id)?,
            Effect::ClearPending => session.clear_pending(),
            Effect::ResetReviewCursor => session.reset_review_cursor(),
            Effect::AdvanceReviewCursor => session.advance_review_cursor(),
            Effect::ShowReviewEntry => return self.show_review_entry(chat_id, session).await,
            Effect::Notify { text } => self.notify(chat_id, text).await,
        }
        Ok(None)
    }

    /// Source a candidate behind a loading notice, then render it
    async fn present_candidate(&self, chat_id: ChatId, session: &mut SessionState) -> Result<()> {
        let loading = match self
            .channel
            .send_text(chat_id, effect::LOADING_NOTICE, None)
            .await
        {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!(chat_id, error = %e, "failed to send loading notice");
                None
            }
        };

        let outcome = self.source_and_render(chat_id, session).await;

        if let Some(message) = loading {
            artifacts::delete_quietly(self.channel.as_ref(), chat_id, message, "loading notice")
                .await;
        }
        outcome
    }

    async fn source_and_render(&self, chat_id: ChatId, session: &mut SessionState) -> Result<()> {
        let candidate = self.pipeline.source(chat_id).await?;
        self.cleanup_artifacts(chat_id, session).await;

        let keyboard = Keyboard::Inline(vec![
            InlineButton::new(
                "Remember",
                ButtonAction::Remember(candidate.word.clone()).encode()?,
            ),
            InlineButton::new("Skip", ButtonAction::Skip(candidate.word.clone()).encode()?),
        ]);
        let card = self
            .send_card(chat_id, candidate.image_url.as_deref(), &candidate.caption(), &keyboard)
            .await?;
        let audio = self
            .send_clip(chat_id, &candidate.word, &candidate.audio_url)
            .await;

        tracing::debug!(chat_id, word = %candidate.word, "candidate presented");
        session.set_pending(candidate);
        session.set_last_artifacts(Some(card), audio);
        Ok(())
    }

    /// Render the learned word at the review cursor
    ///
    /// Pronunciation audio is looked up again on every step.
    async fn show_review_entry(
        &self,
        chat_id: ChatId,
        session: &mut SessionState,
    ) -> Result<Option<Event>> {
        let position = session.review_cursor();
        let Some(entry) = self.store.learned_at(chat_id, position)? else {
            tracing::debug!(chat_id, position, "review exhausted");
            return Ok(Some(Event::ReviewExhausted));
        };

        self.cleanup_artifacts(chat_id, session).await;

        let keyboard = Keyboard::Inline(vec![
            InlineButton::new("Next", ButtonAction::Next.encode()?),
            InlineButton::new("End repetition", ButtonAction::EndReview.encode()?),
        ]);
        let card = self
            .send_card(chat_id, entry.image_url.as_deref(), &entry.caption(), &keyboard)
            .await?;

        let audio = match self.pipeline.providers().dictionary.lookup(&entry.word).await {
            Ok(Some(found)) => match found.spoken_clip() {
                Some(url) => self.send_clip(chat_id, &entry.word, url).await,
                None => {
                    tracing::warn!(chat_id, word = %entry.word, "no spoken clip for review entry");
                    None
                }
            },
            Ok(None) => {
                tracing::warn!(chat_id, word = %entry.word, "no dictionary entry for review entry");
                None
            }
            Err(e) => {
                tracing::warn!(chat_id, word = %entry.word, error = %e, "pronunciation lookup failed");
                None
            }
        };

        session.set_last_artifacts(Some(card), audio);
        Ok(None)
    }

    /// Photo card when an image is known, text card otherwise
    async fn send_card(
        &self,
        chat_id: ChatId,
        image_url: Option<&str>,
        caption: &str,
        keyboard: &Keyboard,
    ) -> Result<MessageRef> {
        match image_url {
            Some(url) => {
                self.channel
                    .send_photo(chat_id, url, caption, Some(keyboard))
                    .await
            }
            None => self.channel.send_text(chat_id, caption, Some(keyboard)).await,
        }
    }

    /// Send the pronunciation clip; a failure only costs the audio
    async fn send_clip(&self, chat_id: ChatId, word: &str, url: &str) -> Option<MessageRef> {
        match artifacts::deliver_clip(
            self.channel.as_ref(),
            self.pipeline.providers().audio.as_ref(),
            chat_id,
            word,
            url,
        )
        .await
        {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!(chat_id, word, error = %e, "failed to send pronunciation clip");
                None
            }
        }
    }

    async fn cleanup_artifacts(&self, chat_id: ChatId, session: &mut SessionState) {
        let (message, audio) = session.take_last_artifacts();
        if let Some(message) = message {
            artifacts::delete_quietly(self.channel.as_ref(), chat_id, message, "card").await;
        }
        if let Some(audio) = audio {
            artifacts::delete_quietly(self.channel.as_ref(), chat_id, audio, "clip").await;
        }
    }

    async fn show_menu(&self, chat_id: ChatId) {
        let keyboard = Keyboard::Menu(event::MENU_LABELS.iter().map(ToString::to_string).collect());
        if let Err(e) = self
            .channel
            .send_text(chat_id, effect::MENU_PROMPT, Some(&keyboard))
            .await
        {
            tracing::warn!(chat_id, error = %e, "failed to send menu");
        }
    }

    async fn notify(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.channel.send_text(chat_id, text, None).await {
            tracing::warn!(chat_id, error = %e, "failed to send notice");
        }
    }
}
