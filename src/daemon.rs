//! Vocabulary tutor daemon
//!
//! Wires configuration, the lexicon store, providers and the Telegram
//! channel together, then routes inbound events to one worker per chat.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::channels::{BotCommand, ChatChannel, InboundEvent, InboundPayload, TelegramChannel};
use crate::controller::{Controller, Event};
use crate::db::{DbPool, LexiconRepo, LexiconStore};
use crate::pipeline::Pipeline;
use crate::providers::Providers;
use crate::session::SessionState;
use crate::word::ChatId;
use crate::{Config, Result};

/// Queue depth between the polling task and the dispatcher
const EVENT_QUEUE_DEPTH: usize = 64;

/// Events a single chat may have waiting; more are dropped
const CHAT_QUEUE_DEPTH: usize = 16;

/// Main daemon
pub struct Daemon {
    config: Config,
    db: DbPool,
}

impl Daemon {
    /// Create a new daemon
    ///
    /// # Errors
    ///
    /// Returns error if the database cannot be opened
    pub fn new(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let db = crate::db::init(config.db_path())?;
        Ok(Self { config, db })
    }

    /// Run until Ctrl-C or until polling stops
    ///
    /// # Errors
    ///
    /// Returns error if the Telegram token is rejected
    pub async fn run(self) -> Result<()> {
        tracing::info!(data_dir = %self.config.data_dir.display(), "starting vocabulary tutor");

        let telegram = TelegramChannel::new(self.config.telegram.token.clone());
        telegram.connect(&bot_commands()).await?;

        let store: Arc<dyn LexiconStore> = Arc::new(LexiconRepo::new(self.db.clone()));
        let providers = Providers::from_config(&self.config.providers);
        let pipeline = Pipeline::new(providers, Arc::clone(&store));
        let channel: Arc<dyn ChatChannel> = Arc::new(telegram.clone());
        let controller = Arc::new(Controller::new(pipeline, store, Arc::clone(&channel)));

        let (tx, mut rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let poller = telegram.start_polling(tx, self.config.telegram.poll_timeout_secs);
        let mut dispatcher = Dispatcher::new(controller, channel);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown requested");
                    break;
                }
                inbound = rx.recv() => {
                    let Some(inbound) = inbound else {
                        tracing::warn!("polling stopped");
                        break;
                    };
                    dispatcher.dispatch(inbound);
                }
            }
        }

        poller.abort();
        dispatcher.shutdown().await;
        tracing::info!("daemon stopped");
        Ok(())
    }
}

/// Commands registered in Telegram's command menu
fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Show the menu"),
        BotCommand::new("learn", "Learn new words"),
        BotCommand::new("repeat", "Repeat learned words"),
        BotCommand::new("clear", "Delete all learned words"),
    ]
}

/// Routes inbound events to per-chat workers
///
/// Each chat gets its own task and queue, so events for one chat are handled
/// to completion in arrival order while other chats proceed independently.
/// The worker owns the chat's `SessionState` for the life of the process.
///
/// Dispatch never waits on a worker: a chat stuck on a stalled lookup fills
/// only its own queue, and further events for it are dropped.
///
/// Workers are kept until shutdown, so there is one idle task per chat seen
/// since startup. Reaping them would discard the session they own.
pub struct Dispatcher {
    controller: Arc<Controller>,
    channel: Arc<dyn ChatChannel>,
    workers: HashMap<ChatId, Worker>,
}

struct Worker {
    tx: mpsc::Sender<InboundEvent>,
    handle: JoinHandle<()>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(controller: Arc<Controller>, channel: Arc<dyn ChatChannel>) -> Self {
        Self {
            controller,
            channel,
            workers: HashMap::new(),
        }
    }

    /// Queue an event on its chat's worker, spawning the worker if needed
    pub fn dispatch(&mut self, inbound: InboundEvent) {
        let chat_id = inbound.chat_id;

        // A worker that died is replaced; its session is lost with it
        if self
            .workers
            .get(&chat_id)
            .is_some_and(|w| w.handle.is_finished())
        {
            tracing::warn!(chat_id, "chat worker exited, restarting");
            self.workers.remove(&chat_id);
        }

        let worker = self.workers.entry(chat_id).or_insert_with(|| {
            tracing::debug!(chat_id, "spawning chat worker");
            spawn_worker(
                chat_id,
                Arc::clone(&self.controller),
                Arc::clone(&self.channel),
            )
        });

        match worker.tx.try_send(inbound) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(chat_id, "chat is busy, dropping event");
                // Stop the client spinner even though the press is ignored
                if let Some(callback_id) = dropped.callback_id {
                    let channel = Arc::clone(&self.channel);
                    tokio::spawn(async move {
                        if let Err(e) = channel.answer_callback(&callback_id).await {
                            tracing::debug!(chat_id, error = %e, "failed to answer callback");
                        }
                    });
                }
            }
            Err(TrySendError::Closed(_)) => {
                tracing::warn!(chat_id, "chat worker queue closed, dropping event");
            }
        }
    }

    /// Number of chats with a live worker
    #[must_use]
    pub fn active_chats(&self) -> usize {
        self.workers.len()
    }

    /// Close every queue and wait for in-flight events to finish
    pub async fn shutdown(self) {
        for (chat_id, worker) in self.workers {
            drop(worker.tx);
            if let Err(e) = worker.handle.await {
                tracing::warn!(chat_id, error = %e, "chat worker panicked");
            }
        }
    }
}

fn spawn_worker(
    chat_id: ChatId,
    controller: Arc<Controller>,
    channel: Arc<dyn ChatChannel>,
) -> Worker {
    let (tx, mut rx) = mpsc::channel::<InboundEvent>(CHAT_QUEUE_DEPTH);
    let handle = tokio::spawn(async move {
        let mut session = SessionState::default();
        while let Some(inbound) = rx.recv().await {
            handle_inbound(&controller, channel.as_ref(), &mut session, inbound).await;
        }
        tracing::debug!(chat_id, "chat worker stopped");
    });
    Worker { tx, handle }
}

/// Handle one inbound event for a chat
pub async fn handle_inbound(
    controller: &Controller,
    channel: &dyn ChatChannel,
    session: &mut SessionState,
    inbound: InboundEvent,
) {
    let chat_id = inbound.chat_id;

    if let Some(callback_id) = &inbound.callback_id
        && let Err(e) = channel.answer_callback(callback_id).await
    {
        tracing::debug!(chat_id, error = %e, "failed to answer callback");
    }

    match Event::from_payload(&inbound.payload) {
        Some(event) => {
            tracing::debug!(chat_id, ?event, "inbound event");
            controller.handle(chat_id, session, event).await;
        }
        None => match inbound.payload {
            InboundPayload::Button(data) => {
                tracing::info!(chat_id, data = %data, "unrecognized button payload");
                controller.reject_stale(chat_id).await;
            }
            InboundPayload::Text(_) => {
                tracing::debug!(chat_id, "ignoring free text");
            }
        },
    }
}
