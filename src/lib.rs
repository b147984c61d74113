//! Vocab Tutor - conversational vocabulary tutor for Telegram
//!
//! Sources a fresh English word per request, enriches it with a definition,
//! transcription, translation, picture and pronunciation, and lets the
//! learner remember or skip it. Remembered words can be reviewed in the
//! order they were learned.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │              Telegram (long polling)                 │
//! └────────────────────┬────────────────────────────────┘
//!                      │ InboundEvent
//! ┌────────────────────▼────────────────────────────────┐
//! │   Daemon → per-chat worker → Controller              │
//! │   (SessionState)     transition table + effects      │
//! └──────────┬─────────────────────────────┬────────────┘
//!            │                             │
//! ┌──────────▼──────────┐       ┌──────────▼────────────┐
//! │      Pipeline       │       │   Lexicon (SQLite)    │
//! │ words │ dictionary  │       │  learned │ skipped    │
//! │ translate │ images  │       └───────────────────────┘
//! └─────────────────────┘
//! ```

pub mod channels;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod session;
pub mod word;

pub use config::Config;
pub use controller::Controller;
pub use daemon::{Daemon, Dispatcher};
pub use db::{DbConn, DbPool, LexiconRepo, LexiconStore};
pub use error::{Error, Result};
pub use pipeline::Pipeline;
pub use providers::Providers;
pub use session::SessionState;
pub use word::{Candidate, ChatId, LearnedWord};
