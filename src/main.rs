use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vocab_tutor::db::{self, LexiconRepo, LexiconStore};
use vocab_tutor::word::ChatId;
use vocab_tutor::{Config, Daemon, config};

/// Vocab Tutor - Telegram bot for learning English vocabulary
#[derive(Parser)]
#[command(name = "vocab-tutor", version, about)]
struct Cli {
    /// Directory holding the lexicon database
    #[arg(long, env = "TUTOR_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the bot (default)
    Run,
    /// Show learned and skipped counts for a chat
    Stats {
        /// Telegram chat ID
        #[arg(short, long)]
        chat: ChatId,
    },
    /// Print a chat's learned words as JSON
    Export {
        /// Telegram chat ID
        #[arg(short, long)]
        chat: ChatId,
    },
    /// Delete every learned and skipped word for a chat
    Clear {
        /// Telegram chat ID
        #[arg(short, long)]
        chat: ChatId,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vocab_tutor=info",
        1 => "info,vocab_tutor=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let config = Config::load(cli.data_dir)?;
            Daemon::new(config)?.run().await?;
            Ok(())
        }
        Command::Stats { chat } => cmd_stats(cli.data_dir, chat),
        Command::Export { chat } => cmd_export(cli.data_dir, chat),
        Command::Clear { chat } => cmd_clear(cli.data_dir, chat),
    }
}

/// Open the lexicon without requiring API keys
fn open_lexicon(data_dir: Option<PathBuf>) -> anyhow::Result<LexiconRepo> {
    let dir = config::data_dir(data_dir);
    let db_path = config::db_path(&dir);
    if !db_path.exists() {
        anyhow::bail!("no lexicon database at {}", db_path.display());
    }
    Ok(LexiconRepo::new(db::init(&db_path)?))
}

fn cmd_stats(data_dir: Option<PathBuf>, chat: ChatId) -> anyhow::Result<()> {
    let repo = open_lexicon(data_dir)?;
    let stats = repo.stats(chat)?;
    println!("Chat {chat}: {} learned, {} skipped", stats.learned, stats.skipped);
    Ok(())
}

fn cmd_export(data_dir: Option<PathBuf>, chat: ChatId) -> anyhow::Result<()> {
    let repo = open_lexicon(data_dir)?;
    let words = repo.list_learned(chat)?;
    println!("{}", serde_json::to_string_pretty(&words)?);
    Ok(())
}

fn cmd_clear(data_dir: Option<PathBuf>, chat: ChatId) -> anyhow::Result<()> {
    let repo = open_lexicon(data_dir)?;
    repo.clear_all(chat)?;
    println!("Cleared all words for chat {chat}");
    Ok(())
}
