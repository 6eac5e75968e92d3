//! quizbank: terminal viewer for an image-based question bank.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use services::{AppServices, AssetLocation, Clock, QuizController};

mod config;
mod render;
mod repl;

use config::{DEFAULT_ASSETS, DEFAULT_DB_URL, DEFAULT_LOG_FILTER};

#[derive(Parser)]
#[command(name = "quizbank", version, about = "Browse and self-grade an image question bank")]
struct Cli {
    /// SQLite database holding progress and the answer key
    #[arg(long, env = "QUIZ_DB_URL", default_value = DEFAULT_DB_URL, global = true)]
    db: String,

    /// Base URL or directory containing assets/questions.json
    #[arg(long, env = "QUIZ_ASSETS", default_value = DEFAULT_ASSETS, global = true)]
    assets: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive viewer reading commands from stdin (default)
    Run,

    /// Print seen / correct totals
    Stats,

    /// Write the answers mapping as JSON
    ExportAnswers {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write the local answer key as JSON
    ExportKey {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace all answers with the contents of a file
    ImportAnswers {
        file: PathBuf,
    },

    /// Replace the answer key with a raw or {"answer_key": ...} mapping
    ImportKey {
        file: PathBuf,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn emit(contents: String, out: Option<PathBuf>) -> Result<(), std::io::Error> {
    match out {
        Some(path) => {
            tokio::fs::write(&path, contents).await?;
            println!("wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}

async fn execute(
    quiz: &mut QuizController,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Run => repl::run(quiz).await?,
        Commands::Stats => {
            if let Some(view) = quiz.view() {
                println!("{}", view.stats_label);
            }
        }
        Commands::ExportAnswers { out } => emit(quiz.export_answers()?, out).await?,
        Commands::ExportKey { out } => emit(quiz.export_answer_key()?, out).await?,
        Commands::ImportAnswers { file } => {
            let count = quiz.import_answers_file(&file).await?;
            println!("imported {count} answers");
        }
        Commands::ImportKey { file } => {
            let count = quiz.import_answer_key_file(&file).await?;
            println!("imported {count} answer key entries");
        }
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_url = config::normalize_sqlite_url(&cli.db)?;
    // Open + migrate SQLite at startup in the binary glue.
    config::prepare_sqlite_file(&db_url)?;
    let assets = AssetLocation::parse(&cli.assets)?;

    let services = AppServices::new_sqlite(&db_url, assets, Clock::default_clock()).await?;
    let mut quiz = services.start_quiz().await?;

    execute(&mut quiz, cli.command.unwrap_or(Commands::Run)).await?;
    quiz.teardown().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
