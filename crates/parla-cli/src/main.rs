//! parla CLI: Italian flashcards and conversation practice.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use parla_core::model::{Level, PracticeMode};

mod commands;

#[derive(Parser)]
#[command(name = "parla", version, about = "Italian flashcards with spaced repetition and an AI tutor")]
struct Cli {
    /// Directory holding progress data (overrides config and PARLA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review due flashcards
    Practice {
        /// Only cards of this CEFR level (A1, A2, B1, B2)
        #[arg(long)]
        level: Option<Level>,

        /// Card presentation: classic, reverse, listening, cloze
        #[arg(long)]
        mode: Option<PracticeMode>,

        /// Seed for the card order
        #[arg(long)]
        seed: Option<u64>,

        /// Extra deck file or directory
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Warm-up, conversation with the tutor, review and feedback
    Lesson {
        /// Topic id (sport, routine, food, travel, work, tech, health, culture)
        #[arg(long)]
        topic: Option<String>,

        /// Provider name from the config
        #[arg(long)]
        provider: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,

        /// Seed for topic and card selection
        #[arg(long)]
        seed: Option<u64>,

        /// Extra deck file or directory
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// List cards due today
    Due {
        /// Only cards of this CEFR level
        #[arg(long)]
        level: Option<Level>,

        /// Extra deck file or directory
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Show progress statistics
    Stats {
        /// Write the report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the report as a self-contained HTML page
        #[arg(long)]
        html: Option<PathBuf>,

        /// Extra deck file or directory
        #[arg(long)]
        vocab: Option<PathBuf>,
    },

    /// Show or change settings
    Settings {
        /// Assignment such as daily_goal=25 (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Export all progress data as JSON
    Export {
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Forget all review progress
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Validate vocabulary deck files
    Validate {
        /// Path to a deck file or directory
        #[arg(long)]
        vocab: PathBuf,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// Create a starter config and example deck
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("parla=info".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();
    let stdin = io::stdin();
    let stdout = io::stdout();

    let result = match cli.command {
        Commands::Practice {
            level,
            mode,
            seed,
            vocab,
        } => commands::Context::load(cli.config.as_deref(), cli.data_dir).and_then(|ctx| {
            commands::practice::execute(
                &ctx,
                commands::practice::PracticeOptions {
                    level,
                    mode,
                    seed,
                    vocab,
                },
                &mut stdin.lock(),
                &mut stdout.lock(),
            )
        }),
        Commands::Lesson {
            topic,
            provider,
            model,
            seed,
            vocab,
        } => match commands::Context::load(cli.config.as_deref(), cli.data_dir) {
            Ok(ctx) => {
                commands::lesson::execute(
                    &ctx,
                    commands::lesson::LessonOptions {
                        topic,
                        provider,
                        model,
                        seed,
                        vocab,
                    },
                    &mut stdin.lock(),
                    &mut stdout.lock(),
                )
                .await
            }
            Err(e) => Err(e),
        },
        Commands::Due { level, vocab } => commands::Context::load(cli.config.as_deref(), cli.data_dir)
            .and_then(|ctx| commands::due::execute(&ctx, level, vocab)),
        Commands::Stats { json, html, vocab } => {
            commands::Context::load(cli.config.as_deref(), cli.data_dir)
                .and_then(|ctx| commands::stats::execute(&ctx, json, html, vocab))
        }
        Commands::Settings { set } => commands::Context::load(cli.config.as_deref(), cli.data_dir)
            .and_then(|ctx| commands::settings::execute(&ctx, &set)),
        Commands::Export { output } => commands::Context::load(cli.config.as_deref(), cli.data_dir)
            .and_then(|ctx| commands::export::execute(&ctx, output)),
        Commands::Reset { yes } => commands::Context::load(cli.config.as_deref(), cli.data_dir)
            .and_then(|ctx| commands::reset::execute(&ctx, yes)),
        Commands::Validate { vocab } => commands::validate::execute(vocab),
        Commands::ListModels { provider } => {
            commands::list_models::execute(provider, cli.config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
