//! `chat-queue`: queues prompts for a chat page and submits them one at a time.
//!
//! `serve` drives a page snapshot held in a file and answers JSON requests on
//! stdin; the chain commands manage saved prompt chains.

mod platform;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use queue_core::Request;

use platform::chains::{default_data_dir, ChainStore};
use platform::config::AppConfig;
use platform::logging::{self, LogDestination};
use platform::serve::{serve, ServeOptions};

#[derive(Parser)]
#[command(
    name = "chat-queue",
    version,
    about = "Queue prompts for a chat page and send them one response at a time"
)]
struct Cli {
    /// ron config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Where log output goes.
    #[arg(long, value_enum, global = true)]
    log: Option<LogDestination>,
    /// Directory holding saved chains.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer JSON requests on stdin against a page snapshot file.
    Serve {
        /// HTML file re-read whenever it changes.
        #[arg(long)]
        page: PathBuf,
    },
    /// Save a `~`-separated prompt chain under a name.
    SaveChain {
        #[arg(long)]
        name: String,
        #[arg(long)]
        chain: String,
    },
    /// List saved chains.
    ListChains,
    /// Print the runPromptChain request for a saved chain.
    RunChain {
        #[arg(long)]
        name: String,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    logging::initialize(cli.log.or(config.log).unwrap_or_default(), cli.verbose);

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(default_data_dir);
    let store = ChainStore::new(data_dir);

    match cli.command {
        Command::Serve { page } => cmd_serve(page, &config),
        Command::SaveChain { name, chain } => {
            let saved = store.save(&name, &chain).context("save chain")?;
            println!(
                "Saved chain `{}` ({} prompts)",
                saved.name,
                saved.prompt_count()
            );
            Ok(())
        }
        Command::ListChains => {
            let chains = store.load().context("load saved chains")?;
            if chains.is_empty() {
                println!("No saved chains.");
            }
            for saved in chains {
                println!(
                    "{}\t{} prompts\t{}",
                    saved.name,
                    saved.prompt_count(),
                    saved.created
                );
            }
            Ok(())
        }
        Command::RunChain { name } => {
            let saved = store.find(&name)?;
            let request = Request::RunPromptChain {
                chain: Some(saved.chain),
            };
            println!("{}", serde_json::to_string(&request)?);
            Ok(())
        }
    }
}

fn cmd_serve(page: PathBuf, config: &AppConfig) -> Result<()> {
    let options = ServeOptions {
        page,
        page_poll: config.page_poll()?,
        settings: config.processor_settings()?,
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start runtime")?;
    runtime.block_on(serve(options))
}
