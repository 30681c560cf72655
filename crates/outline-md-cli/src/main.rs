mod api;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use outline_md_config::Config;

#[derive(Parser)]
#[command(
    name = "outline-md",
    version,
    about = "Sync local markdown files with Outline documents"
)]
struct Cli {
    /// Log progress to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download a single document
    Get(GetArgs),

    /// Replace a document with the content of a markdown file
    Update(UpdateArgs),
}

#[derive(clap::Args)]
struct GetArgs {
    /// Document URL or url-id
    document: String,

    /// File to save the result to; printed to stdout when unset or `-`
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct UpdateArgs {
    /// Markdown file to upload
    source: PathBuf,

    /// Document URL or url-id
    #[arg(long)]
    id: String,

    /// Print the request body instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Parse `~~strikethrough~~` spans
    #[arg(long)]
    strikethrough: bool,

    /// Parse `:shortcode:` emoji
    #[arg(long)]
    emoji: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = Config::load()?;
    log::debug!("using API at {}", config.api_url);

    match cli.command {
        Command::Get(args) => commands::get(&config, args),
        Command::Update(args) => commands::update(&config, args),
    }
}
