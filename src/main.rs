// Entrypoint for the CLI application.
// - Keeps `main` small: resolve the token, create an API client and
//   either dump the requested guild or hand off to the menu loop.
// - Returns `anyhow::Result` so fatal conditions (bad token, missing
//   settings) terminate the process with a readable error.

use anyhow::{Context, Result};
use clap::Parser;
use emote_dump::{api::ApiClient, archive, config, ui};
use std::fs;
use std::path::PathBuf;

/// Dump a Discord guild's custom emotes into a deduplicated zip
/// archive, or its raw metadata into a JSON file.
#[derive(Debug, Parser)]
#[command(name = "emote-dump", version)]
struct Cli {
    /// Use this token instead of loading it from settings.json
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Directory where output files are created
    #[arg(long, value_name = "DIRECTORY")]
    dir: Option<PathBuf>,

    /// Dump emotes from this guild and exit, skipping the menu
    #[arg(long, value_name = "ID")]
    guild: Option<String>,

    /// Dump raw guild info into a json file instead of an archive
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Set RUST_LOG=debug to see per-emote download failures.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let token = match cli.token {
        Some(token) => token,
        None => config::load_token()?,
    };

    let out_dir = match cli.dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            dir
        }
        None => PathBuf::from("."),
    };

    let api = ApiClient::from_env(&token)?;

    match cli.guild {
        Some(guild_id) => archive::dump_guild(&api, &guild_id, &out_dir, cli.json),
        None => ui::main_menu(&api, &out_dir, cli.json),
    }
}
