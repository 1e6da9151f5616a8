mod commands;

use clap::Parser;
use commands::{execute_command, Commands};
use dlsite_org::{Config, Locale};
use std::path::PathBuf;

/// DLsite work organizer
#[derive(Parser)]
#[command(
    name = "dlsite-org",
    about = "Organize DLsite works using their product page metadata",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Path of the work cache store
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Page locale to fetch metadata in (ja_JP, en_US, zh_CN, zh_TW, ko_KR)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(cache) = args.cache {
        config.cache_path = cache;
    }
    if let Some(locale) = args.locale {
        config.locale = locale;
    }
    log::debug!("Using {config:?}");

    if let Err(e) = execute_command(args.command, &config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
