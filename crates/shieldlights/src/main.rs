//! shieldlights — lights HAL service for NVIDIA SHIELD LED and backlight nodes.
//!
//! `serve` is the daemon mode; the other subcommands inspect or poke the
//! hardware from a shell.

use std::path::PathBuf;

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "shieldlights",
    version,
    about = "Lights HAL service for NVIDIA SHIELD LED and backlight nodes"
)]
struct Args {
    /// Path to the TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON (for probe, config)
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output (overrides log_level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    let args = Args::parse();

    let (config, warnings) = shieldlights_lib::config::Config::load(args.config.as_deref());
    let filter = if args.verbose {
        "debug".to_string()
    } else {
        config.log_level.clone()
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
    for w in &warnings {
        log::warn!("{w}");
    }

    let source = cli::ConfigSource {
        path: args.config.as_deref(),
        warnings: &warnings,
    };
    if let Err(e) = cli::run(args.command, config, &source, args.json) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
