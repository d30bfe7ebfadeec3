//! unidbg: render Unitex values from process snapshots with the debugger
//! pretty-printers.

mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};

use commands::Toggles;
use config::Config;

#[derive(Parser)]
#[command(name = "unidbg", version, about = "Unitex debugger pretty-printers")]
struct Cli {
    /// Configuration file (default: unidbg.toml, searched upward)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Disable printers (`category` or `category;name`)
    #[arg(long = "disable", value_name = "SELECTOR", global = true)]
    disable: Vec<String>,
    /// Enable printers (`category` or `category;name`)
    #[arg(long = "enable", value_name = "SELECTOR", global = true)]
    enable: Vec<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render variables from a snapshot
    Print {
        /// Process snapshot (.toml)
        snapshot: PathBuf,
        /// Variables to print, e.g. `name`, `name.field`, `*name.ptr`
        variables: Vec<String>,
        /// Print every variable in the snapshot
        #[arg(long)]
        all: bool,
    },
    /// List registered printers
    Info {
        /// Process snapshot (.toml)
        snapshot: PathBuf,
        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the detected library version
    Version {
        /// Process snapshot (.toml)
        snapshot: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config);

    let toggles = Toggles {
        enable: cli.enable,
        disable: cli.disable,
    };

    match cli.command {
        Commands::Print {
            snapshot,
            variables,
            all,
        } => {
            let session = commands::open_session(&snapshot, &config, &toggles)?;
            commands::print::run(&session, &variables, all)
        }
        Commands::Info { snapshot, format } => {
            let session = commands::open_session(&snapshot, &config, &toggles)?;
            commands::info::run(&session, &format)
        }
        Commands::Version { snapshot } => {
            let session = commands::open_session(&snapshot, &config, &toggles)?;
            commands::version::run(&session)
        }
    }
}

/// Load the configuration from `--config`, or search upward from the
/// working directory. No file means defaults.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    let cwd = std::env::current_dir().context("reading working directory")?;
    Ok(Config::find_and_load(&cwd)?
        .map(|(config, _)| config)
        .unwrap_or_default())
}

/// Install the logger. `RUST_LOG` wins over the configured level.
fn init_logging(config: &Config) {
    let result = match (&config.log_level, std::env::var_os("RUST_LOG")) {
        (Some(level), None) => pretty_env_logger::formatted_builder()
            .parse_filters(level)
            .try_init(),
        _ => pretty_env_logger::try_init(),
    };
    if let Err(e) = result {
        eprintln!("warning: logger already installed: {e}");
    }
}
