#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;
mod yarn;

use clap::Parser;
use lockmend_core::config::DEFAULT_MAX_ROUNDS;
use lockmend_core::{Config, MissingPackage};
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lockmend")]
#[command(author, version, about = "Keeps yarn.lock free of vulnerable resolutions", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    /// yarn executable to drive (defaults to `yarn` on PATH)
    #[arg(long, global = true, env = "LOCKMEND_YARN", value_name = "PATH")]
    yarn: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Bring a package's locked versions into a safe range
    Fix {
        /// Package name, e.g. `minimist` or `@babel/traverse`
        package: String,

        /// Safe range; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        range: Vec<String>,

        /// Fail if the package is not in yarn.lock
        #[arg(long)]
        strict: bool,
    },

    /// Remove packages from yarn.lock so they are re-resolved
    Reset {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,

        /// Fail if a package is not in yarn.lock
        #[arg(long)]
        strict: bool,
    },

    /// Merge duplicate resolutions onto the highest compatible version
    Shrink,

    /// Check package.json resolutions against yarn.lock
    Resolutions,

    /// Install, audit and fix until yarn.lock no longer changes
    Auto {
        /// Give up after this many install/audit rounds
        #[arg(long, default_value_t = DEFAULT_MAX_ROUNDS)]
        max_rounds: u32,

        /// Also shrink after every round
        #[arg(long)]
        shrink: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let cwd = dunce::canonicalize(&cwd).unwrap_or(cwd);

    let mut config = Config::new(cwd)
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json)
        .with_yarn_bin(cli.yarn);

    match &cli.command {
        Some(Commands::Fix { strict: true, .. } | Commands::Reset { strict: true, .. }) => {
            config = config.with_missing_package(MissingPackage::Fail);
        }
        Some(Commands::Auto { max_rounds, .. }) => {
            config = config.with_max_rounds(*max_rounds);
        }
        _ => {}
    }

    if matches!(cli.command, Some(Commands::Version) | None) {
        return commands::version::run();
    }

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Fix { package, range, .. }) => {
            commands::fix::run(&config, &package, &range, cli.json)
        }
        Some(Commands::Reset { packages, .. }) => commands::reset::run(&config, &packages, cli.json),
        Some(Commands::Shrink) => commands::shrink::run(&config, cli.json),
        Some(Commands::Resolutions) => commands::resolutions::run(&config, cli.json),
        Some(Commands::Auto { shrink, .. }) => {
            let yarn = yarn::YarnCli::locate(&config)?;
            commands::auto::run(&config, &yarn, shrink, cli.json)
        }
    }
}
