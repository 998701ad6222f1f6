// SPDX-License-Identifier: AGPL-3.0-or-later
//! pathmux CLI
//!
//! File operations over scheme-routed backends.

mod commands;

use clap::{Parser, Subcommand};
use pathmux_vfs::{FileSystem, PmxResult, RegistryConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pmx")]
#[command(author, version, about = "pathmux - one file API over many storage backends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Mount table to load instead of the per-user default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    #[command(alias = "dir")]
    Ls {
        /// Path to list (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Long format with details
        #[arg(short, long)]
        long: bool,

        /// Show all files including hidden
        #[arg(short, long)]
        all: bool,

        /// Human-readable sizes
        #[arg(short = 'H', long)]
        human: bool,
    },

    /// Display file contents
    Cat {
        /// File to display
        path: String,
    },

    /// Copy a file, possibly across backends
    Cp {
        /// Source path
        source: String,

        /// Destination path
        dest: String,

        /// Create missing parent directories of the destination
        #[arg(short, long)]
        parents: bool,
    },

    /// Move or rename within one backend
    Mv {
        /// Source path
        source: String,

        /// Destination path
        dest: String,
    },

    /// Remove files or directories
    Rm {
        /// Path(s) to remove
        #[arg(required = true)]
        paths: Vec<String>,

        /// Recursive removal for directories
        #[arg(short, long)]
        recursive: bool,

        /// Ignore failures
        #[arg(short, long)]
        force: bool,
    },

    /// Create directories
    Mkdir {
        /// Directory path(s) to create
        #[arg(required = true)]
        paths: Vec<String>,

        /// Create parent directories as needed
        #[arg(short, long)]
        parents: bool,
    },

    /// Create empty files
    Touch {
        /// File path(s) to create
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Show file or directory information
    Stat {
        /// Path to inspect
        path: String,
    },

    /// List registered backends
    Backends,

    /// Create a uniquely named temporary file
    Tmp {
        /// Name prefix, optionally with a directory and scheme
        #[arg(default_value = "pmx")]
        prefix: String,

        /// Name suffix
        #[arg(short, long, default_value = ".tmp")]
        suffix: String,

        /// Place the file in the system temp directory
        #[arg(short = 't', long)]
        temp_dir: bool,

        /// Remove the file again before exiting
        #[arg(short, long)]
        delete_on_exit: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Per-user mount table location
fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "pathmux", "pathmux").map(|d| d.config_dir().join("mounts.toml"))
}

fn init_fs(config: Option<PathBuf>) -> PmxResult<FileSystem> {
    let config = match config.or_else(default_config_path) {
        Some(path) => RegistryConfig::load(&path)?,
        None => RegistryConfig::default(),
    };
    FileSystem::from_config(&config)
}

async fn run(fs: &FileSystem, command: Commands) -> PmxResult<()> {
    match command {
        Commands::Ls { path, long, all, human } => commands::ls(fs, &path, long, all, human).await,
        Commands::Cat { path } => commands::cat(fs, &path).await,
        Commands::Cp { source, dest, parents } => commands::cp(fs, &source, &dest, parents).await,
        Commands::Mv { source, dest } => commands::mv(fs, &source, &dest).await,
        Commands::Rm { paths, recursive, force } => commands::rm(fs, &paths, recursive, force).await,
        Commands::Mkdir { paths, parents } => commands::mkdir(fs, &paths, parents).await,
        Commands::Touch { paths } => commands::touch(fs, &paths).await,
        Commands::Stat { path } => commands::stat(fs, &path).await,
        Commands::Backends => commands::backends(fs),
        Commands::Tmp {
            prefix,
            suffix,
            temp_dir,
            delete_on_exit,
        } => commands::tmp(fs, &prefix, &suffix, temp_dir, delete_on_exit).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let fs = match init_fs(cli.config) {
        Ok(fs) => fs,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&fs, cli.command).await;
    fs.cleanup().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
