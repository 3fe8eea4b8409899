// CLI module for handling command-line interface

use crate::api::ReleaseType;
use crate::constants::DEFAULT_API_URL;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mcmod")]
#[command(about = "Download, update and manage ad-hoc CurseForge mod lists")]
#[command(version)]
pub struct Cli {
    /// Log level, one of off, error, warn, info, debug, trace
    #[arg(short = 'l', long, global = true, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: LevelFilter,

    /// Base URL of the addon registry API
    #[arg(long, global = true, default_value = DEFAULT_API_URL, env = "CURSEFORGE_API_URL")]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download one or more mods and their dependencies
    Get {
        /// Mod slug, display name or numeric id
        #[arg(value_name = "NAME|ID", required = true)]
        mods: Vec<String>,

        /// Output directory for downloaded files
        #[arg(short = 'd', long, env = "OUTPUT_DIRECTORY")]
        directory: Option<PathBuf>,

        /// Output filename, "-" writes to standard output
        #[arg(short = 'o', long, env = "OUTPUT_FILENAME")]
        output: Option<String>,

        /// Least stable release type to accept: any, release, beta or alpha
        #[arg(short = 'r', long, default_value = "release", env = "RELEASE_TYPE")]
        release: ReleaseType,

        /// Only accept files built for this exact game version
        #[arg(short = 'V', long, env = "MINECRAFT_VERSION")]
        gamever: Option<String>,

        /// Do not download dependencies
        #[arg(long, env = "NO_DEPENDENCIES")]
        no_deps: bool,
    },

    /// Search for a mod
    Search {
        #[arg(value_name = "TERM", required = true)]
        term: Vec<String>,

        /// Number of results to display
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        /// Show all results
        #[arg(short = 'a', long)]
        all: bool,

        /// Only list mods with files for this game version
        #[arg(short = 'V', long, env = "MINECRAFT_VERSION")]
        gamever: Option<String>,
    },
}
