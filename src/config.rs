//! Command-line and environment configuration.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Where the original IPL download unpacks its match table
pub const DEFAULT_DATA_PATH: &str = "IPL Matches 2008-2020.csv/matches.csv";

#[derive(Debug, Parser)]
#[command(name = "cricket_quiz", about = "IPL cricket quiz and stats explorer", version)]
pub struct Cli {
    /// Path to the matches CSV
    #[arg(long, env = "CRICKET_QUIZ_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Seed for question sampling (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the stats charts and exit
    Stats {
        /// Also list the most recent matches at this stadium
        #[arg(long)]
        venue: Option<String>,
    },
}

/// Settings resolved from the command line
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub seed: Option<u64>,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Self {
            data_path: cli.data.clone(),
            seed: cli.seed,
        }
    }
}
