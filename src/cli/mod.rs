//! Command-line interface definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Natural-language task automation assistant
#[derive(Parser, Debug)]
#[command(name = "taskling", version, about)]
pub struct Cli {
    /// Command to run, e.g. `taskling create file notes.txt`
    #[arg(trailing_var_arg = true)]
    pub query: Vec<String>,

    /// Preferred locale for phrase matching (en, ro, es, fr, de, ru)
    #[arg(long)]
    pub locale: Option<String>,

    /// Path to a configuration file (defaults to taskling.toml discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered tools and their actions
    Tools,

    /// Show the plan for a command without executing it
    Plan {
        /// The command to plan
        command: Vec<String>,
    },
}
