//! CLI argument parsing.

use std::path::PathBuf;

use clap::Parser;

/// Count distinct IPv4 addresses in a line-oriented file.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input file
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: PathBuf,

    /// Worker threads and file shards, 1:1 (default: logical CPUs)
    #[arg(short = 't', long = "threads", visible_alias = "th", value_name = "N")]
    pub threads: Option<usize>,
}

/// Logical CPU count, with a small fallback when detection fails.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}
