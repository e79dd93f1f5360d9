use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Минимальный CLI для StashDB
#[derive(Parser, Debug)]
#[command(name = "stashdb", version, about = "StashDB single-file hash store CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create a new store file (fails if it already exists)
    Init {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = 8)]
        key_size: u16,
        #[arg(long, default_value_t = 256)]
        segments: u32,
        #[arg(long, default_value_t = 0.01)]
        bloom_fp: f64,
        /// Expected number of distinct keys (sizes the reserved Bloom region)
        #[arg(long, default_value_t = 100_000)]
        capacity: u64,
    },

    /// Put key/value (value as literal string, hex:, b64: or @file)
    Put {
        #[arg(long)]
        path: PathBuf,
        /// Raw key bytes; "hex:<bytes>" for binary keys, "sel:<text>" to
        /// hash a selector string into an 8-byte key
        #[arg(long)]
        key: String,
        /// Value argument. Ignored if --value-file is set.
        #[arg(long)]
        value: Option<String>,
        /// Read value bytes from a file
        #[arg(long)]
        value_file: Option<PathBuf>,
    },

    /// Get key (latest value)
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        /// Optional file to write raw value into
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Existence check (Bloom fast-path inside)
    Exists {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
    },

    /// Header and usage summary
    Status {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Walk every chain and report format violations
    Verify {
        #[arg(long)]
        path: PathBuf,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
