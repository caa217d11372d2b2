use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// privscope - recover the NvFBC private data from _nvspcaps64.dll
#[derive(Debug, Parser)]
#[command(name = "privscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where to look for the capture library when no file is given.
#[derive(Debug, Args)]
pub struct AcquireOptions {
    /// Directory for downloaded and extracted files (default: the user cache directory).
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Never download; fail unless the library is installed or cached.
    #[arg(long)]
    pub no_download: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recover and validate the private data.
    Extract {
        /// Paths to _nvspcaps64.dll builds. Without any, the library is located or downloaded.
        #[arg(value_name = "FILE")]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        acquire: AcquireOptions,

        /// Accept an additional CRC-32 (hex, e.g. 0x85ac72fb). Repeatable.
        #[arg(long = "checksum", value_name = "HEX", value_parser = parse_checksum)]
        checksums: Vec<u32>,

        /// Process several files one after another instead of in parallel.
        #[arg(long)]
        sequential: bool,
    },

    /// Locate or download the capture library and print its path.
    Fetch {
        #[command(flatten)]
        acquire: AcquireOptions,
    },

    /// Display PE header, code section and fingerprint of a file.
    Info {
        /// Path to the PE file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn parse_checksum(value: &str) -> Result<u32, String> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid checksum '{value}': {e}"))
}
