use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "osint-term")]
#[command(about = "An interactive terminal that orchestrates OSINT scan backends")]
pub struct Cli {
    /// Path to the native scanner binary
    #[arg(long, default_value = "./scanner")]
    pub scanner: PathBuf,

    /// Path to the advanced scanner script
    #[arg(long, default_value = "advanced_scanner.py")]
    pub script: PathBuf,

    /// Interpreter used to run the advanced scanner
    #[arg(long, default_value = "python3")]
    pub interpreter: PathBuf,

    /// Directory for persisted scan results
    #[arg(long, default_value = "osint_results")]
    pub results_dir: PathBuf,

    /// Maximum number of concurrently running scans
    #[arg(long, default_value = "8")]
    pub max_scans: usize,

    /// Timeout for native scanner calls, in seconds
    #[arg(long, default_value = "120")]
    pub native_timeout: u64,

    /// Timeout for advanced scanner calls, in seconds
    #[arg(long, default_value = "180")]
    pub script_timeout: u64,

    /// Seconds to wait for in-flight scans on exit
    #[arg(long, default_value = "10")]
    pub drain_grace: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
