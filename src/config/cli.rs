//! Command-line flags

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "trendwatch", about = "Monitor TrendForce indicators and send alerts")]
pub struct Cli {
    /// Path to the YAML config file
    #[arg(long, default_value = "config/industry_ids.yaml")]
    pub config: PathBuf,

    /// Max parallel fetches
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Retry count per indicator
    #[arg(long)]
    pub retries: Option<usize>,

    /// Backoff base in seconds
    #[arg(long)]
    pub backoff_base: Option<f64>,

    /// API base URL override
    #[arg(long)]
    pub base_url: Option<String>,

    /// Disable TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Compute and persist state without sending notifications
    #[arg(long)]
    pub dry_run: bool,

    /// Send an AI-generated digest of the run
    #[arg(long)]
    pub ai_summary: bool,
}
