//! Command line definition for the `rla-verify` binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "rla-verify")]
#[command(about = "Verify a Ballot-Polling or Batch-Comparison Risk Limiting Audit")]
#[command(version)]
pub struct Cli {
    /// Risk limit for the RLA
    #[arg(short = 'r', long = "risk-limit", value_name = "ALPHA")]
    pub risk_limit: f64,

    /// Reported p-value for the audit
    #[arg(short = 'p', long = "p-value", value_name = "P_VALUE")]
    pub p_value: f64,

    /// Number of winners (seats for dhondt)
    #[arg(short = 'n', long = "winners", value_name = "N_WINNERS", default_value_t = 1)]
    pub winners: usize,

    /// Social choice function: plurality | supermajority | dhondt
    #[arg(short = 's', long = "social-choice-function", value_name = "TYPE")]
    pub social_choice: String,

    /// Auditing scheme: ballot-polling | batch-comparison
    #[arg(short = 'a', long = "audit-type", value_name = "TYPE")]
    pub audit_type: String,

    /// CSV file with the preliminary results
    #[arg(short = 'f', long = "preliminary-count-file", value_name = "FILE")]
    pub preliminary: PathBuf,

    /// Directory holding the recount CSV files
    #[arg(short = 'c', long = "recount-files", value_name = "DIR")]
    pub recount: PathBuf,

    /// Largest accepted gap between reported and recomputed p-value (default from RLA_TOLERANCE or 1e-6)
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Share required by the supermajority function (default from RLA_SUPERMAJORITY_THRESHOLD or 2/3)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Print a JSON run report instead of a summary line
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
