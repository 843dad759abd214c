use clap::{Parser, Subcommand};

// ///////////// //
// CLI interface //
// ///////////// //

/// csp2mail - A service that periodically reads the remaining media count from a photo printer's vendor status DLL and emails an alert when supplies run low.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Runs a single spooler-gated supply check and exits.
    Check,
    /// Reads and prints the media counters once, skipping the idle gate and alerting.
    Status,
}
