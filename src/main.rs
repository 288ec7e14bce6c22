//! Restaurant weekly report service.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────────┐
//!                         │                  WEEKLY REPORT SERVICE                │
//!                         │                                                      │
//!   Form front end        │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!   ──────────────────────┼─▶│  http   │───▶│ validation │───▶│    prompt    │   │
//!                         │  │ server  │    │  + wizard  │    │   template   │   │
//!                         │  └─────────┘    └────────────┘    └──────┬───────┘   │
//!                         │                                          │           │
//!                         │                                          ▼           │
//!                         │  ┌─────────┐    ┌────────────┐    ┌──────────────┐   │
//!   ◀─────────────────────┼──│ report  │◀───│    llm     │◀───│  resilience  │◀──┼── Chat-completion
//!                         │  │ clean + │    │   client   │    │ retry/timeout│   │     endpoint
//!                         │  │ export  │    └────────────┘    └──────────────┘   │
//!                         │  └─────────┘                                         │
//!                         │                                                      │
//!                         │  ┌────────────────────────────────────────────────┐  │
//!                         │  │              Cross-Cutting Concerns             │  │
//!                         │  │  config · drafts · observability · lifecycle    │  │
//!                         │  └────────────────────────────────────────────────┘  │
//!                         └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use weekly_report::config::load_or_default;
use weekly_report::lifecycle::startup;

#[derive(Parser)]
#[command(name = "weekly-report")]
#[command(about = "Restaurant weekly report service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "REPORT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;
    startup::run(config).await?;
    Ok(())
}
