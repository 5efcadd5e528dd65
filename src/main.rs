//! auth-hook
//!
//! Fronts a backend service with an authorization subrequest.
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  AUTH HOOK                    │
//!   Client Request     │  ┌────────┐    ┌───────────┐  (1) ┌────────┐ │      ┌──────────────┐
//!   ───────────────────┼─▶│  http  │───▶│ forwarder │─────▶│ /_opa  │─┼─────▶│ authorization│
//!                      │  │ server │    │           │      └────────┘ │      └──────────────┘
//!                      │  └────────┘    │           │  (2) ┌────────┐ │      ┌──────────────┐
//!   Client Response    │      ▲         │           │─────▶│/_storm-│─┼─────▶│   backend    │
//!   ◀──────────────────┼──────┴─────────│  relay    │◀─────│ tape   │◀┼──────│              │
//!                      │                └───────────┘      └────────┘ │      └──────────────┘
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use auth_hook::lifecycle::{startup, StartupOptions};

#[derive(Parser)]
#[command(name = "auth-hook")]
#[command(version, about = "Forward requests through an authorization subrequest to a backend", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload the configuration file when it changes.
    #[arg(short, long, requires = "config")]
    watch: bool,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        bind: cli.bind,
        watch: cli.watch,
        check_only: cli.check,
    })
    .await?;

    Ok(())
}
