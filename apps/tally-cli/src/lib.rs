//! # tally: Order Pricing CLI
//!
//! Thin orchestration over the workspace crates.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  main.rs   clap subcommands: migrate | price | config                  │
//! │     │                                                                   │
//! │     ├── config.rs    tally.toml + TALLY_* overrides                    │
//! │     ├── request.rs   order JSON in, priced order JSON out              │
//! │     └── adapters.rs  pricing traits over tally-db                      │
//! │                                                                         │
//! │  tally-pricing ──► tally-core          tally-db ──► SQLite             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod config;
pub mod request;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over the built-in filter. Output goes to
/// stderr so priced JSON on stdout stays machine readable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tally=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
