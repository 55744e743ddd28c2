//! # Server Configuration
//!
//! Command-line configuration for the `audita-server` binary. Log
//! filtering follows `RUST_LOG` via the tracing env-filter, not a flag.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Audita API server.
///
/// Tracks sales audits from scheduling through verification, the
/// recovery queue for stalled records, and their evidence packages.
#[derive(Parser, Debug)]
#[command(name = "audita-server", version, about)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Directory for evidence file storage.
    #[arg(long, default_value = "data/evidence")]
    pub evidence_dir: PathBuf,
}
