//! Command-line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PASETO authentication gate - Vault-backed token verification for API gateways
#[derive(Parser, Debug)]
#[command(name = "paseto-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, env = "PASETO_GATE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PASETO_GATE_PORT")]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long, env = "PASETO_GATE_HOST")]
    pub host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        long,
        default_value = "info",
        env = "PASETO_GATE_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, env = "PASETO_GATE_LOG_FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Subcommand (optional - defaults to server mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the forward-auth server (default)
    Serve,

    /// Verify a token offline against a local PEM public key
    Verify {
        /// The token to verify
        token: String,

        /// Path to the PEM-encoded public key
        #[arg(short, long)]
        key_file: PathBuf,

        /// Expected issuer (defaults to the configured value)
        #[arg(long)]
        issuer: Option<String>,

        /// Expected audience (defaults to the configured value)
        #[arg(long)]
        audience: Option<String>,
    },
}
