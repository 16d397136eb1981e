//! PASETO Authentication Gate - forward-auth sidecar
//!
//! Verifies PASETO v4.public bearer tokens against a Vault-backed public
//! key and authorizes callers by role.

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use paseto_gate::{
    cli::{Cli, Command},
    config::Config,
    gate::GateServer,
    setup_tracing,
    token::{TokenVerifier, decode_verification_key},
};

#[tokio::main]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();

    // Setup tracing
    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("Failed to setup tracing: {e}");
        return ExitCode::FAILURE;
    }

    match cli.command.take() {
        Some(Command::Verify {
            token,
            key_file,
            issuer,
            audience,
        }) => run_verify(&cli, &token, &key_file, issuer, audience),
        Some(Command::Serve) | None => run_server(cli).await,
    }
}

/// Run the forward-auth server
async fn run_server(cli: Cli) -> ExitCode {
    let config = match Config::load(cli.config.as_deref()) {
        Ok(mut config) => {
            // Apply CLI overrides
            if let Some(port) = cli.port {
                config.server.port = port;
            }
            if let Some(ref host) = cli.host {
                config.server.host = host.clone();
            }
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.server.port,
        "Starting authentication gate"
    );

    let server = match GateServer::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create gate: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run().await {
        error!("Gate error: {e}");
        return ExitCode::FAILURE;
    }

    info!("Gate shutdown complete");
    ExitCode::SUCCESS
}

/// Verify a single token against a local PEM key and print its claims
fn run_verify(
    cli: &Cli,
    token: &str,
    key_file: &Path,
    issuer: Option<String>,
    audience: Option<String>,
) -> ExitCode {
    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pem = match std::fs::read_to_string(key_file) {
        Ok(pem) => pem,
        Err(e) => {
            eprintln!("❌ Failed to read {}: {e}", key_file.display());
            return ExitCode::FAILURE;
        }
    };

    let key = match decode_verification_key(&pem) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("❌ Invalid public key: {e}");
            return ExitCode::FAILURE;
        }
    };

    let verifier = TokenVerifier::new(
        issuer.unwrap_or(config.auth.issuer),
        audience.unwrap_or(config.auth.audience),
    );

    match verifier.verify(token, &key) {
        Ok(claims) => {
            println!("✅ Token verified");
            println!(
                "{}",
                serde_json::to_string_pretty(&claims).unwrap_or_default()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Verification failed: {e}");
            ExitCode::FAILURE
        }
    }
}
