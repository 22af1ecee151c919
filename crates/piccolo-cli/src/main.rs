//! piccolo - TLS certificate chain explorer
//!
//! Rebuilds and grades the certificate graphs recorded in a fact snapshot.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match piccolo_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => piccolo_cli::report(&err),
    }
}
