//! Letterpress HTTP server
//!
//! Starts an Axum web server exposing the cover letter endpoint.

use clap::Parser;
use letterpress::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    handlers::{self, AppState},
    telemetry,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    let config = Config::from_file_or_default(&cli.config)?;

    telemetry::init(&config.observability.log_level);

    let state = AppState::from_env(Arc::new(config))?;
    let config = state.config();

    match state.api_key() {
        Some(key) => tracing::info!(
            env = %config.upstream.api_key_env(),
            api_key_length = key.len(),
            "Upstream credential loaded"
        ),
        None => tracing::warn!(
            env = %config.upstream.api_key_env(),
            "Upstream credential not set; generation requests will fail with 500"
        ),
    }

    let addr = config.server.socket_addr()?;

    tracing::info!(
        model = %config.upstream.model(),
        upstream = %state.client().url(),
        "Starting Letterpress server on {}",
        addr
    );

    let app = handlers::router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
