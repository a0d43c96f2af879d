//! Command-line interface for Letterpress

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// Cover letter generation relay for OpenRouter
#[derive(Parser)]
#[command(name = "letterpress")]
#[command(version)]
#[command(about = "Cover letter generation relay for OpenRouter")]
#[command(
    long_about = "Letterpress serves POST /api/generate, turning a resume and a job \
    description into a cover letter with a single OpenRouter chat-completion call. \
    The API key is read from OPENROUTER_API_KEY at startup."
)]
pub struct Cli {
    /// Path to configuration file (built-in defaults are used if the default file is missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Letterpress Configuration
#
# Every section is optional. Values shown are the built-in defaults.
# The OpenRouter API key is NOT stored here; export it in the environment
# variable named by upstream.api_key_env before starting the server.

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

[upstream]
# Chat-completion API root; requests go to {base_url}/chat/completions
base_url = "https://openrouter.ai/api/v1"

# Model used for every cover letter
model = "meta-llama/llama-3.3-70b-instruct:free"

# Output token cap per generation
max_tokens = 1000

# Environment variable holding the bearer credential
api_key_env = "OPENROUTER_API_KEY"

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"
"#
}
