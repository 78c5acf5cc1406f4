//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `commands` module).
//! - Does not validate configuration (see `thingsboard_config::ConfigLoader`).

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tb-cli")]
#[command(about = "tb-cli - Authenticated ThingsBoard REST calls from the command line", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  tb-cli login\n  tb-cli get /api/auth/user\n  tb-cli get /api/tenant/devices -q pageSize=10 -q page=0\n  tb-cli post /api/device --body '{\"name\":\"Thermostat A\"}'\n  tb-cli -k $TB_API_KEY delete /api/device/784f394c-42b6-435a-983c-b7beff2784f9\n"
)]
pub struct Cli {
    /// Base URL of the ThingsBoard server (e.g., http://localhost:8080)
    #[arg(short, long, global = true, env = "TB_BASE_URL")]
    pub base_url: Option<String>,

    /// Username for session authentication
    #[arg(short, long, global = true, env = "TB_USERNAME")]
    pub username: Option<String>,

    /// Password for session authentication
    #[arg(short, long, global = true, env = "TB_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// API key (preferred over username/password)
    #[arg(short = 'k', long, global = true, env = "TB_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "TB_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of retries for rate-limited requests (0 disables retries)
    #[arg(long, global = true, env = "TB_MAX_RETRIES")]
    pub max_retries: Option<usize>,

    /// Skip TLS certificate verification (for self-signed certificates)
    #[arg(long, global = true, env = "TB_SKIP_VERIFY")]
    pub skip_verify: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and show the session's expiry and measured clock skew
    Login,

    /// GET a path and print the JSON response
    Get {
        /// API path (e.g., /api/tenant/devices)
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },

    /// POST a JSON body to a path and print the JSON response
    Post {
        /// API path (e.g., /api/device)
        path: String,

        /// JSON request body
        #[arg(long)]
        body: String,
    },

    /// DELETE a path
    Delete {
        /// API path (e.g., /api/device/{id})
        path: String,
    },
}

/// Parse `key=value` into a pair.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}
