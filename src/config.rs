use clap::Parser;

pub const API_TOKEN_BYTES: usize = 16;
pub const CSRF_TOKEN_BYTES: usize = 16;
pub const RESET_TOKEN_BYTES: usize = 32;

pub fn token_expiration_hours() -> i64 {
    std::env::var("BLOTTER_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

pub fn reset_token_expiration_hours() -> i64 {
    std::env::var("BLOTTER_RESET_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(1)
}

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct RunArgs {
    #[arg(long, env = "BLOTTER_ADDRESS", default_value = "0.0.0.0")]
    pub address: String,
    #[arg(short, long, env = "BLOTTER_PORT", default_value_t = 8080)]
    pub port: u16,
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://blotter.db?mode=rwc")]
    pub database_url: String,
    /// Drop every table and re-run all migrations.
    #[arg(long)]
    pub fresh: bool,
    /// Origin used when building links sent by email.
    #[arg(long, env = "BLOTTER_PUBLIC_URL", default_value = "http://localhost:8080")]
    pub public_url: String,
    /// Secret of at least 64 bytes used to protect the session cookie.
    #[arg(long, env = "BLOTTER_SESSION_KEY")]
    pub session_key: Option<String>,
    #[arg(long)]
    pub secure_cookies: bool,
}

/// Runtime settings shared with handlers.
#[derive(Debug, Clone)]
pub struct Settings {
    pub public_url: String,
    pub token_ttl: chrono::Duration,
    pub reset_token_ttl: chrono::Duration,
}

impl Settings {
    pub fn from_args(args: &RunArgs) -> Self {
        Self {
            public_url: args.public_url.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            public_url: "http://localhost:8080".to_string(),
            token_ttl: chrono::Duration::hours(token_expiration_hours()),
            reset_token_ttl: chrono::Duration::hours(reset_token_expiration_hours()),
        }
    }
}
