//! Configuration module for the OpenCards backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default CDN root for aircraft artwork used by the deck view.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://cdn.skycards.oldapes.com/assets";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit JSON log lines instead of plain text
    pub log_json: bool,
    /// HMAC secret used to sign issued bearer tokens
    pub token_secret: String,
    /// Whether `token_secret` was generated at startup
    pub token_secret_generated: bool,
    /// bcrypt work factor for new password hashes
    pub bcrypt_cost: u32,
    /// Optional aircraft models file for the deck view
    pub models_path: Option<PathBuf>,
    /// Base URL for aircraft images
    pub asset_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("OPENCARDS_DB_PATH")
            .unwrap_or_else(|_| "./data/opencards.sqlite".to_string())
            .into();

        let bind_addr = env::var("OPENCARDS_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid OPENCARDS_BIND_ADDR format");

        let log_level = env::var("OPENCARDS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("OPENCARDS_LOG_JSON")
            .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE"))
            .unwrap_or(false);

        let (token_secret, token_secret_generated) = match env::var("OPENCARDS_TOKEN_SECRET") {
            Ok(secret) if !secret.is_empty() => (secret, false),
            _ => (uuid::Uuid::new_v4().to_string(), true),
        };

        let bcrypt_cost = env::var("OPENCARDS_BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        let models_path = env::var("OPENCARDS_MODELS_PATH").ok().map(PathBuf::from);

        let asset_base_url = env::var("OPENCARDS_ASSET_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_ASSET_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            db_path,
            bind_addr,
            log_level,
            log_json,
            token_secret,
            token_secret_generated,
            bcrypt_cost,
            models_path,
            asset_base_url,
        }
    }
}
