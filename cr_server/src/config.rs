//! Server configuration.
//!
//! Consolidates the environment variable reads and validates them once at
//! startup.

use card_room::entities::Chips;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket the server listens on.
    pub bind: SocketAddr,
    /// Secret the auth collaborator signs tokens with (required).
    pub jwt_secret: String,
    /// Stack players sit down with.
    pub starting_chips: Chips,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {var} ({hint})")]
    MissingRequired { var: String, hint: String },
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ServerConfig {
    /// Loads configuration from the environment, with an optional bind
    /// override from the command line.
    pub fn from_env(bind_override: Option<SocketAddr>) -> Result<Self, ConfigError> {
        let bind = bind_override
            .or_else(|| {
                std::env::var("SERVER_BIND")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or_else(|| {
                "127.0.0.1:7777"
                    .parse()
                    .expect("default bind address is valid")
            });

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingRequired {
                var: "JWT_SECRET".to_string(),
                hint: "generate with: openssl rand -hex 32".to_string(),
            })?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                var: "JWT_SECRET".to_string(),
                reason: "must be at least 32 characters".to_string(),
            });
        }

        let starting_chips = parse_env_or("STARTING_CHIPS", card_room::DEFAULT_STARTING_CHIPS);

        Ok(Self {
            bind,
            jwt_secret,
            starting_chips,
        })
    }
}

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
