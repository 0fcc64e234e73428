//! Process configuration read from the environment.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    /// Identifier of the single store settings record.
    pub store_id: String,
    pub nats_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("Missing environment variable: DATABASE_URL")?;

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8083".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let store_id = std::env::var("STORE_ID")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "default".to_string());

        let nats_url = std::env::var("NATS_URL").ok().filter(|s| !s.is_empty());

        Ok(Self { database_url, port, max_connections, store_id, nats_url })
    }
}
