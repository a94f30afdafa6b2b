use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_BACKEND: &str = "http://localhost:2737";

#[derive(Debug, Clone)]
pub struct Config {
    // Backends, in failover order
    pub backends: Vec<String>,

    // Transport
    pub request_timeout: Duration,

    // Registry seeding
    pub probe_on_load: bool,

    // Preferences
    pub preferences_file: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        Ok(Self {
            backends: parse_backends(
                &std::env::var("APY_BACKENDS").unwrap_or_else(|_| DEFAULT_BACKEND.to_string()),
            )
            .context("APY_BACKENDS contains no address")?,

            request_timeout: Duration::from_secs(
                std::env::var("APY_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),

            probe_on_load: std::env::var("APY_PROBE_ON_LOAD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),

            preferences_file: std::env::var("APY_PREFERENCES_FILE")
                .unwrap_or_else(|_| "apy_preferences.json".to_string()),
        })
    }
}

/// Split a comma-separated address list, dropping blank entries
fn parse_backends(raw: &str) -> Option<Vec<String>> {
    let backends: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if backends.is_empty() {
        None
    } else {
        Some(backends)
    }
}
