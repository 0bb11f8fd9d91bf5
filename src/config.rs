use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::boundary::BoundaryPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub downstream: DownstreamConfig,
    pub boundary: BoundaryConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub instance_id: String,
}

#[derive(Debug, Clone)]
pub struct DownstreamConfig {
    /// Remote origin; when absent, `static_dir` is served instead
    pub origin: Option<OriginConfig>,
    pub static_dir: String,
}

#[derive(Debug, Clone)]
pub struct OriginConfig {
    pub url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct BoundaryConfig {
    pub expose_error_messages: bool,
    pub catch_panics: bool,
}

impl BoundaryConfig {
    pub fn policy(&self) -> BoundaryPolicy {
        BoundaryPolicy {
            expose_messages: self.expose_error_messages,
            catch_panics: self.catch_panics,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup (the environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = match lookup("ORIGIN_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(OriginConfig {
                url,
                timeout_ms: parse_or(&lookup, "ORIGIN_TIMEOUT_MS", 30_000)?,
            }),
            None => None,
        };

        Ok(Config {
            server: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "API_PORT", 8080)?,
                // Used only for observability. Falls back to HOSTNAME when present
                // (e.g. Docker/Kubernetes), otherwise "unknown".
                instance_id: lookup("INSTANCE_ID")
                    .or_else(|| lookup("HOSTNAME"))
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            downstream: DownstreamConfig {
                origin,
                static_dir: lookup("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
            },
            boundary: BoundaryConfig {
                expose_error_messages: parse_or(&lookup, "BOUNDARY_EXPOSE_ERROR_MESSAGES", true)?,
                catch_panics: parse_or(&lookup, "BOUNDARY_CATCH_PANICS", true)?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got {:?}", key, raw)),
        None => Ok(default),
    }
}
