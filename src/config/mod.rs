//! Configuration management for Registra Core

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server host
    pub http_host: String,
    /// HTTP server port
    pub http_port: u16,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// Integration API surface configuration
    pub api: ApiConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Settings governing the integration API surface
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Upper bound for the `limit` paging parameter
    pub max_page_size: i64,
    /// Whether paged responses carry a self `Link` header
    pub include_link_self_headers: bool,
    /// Permission codes granted to the integration caller.
    /// A single `*` grants everything.
    pub granted_permissions: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_page_size: 200,
            include_link_self_headers: true,
            granted_permissions: vec!["*".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            http_host: env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid HTTP_PORT")?,
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse()
                    .unwrap_or(2),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            },
            api: ApiConfig {
                max_page_size: env::var("API_MAX_PAGE_SIZE")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()
                    .unwrap_or(200),
                include_link_self_headers: env::var("API_INCLUDE_LINK_SELF_HEADERS")
                    .map(|s| s.to_lowercase() != "false")
                    .unwrap_or(true),
                granted_permissions: env::var("API_GRANTED_PERMISSIONS")
                    .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
                    .unwrap_or_else(|_| vec!["*".to_string()]),
            },
        })
    }

    /// Get HTTP server address
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}
