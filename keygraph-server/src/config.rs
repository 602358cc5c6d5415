// Copyright 2025 Keygraph Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use keygraph_query::{QueryTemplate, DEFAULT_KEYWORD_PREDICATE};

/// Keygraph Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8080")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all, use specific origins in production)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// SPARQL endpoint URL. There is no default; the server refuses to
    /// start without one.
    #[serde(default)]
    pub endpoint_url: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_store_timeout")]
    pub request_timeout_secs: u64,

    /// Co-occurrence query template ("topic" or "freetext")
    #[serde(default)]
    pub template: QueryTemplate,

    /// Keywords relation used when no field restriction is given and by
    /// the suggest query
    #[serde(default = "default_keyword_predicate")]
    pub keyword_predicate: String,

    /// Topic anchor object literal, spliced into queries as written
    /// (e.g. "\"coin/coin-related\"@en")
    pub topic: Option<String>,

    /// Minimum co-occurrence count for an edge to be emitted (inclusive)
    #[serde(default = "default_min_amount")]
    pub min_amount: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Enable authentication (default: false for development)
    #[serde(default)]
    pub enabled: bool,

    /// JWT secret for token validation (required if auth enabled and no
    /// API keys are configured)
    pub jwt_secret: Option<String>,

    /// Static API keys
    #[serde(default)]
    pub api_keys: Vec<String>,
}

// Default values
fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_store_timeout() -> u64 {
    30
}

fn default_keyword_predicate() -> String {
    DEFAULT_KEYWORD_PREDICATE.to_string()
}

fn default_min_amount() -> u64 {
    1
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: default_enable_cors(),
            cors_origins: vec![], // Empty = allow all (development mode)
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            request_timeout_secs: default_store_timeout(),
            template: QueryTemplate::default(),
            keyword_predicate: default_keyword_predicate(),
            topic: None,
            min_amount: default_min_amount(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - KEYGRAPH_LISTEN_ADDR: HTTP listen address (default: 127.0.0.1:8080)
    /// - KEYGRAPH_ENABLE_CORS: Enable CORS (default: true)
    /// - KEYGRAPH_ENDPOINT_URL: SPARQL endpoint URL (required)
    /// - KEYGRAPH_REQUEST_TIMEOUT: Outbound timeout in seconds (default: 30)
    /// - KEYGRAPH_QUERY_TEMPLATE: Query template, "topic" or "freetext"
    /// - KEYGRAPH_KEYWORD_PREDICATE: Keywords relation IRI
    /// - KEYGRAPH_TOPIC: Topic anchor literal
    /// - KEYGRAPH_MIN_AMOUNT: Minimum edge amount (default: 1)
    /// - KEYGRAPH_AUTH_ENABLED: Enable authentication (default: false)
    /// - KEYGRAPH_JWT_SECRET: JWT secret for token validation
    /// - KEYGRAPH_API_KEYS: Comma-separated API keys
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load configuration with priority: defaults < file < environment
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Overlay values from environment variables onto this configuration.
    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("KEYGRAPH_LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }

        if let Ok(cors) = std::env::var("KEYGRAPH_ENABLE_CORS") {
            self.server.enable_cors = cors.parse().unwrap_or(true);
        }

        if let Ok(url) = std::env::var("KEYGRAPH_ENDPOINT_URL") {
            self.store.endpoint_url = url;
        }

        if let Ok(timeout) = std::env::var("KEYGRAPH_REQUEST_TIMEOUT") {
            if let Ok(val) = timeout.parse() {
                self.store.request_timeout_secs = val;
            }
        }

        if let Ok(template) = std::env::var("KEYGRAPH_QUERY_TEMPLATE") {
            match template.parse() {
                Ok(val) => self.store.template = val,
                Err(err) => tracing::warn!("Ignoring KEYGRAPH_QUERY_TEMPLATE: {err}"),
            }
        }

        if let Ok(predicate) = std::env::var("KEYGRAPH_KEYWORD_PREDICATE") {
            self.store.keyword_predicate = predicate;
        }

        if let Ok(topic) = std::env::var("KEYGRAPH_TOPIC") {
            self.store.topic = Some(topic);
        }

        if let Ok(min_amount) = std::env::var("KEYGRAPH_MIN_AMOUNT") {
            if let Ok(val) = min_amount.parse() {
                self.store.min_amount = val;
            }
        }

        if let Ok(enabled) = std::env::var("KEYGRAPH_AUTH_ENABLED") {
            self.auth.enabled = enabled.parse().unwrap_or(false);
        }

        if let Ok(secret) = std::env::var("KEYGRAPH_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }

        if let Ok(keys) = std::env::var("KEYGRAPH_API_KEYS") {
            self.auth.api_keys = keys.split(',').map(String::from).collect();
        }
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        // Validate socket address
        self.socket_addr()?;

        // The endpoint is the one thing nobody can guess for us
        if self.store.endpoint_url.trim().is_empty() {
            anyhow::bail!(
                "No SPARQL endpoint configured (set [store] endpoint_url or KEYGRAPH_ENDPOINT_URL)"
            );
        }

        // Validate auth configuration
        if self.auth.enabled && self.auth.jwt_secret.is_none() && self.auth.api_keys.is_empty() {
            anyhow::bail!("Authentication enabled but no JWT secret or API keys configured");
        }

        Ok(())
    }
}
