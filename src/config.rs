use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_DIR_PREFIX: &str = "sheets-proxy";

const DEFAULT_BIND: &str = "0.0.0.0:8082";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
}

/// Client identity needed to talk to the authorization provider.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl GoogleConfig {
    /// Returns the client identity, or a configuration error if it was never set.
    pub fn identity(&self) -> Result<ClientIdentity> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(AppError::Config(
                "Google OAuth credentials not configured. Please set GOOGLE_CLIENT_ID and \
                 GOOGLE_CLIENT_SECRET"
                    .to_string(),
            ));
        }

        Ok(ClientIdentity {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            frontend_url: default_frontend_url(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_frontend_url() -> String {
    DEFAULT_FRONTEND_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    /// Load the config file (if present) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file()?;

        let mut config = match config_path.exists() {
            true => {
                let contents = fs::read_to_string(&config_path)?;
                Self::parse(&contents)?
            }
            false => Config::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = non_empty("GOOGLE_CLIENT_ID") {
            self.google.client_id = v;
        }
        if let Some(v) = non_empty("GOOGLE_CLIENT_SECRET") {
            self.google.client_secret = v;
        }
        if let Some(v) = non_empty("GOOGLE_REDIRECT_URI") {
            self.google.redirect_uri = v;
        }
        if let Some(v) = non_empty("FRONTEND_URL") {
            self.server.frontend_url = v;
        }
        if let Some(v) = non_empty("SHEETS_PROXY_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = non_empty("SHEETS_PROXY_TIMEOUT_SECS") {
            self.server.request_timeout_secs = v.parse().map_err(|e| {
                AppError::Config(format!("Invalid SHEETS_PROXY_TIMEOUT_SECS '{}': {}", v, e))
            })?;
        }

        Ok(())
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }
}
