//! CLI configuration
//!
//! A TOML file with a `[service]` table, overridden by `ODATA_*` environment
//! variables and finally by command-line flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use odata_mapper::api::ConnectionConfig;

pub const ENV_SERVICE_ROOT: &str = "ODATA_SERVICE_ROOT";
pub const ENV_USERNAME: &str = "ODATA_USERNAME";
pub const ENV_PASSWORD: &str = "ODATA_PASSWORD";
pub const ENV_TIME_ZONE: &str = "ODATA_TIME_ZONE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceSection {
    pub root_url: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// IANA zone name used for outgoing date literals
    pub time_zone: Option<String>,
    pub timeout_secs: Option<u64>,
    pub cookie_marker: Option<String>,
}

impl Config {
    /// `~/.config/odata-mapper/config.toml` or the platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("odata-mapper").join("config.toml"))
    }

    /// Read the config file if present, then apply environment and flag overrides
    pub fn load(path: Option<&Path>, service_root: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env(|name| env::var(name).ok());
        if let Some(root) = service_root {
            config.service.root_url = Some(root.to_string());
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let service = &mut self.service;
        if let Some(root) = lookup(ENV_SERVICE_ROOT) {
            service.root_url = Some(root);
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            service.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            service.password = Some(password);
        }
        if let Some(time_zone) = lookup(ENV_TIME_ZONE) {
            service.time_zone = Some(time_zone);
        }
    }

    /// Connection settings for `entity`, prompting for the password when none is configured
    pub fn connection_config(&self, entity: &str) -> Result<ConnectionConfig> {
        let password = match &self.service.password {
            Some(password) => password.clone(),
            None => rpassword::prompt_password("OData password: ")
                .context("Failed to read password")?,
        };
        self.connection_config_with_password(entity, password)
    }

    fn connection_config_with_password(&self, entity: &str, password: String) -> Result<ConnectionConfig> {
        let service = &self.service;
        let root_url = service.root_url.as_deref().with_context(|| {
            format!("No service root configured; set {} or use --service-root", ENV_SERVICE_ROOT)
        })?;
        let username = service
            .username
            .as_deref()
            .with_context(|| format!("No username configured; set {}", ENV_USERNAME))?;

        let mut builder = ConnectionConfig::builder()
            .service_root_url(normalize_root(root_url))
            .entity_name(entity)
            .credentials(username, password);
        if let Some(name) = &service.time_zone {
            let time_zone: Tz = name
                .parse()
                .map_err(|_| anyhow::anyhow!("Unknown time zone: {}", name))?;
            builder = builder.time_zone(time_zone);
        }
        if let Some(secs) = service.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(marker) = &service.cookie_marker {
            builder = builder.session_cookie_marker(marker.clone());
        }
        builder.build().context("Invalid connection settings")
    }
}

fn normalize_root(root: &str) -> String {
    if root.ends_with('/') {
        root.to_string()
    } else {
        format!("{}/", root)
    }
}
