//! Directory configuration.
//!
//! Configuration is a single JSON document naming the system store URL
//! and, optionally, a default-graph URL. Either may be omitted in favor
//! of the convenience defaults (method/host/port/system-name), which
//! build a `tessera:peer://` URL.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Defaults for building a system URL when none is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemDefaults {
    /// Storage method of the built URL
    #[serde(default = "default_method")]
    pub method: String,
    /// Host component
    #[serde(default = "default_host")]
    pub host: String,
    /// Port component
    #[serde(default = "default_port")]
    pub port: u16,
    /// Database name of the system store
    #[serde(default = "default_system_name")]
    pub system_name: String,
}

fn default_method() -> String {
    "peer".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    4334
}

fn default_system_name() -> String {
    "system".to_string()
}

impl Default for SystemDefaults {
    fn default() -> Self {
        Self {
            method: default_method(),
            host: default_host(),
            port: default_port(),
            system_name: default_system_name(),
        }
    }
}

impl SystemDefaults {
    /// Build the system store URL from the defaults
    pub fn system_url(&self) -> String {
        format!(
            "tessera:{}://{}:{}/{}",
            self.method, self.host, self.port, self.system_name
        )
    }
}

/// Top-level directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// System store URL; built from `defaults` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_url: Option<String>,
    /// Default-graph URL; derived from the system URL when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_url: Option<String>,
    /// Convenience defaults for the built system URL
    #[serde(default)]
    pub defaults: SystemDefaults,
}

impl DirectoryConfig {
    /// Parse a configuration document
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The effective system store URL
    pub fn effective_system_url(&self) -> String {
        self.system_url
            .clone()
            .unwrap_or_else(|| self.defaults.system_url())
    }
}
