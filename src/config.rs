use crate::error::{AppError, Result};
use crate::source::Transport;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 2400;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// "serial" or "tcp"
    #[serde(default = "default_transport")]
    pub transport: String,

    /// Serial device path, used when transport is "serial"
    #[serde(default)]
    pub device: Option<String>,

    /// Serial baud rate, used when transport is "serial"
    #[serde(default)]
    pub baud: Option<u32>,

    /// host:port to connect to when transport is "tcp"
    #[serde(default)]
    pub addr: Option<String>,
}

fn default_transport() -> String {
    "serial".into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            source: SourceConfig {
                transport: default_transport(),
                device: Some(DEFAULT_DEVICE.to_string()),
                baud: Some(DEFAULT_BAUD),
                addr: None,
            },
        }
    }
}

impl Config {
    /// Load configuration from a YAML file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        // Expand environment variables in the format $(VAR_NAME)
        let expanded = expand_env_vars(&content);

        let config: Config = serde_yaml::from_str(&expanded)?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("Server port cannot be 0".to_string()));
        }

        match self.source.transport.as_str() {
            "serial" | "tcp" => {}
            other => {
                return Err(AppError::Config(format!(
                    "Unknown source transport '{}'; expected 'serial' or 'tcp'",
                    other
                )));
            }
        }

        if self.source.transport == "tcp" && self.source.addr.is_none() {
            return Err(AppError::Config(
                "source.addr is required for the tcp transport".to_string(),
            ));
        }

        Ok(())
    }
}

impl SourceConfig {
    /// Resolve the configured transport, applying serial defaults.
    pub fn transport(&self) -> Result<Transport> {
        match self.transport.as_str() {
            "serial" => Ok(Transport::Serial {
                device: self
                    .device
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DEVICE.to_string()),
                baud: self.baud.unwrap_or(DEFAULT_BAUD),
            }),
            "tcp" => {
                let addr = self.addr.clone().ok_or_else(|| {
                    AppError::Config("source.addr is required for the tcp transport".to_string())
                })?;
                Ok(Transport::Tcp { addr })
            }
            other => Err(AppError::Config(format!(
                "Unknown source transport '{}'; expected 'serial' or 'tcp'",
                other
            ))),
        }
    }
}

/// Expand environment variables in the format $(VAR_NAME)
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    let re = regex::Regex::new(r"\$\(([A-Z_][A-Z0-9_]*)\)").unwrap();

    for cap in re.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}
