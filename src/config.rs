use crate::errors::{CropWaterError, CropWaterResult};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "cropwater.toml";
pub const ENV_PREFIX: &str = "CROPWATER_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            path: "models/water_requirement.onnx".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub ansi: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_level(),
            ansi: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Re-check numeric domains right before feature assembly.
    pub recheck_domains: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            recheck_domains: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> CropWaterResult<()> {
        if self.model.path.trim().is_empty() {
            return Err(CropWaterError::config("model.path must be set"));
        }
        if self.server.port == 0 {
            return Err(CropWaterError::config("server.port must be non-zero"));
        }
        if self.log.level.parse::<tracing::Level>().is_err() {
            return Err(CropWaterError::config(format!(
                "unrecognized log level '{}'",
                self.log.level
            )));
        }
        Ok(())
    }
}

/// Defaults, then the TOML file, then prefixed env vars (`__` nests keys).
fn figment(path: Option<&Path>, env_prefix: &str) -> Figment {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(env_prefix).split("__"))
}

fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> CropWaterResult<AppConfig> {
    let config: AppConfig = figment(path, env_prefix).extract()?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `cropwater.toml` (or `path`) and `CROPWATER_*` env vars.
pub fn load_config(path: Option<&Path>) -> CropWaterResult<AppConfig> {
    load_with_prefix(path, ENV_PREFIX)
}
