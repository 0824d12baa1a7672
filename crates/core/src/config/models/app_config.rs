use std::path::Path;

use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use super::console::{ApiConfig, PreviewConfig};
use crate::logging::LogConfig;

/// Console configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub preview: PreviewConfig,
    pub logging: LogConfig,
}

impl ConsoleConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: CONSOLE, separator: `__`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = ConfigBuilder::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.stream_path", defaults.api.stream_path)?
            .set_default(
                "api.connect_timeout_seconds",
                defaults.api.connect_timeout_seconds as i64,
            )?
            .set_default("preview.count", defaults.preview.count as i64)?
            .set_default("logging.level", defaults.logging.level.as_directive())?
            .set_default("logging.format", "compact")?
            .set_default("logging.include_location", false)?;

        // 1. Load config file if provided
        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/console.toml", "console.toml"];

            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        // 2. Environment variable overrides - highest priority
        builder = builder.add_source(
            Environment::with_prefix("CONSOLE")
                .separator("__")
                .try_parsing(true),
        );

        let config: ConsoleConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: ConsoleConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        self.api.validate().context("API配置验证失败")?;
        self.preview.validate().context("预览配置验证失败")?;
        Ok(())
    }
}
