//! CLI configuration

use std::path::{Path, PathBuf};

use anyhow::Context;
use linkage_core::EncoderOptions;
use linkage_media::MediaType;
use serde::{Deserialize, Serialize};

/// Default config file location
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linkage")
        .join("config.toml")
}

/// Media types offered for negotiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub encoders: Vec<String>,
    pub decoders: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            encoders: vec![MediaType::JSON_API_MEDIA_TYPE.to_string()],
            decoders: vec![MediaType::JSON_API_MEDIA_TYPE.to_string()],
        }
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub encoder: EncoderOptions,
    pub media: MediaConfig,
}

impl Config {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "encoder.url_prefix",
            "encoder.pretty",
            "encoder.max_depth",
            "encoder.jsonapi_version",
            "media.encoders",
            "media.decoders",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "encoder.url_prefix" => Some(self.encoder.url_prefix.clone().unwrap_or_default()),
            "encoder.pretty" => Some(self.encoder.pretty.to_string()),
            "encoder.max_depth" => Some(self.encoder.max_depth.to_string()),
            "encoder.jsonapi_version" => Some(self.encoder.jsonapi_version.clone().unwrap_or_default()),
            "media.encoders" => Some(self.media.encoders.join(", ")),
            "media.decoders" => Some(self.media.decoders.join(", ")),
            _ => None,
        }
    }

    /// Set a value; an empty string clears optional values
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let optional = |value: &str| (!value.is_empty()).then(|| value.to_string());
        match key {
            "encoder.url_prefix" => self.encoder.url_prefix = optional(value),
            "encoder.pretty" => {
                self.encoder.pretty = value
                    .parse()
                    .with_context(|| format!("Expected true or false, got '{}'", value))?
            }
            "encoder.max_depth" => {
                self.encoder.max_depth = value
                    .parse()
                    .with_context(|| format!("Expected a number, got '{}'", value))?
            }
            "encoder.jsonapi_version" => self.encoder.jsonapi_version = optional(value),
            "media.encoders" => self.media.encoders = media_list(value)?,
            "media.decoders" => self.media.decoders = media_list(value)?,
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    pub fn encoder_types(&self) -> anyhow::Result<Vec<MediaType>> {
        parse_media_types(&self.media.encoders)
    }

    pub fn decoder_types(&self) -> anyhow::Result<Vec<MediaType>> {
        parse_media_types(&self.media.decoders)
    }
}

fn media_list(value: &str) -> anyhow::Result<Vec<String>> {
    let list: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    parse_media_types(&list)?;
    Ok(list)
}

fn parse_media_types(list: &[String]) -> anyhow::Result<Vec<MediaType>> {
    list.iter()
        .map(|s| {
            s.parse::<MediaType>()
                .with_context(|| format!("Invalid media type in config: '{}'", s))
        })
        .collect()
}
