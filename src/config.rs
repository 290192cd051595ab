//! Configuration management for the Tweaker tool
//!
//! Loads the optional YAML configuration. Every section and field has a default,
//! so an empty or missing file yields the factory setup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::addressing::AddressingPolicy;
use crate::controls::CHANNEL;
use crate::wire::DumpOptions;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub addressing: AddressingPolicy,
    #[serde(default)]
    pub dump: DumpOptions,
}

/// MIDI port configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MidiConfig {
    /// Case-insensitive substrings identifying the device's output port
    #[serde(default = "default_device_patterns")]
    pub device_patterns: Vec<String>,
    /// Client name announced to the MIDI system
    #[serde(default = "default_client_name")]
    pub client_name: String,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            device_patterns: default_device_patterns(),
            client_name: default_client_name(),
        }
    }
}

impl ToolConfig {
    /// Load configuration from file; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml(contents: &str) -> Result<Self> {
        // An empty file deserializes to null
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ToolConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.midi.device_patterns.iter().any(|p| !p.trim().is_empty()) {
            anyhow::bail!("midi.device_patterns needs at least one non-empty pattern");
        }
        if self.midi.client_name.is_empty() {
            anyhow::bail!("midi.client_name cannot be empty");
        }

        let channel = self.dump.encoder_broadcast_channel;
        if !CHANNEL.contains(channel as i64) {
            anyhow::bail!(
                "dump.encoder_broadcast_channel {} must be {}-{}",
                channel,
                CHANNEL.min,
                CHANNEL.max
            );
        }

        self.addressing.validate().context("Invalid addressing section")?;
        Ok(())
    }
}

// Default value functions
fn default_device_patterns() -> Vec<String> { vec!["Tweaker".to_string()] }
fn default_client_name() -> String { "Tweaker-Config".to_string() }
