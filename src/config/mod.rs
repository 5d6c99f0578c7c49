// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::core::SynthesisPayload;
use crate::faults::{FaultConfig, FaultKind};
use crate::machine::{AnalysisSettings, MachineConfig, SynthesisParams};
use crate::sensors::{Axis, MountLocation, Sensor};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log level
    pub log_level: String,

    /// Job execution
    #[serde(default)]
    pub engine: EngineConfig,

    /// Scenario to run
    #[serde(default)]
    pub scenario: Scenario,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            engine: EngineConfig::default(),
            scenario: Scenario::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("rotorsim"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Where jobs run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Run stages on dedicated worker threads
    pub offload: bool,

    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            offload: true,
            event_capacity: 64,
        }
    }
}

/// One machine, its sensors, a fault and how to synthesize and analyze it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub machine: MachineConfig,
    pub sensors: Vec<Sensor>,
    pub fault: FaultConfig,
    pub synthesis: SynthesisParams,
    pub analysis: AnalysisSettings,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            machine: MachineConfig::default(),
            sensors: vec![
                Sensor::new("de-x", MountLocation::DriveEnd, Axis::X).with_label("Drive end horizontal"),
                Sensor::new("de-y", MountLocation::DriveEnd, Axis::Y).with_label("Drive end vertical"),
            ],
            fault: FaultConfig::new(FaultKind::Unbalance, 0.5),
            synthesis: SynthesisParams::default(),
            analysis: AnalysisSettings::default(),
        }
    }
}

impl Scenario {
    /// Synthesis job for this scenario
    pub fn payload(&self) -> SynthesisPayload {
        SynthesisPayload::new(
            self.machine.clone(),
            self.sensors.clone(),
            self.fault.clone(),
            self.synthesis.clone(),
            self.analysis.clone(),
        )
    }
}
