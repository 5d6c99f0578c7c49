// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/rotorsim

//! Virtual sensor records

use serde::{Deserialize, Serialize};

/// Maximum number of sensors a single run synthesizes
pub const MAX_SENSORS: usize = 4;

/// Where a pickup is mounted on the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountLocation {
    DriveEnd,       // Coupling-side bearing housing
    NonDriveEnd,    // Outboard bearing housing
    Axial,          // Shaft-line direction
    Base,           // Foundation / baseplate
}

impl MountLocation {
    /// Phase offset in degrees relative to the drive-end pickup
    pub fn phase_offset_deg(&self) -> f64 {
        match self {
            MountLocation::DriveEnd => 0.0,
            MountLocation::NonDriveEnd => 15.0,
            MountLocation::Axial => 90.0,
            MountLocation::Base => 180.0,
        }
    }
}

/// Measurement axis of a pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Y leads X by a quarter turn so a radial X/Y pair traces an orbit
    pub fn phase_offset_deg(&self) -> f64 {
        match self {
            Axis::X => 0.0,
            Axis::Y => 90.0,
            Axis::Z => 0.0,
        }
    }
}

/// A virtual accelerometer attached to the machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,
    pub location: MountLocation,
    pub axis: Axis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Sensor {
    pub fn new(id: &str, location: MountLocation, axis: Axis) -> Self {
        Self {
            id: id.to_string(),
            location,
            axis,
            label: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Label if set, id otherwise
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Combined mount and axis phase offset in radians
    pub fn phase_offset(&self) -> f64 {
        (self.location.phase_offset_deg() + self.axis.phase_offset_deg()).to_radians()
    }
}
