//! Sensor module - virtual pickups, speed profile, seeded synthesis

mod types;
mod rng;
mod profile;
mod simulator;

pub use types::{Axis, MountLocation, Sensor, MAX_SENSORS};
pub use rng::SeededRng;
pub use profile::{shaft_hz_from_tach, RpmProfile};
pub use simulator::{SensorSimulator, SignalContent};
