//! Analysis module - statistics, envelope, spectra, motion

mod statistics;
mod envelope;
mod window;
mod spectrum;
mod motion;

pub use statistics::{compute_stats, SignalStats};
pub use envelope::envelope;
pub use window::WindowKind;
pub use spectrum::*;
pub use motion::*;
