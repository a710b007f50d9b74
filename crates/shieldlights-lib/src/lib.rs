//! shieldlights — lights HAL core for NVIDIA SHIELD LED and backlight nodes.

pub mod color;
pub mod config;
pub mod error;
pub mod frontend;
pub mod host;
pub mod light;
pub mod lights;
pub mod probe;
pub mod registry;
pub mod sysfs;

pub use error::LightsError;
pub use lights::{Lights, LightsCore};
