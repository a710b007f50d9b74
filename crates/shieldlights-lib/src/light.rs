//! Light descriptors, requested state, and the color → brightness reduction.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Platform light categories. Only `Backlight` and `Buttons` are ever
/// registered by this HAL; the rest exist so host requests naming them
/// parse and can be rejected as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightType {
    Backlight,
    Keyboard,
    Buttons,
    Battery,
    Notifications,
    Attention,
    Bluetooth,
    Wifi,
    Microphone,
    Camera,
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightType::Backlight => "BACKLIGHT",
            LightType::Keyboard => "KEYBOARD",
            LightType::Buttons => "BUTTONS",
            LightType::Battery => "BATTERY",
            LightType::Notifications => "NOTIFICATIONS",
            LightType::Attention => "ATTENTION",
            LightType::Bluetooth => "BLUETOOTH",
            LightType::Wifi => "WIFI",
            LightType::Microphone => "MICROPHONE",
            LightType::Camera => "CAMERA",
        };
        f.write_str(name)
    }
}

/// One controllable light as reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HwLight {
    pub id: i32,
    pub ordinal: i32,
    #[serde(rename = "type")]
    pub light_type: LightType,
}

impl HwLight {
    pub fn new(id: i32, light_type: LightType) -> Self {
        HwLight {
            id,
            ordinal: 0,
            light_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlashMode {
    #[default]
    None,
    Timed,
    Hardware,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BrightnessMode {
    #[default]
    User,
    Sensor,
    LowPersistence,
}

/// Requested state for a light. Only `color` is honored by this hardware;
/// flash and brightness-mode fields are accepted and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    /// Packed `0xAARRGGBB`.
    pub color: u32,
    #[serde(default)]
    pub flash_mode: FlashMode,
    #[serde(default)]
    pub flash_on_ms: i32,
    #[serde(default)]
    pub flash_off_ms: i32,
    #[serde(default)]
    pub brightness_mode: BrightnessMode,
}

impl LightState {
    pub fn with_color(color: u32) -> Self {
        LightState {
            color,
            ..Default::default()
        }
    }

    pub fn brightness(&self) -> u8 {
        rgb_to_brightness(self.color)
    }
}

/// Reduce a packed ARGB color to an 8-bit luma.
///
/// Alpha is discarded; weights are 77/150/29 (sum 256), so the result always
/// fits in a byte.
pub fn rgb_to_brightness(color: u32) -> u8 {
    let color = color & 0x00FF_FFFF;
    let r = (color >> 16) & 0xFF;
    let g = (color >> 8) & 0xFF;
    let b = color & 0xFF;
    ((77 * r + 150 * g + 29 * b) >> 8) as u8
}
