//! Hardware topology discovery.
//!
//! Runs once at startup against a [`SysfsView`] and produces a [`Topology`]:
//! the open node handles plus the light registry. Missing hardware is never
//! an error; only a failure while enumerating a directory that exists is.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{LightsError, Result};
use crate::light::HwLight;
use crate::registry::{LightKind, Registry};
use crate::sysfs::{Access, SysfsNode, SysfsView};

pub const BACKLIGHT_DIR: &str = "class/backlight";
pub const BACKLIGHT_NODE: &str = "brightness";
pub const ROTH_LED_NODE: &str = "class/leds/roth-led/brightness";
pub const LIGHTBAR_NODE: &str = "class/leds/led_lightbar/brightness";
pub const LIGHTBAR_STATE: &str = "class/leds/led_lightbar/effects";
pub const NVSHIELDLED_DIR: &str = "class/nvshieldled";
pub const NVSHIELDLED_POWER_NODE: &str = "brightness";
pub const NVSHIELDLED_POWER_STATE: &str = "state";
pub const NVSHIELDLED_BUTTONS_NODE: &str = "brightness2";
pub const NVSHIELDLED_BUTTONS_STATE: &str = "state2";

/// Which power LED hardware was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerLed {
    /// No power LED; backlight requests only drive the panel.
    None,
    /// Dedicated single-purpose LED (`roth-led`).
    Roth,
    /// Multi-effect lightbar with an `effects` node.
    Lightbar,
    /// Multi-node controller with separate power and button channels.
    NvShieldLed,
}

/// Open node handles. Any of them may be absent.
pub struct Handles<N> {
    pub backlight: Option<N>,
    pub power: Option<N>,
    pub power_state: Option<N>,
    pub buttons: Option<N>,
    pub buttons_state: Option<N>,
}

impl<N> Default for Handles<N> {
    fn default() -> Self {
        Handles {
            backlight: None,
            power: None,
            power_state: None,
            buttons: None,
            buttons_state: None,
        }
    }
}

/// Result of discovery.
pub struct Topology<N> {
    pub power_led: PowerLed,
    pub handles: Handles<N>,
    pub registry: Registry,
    /// Initial remembered brightness, read from the power node.
    pub remembered_brightness: u8,
}

/// Serializable description of a [`Topology`], for logs and the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct TopologySummary {
    pub power_led: PowerLed,
    pub backlight: Option<String>,
    pub power: Option<String>,
    pub power_state: Option<String>,
    pub buttons: Option<String>,
    pub buttons_state: Option<String>,
    pub remembered_brightness: u8,
    pub lights: Vec<HwLight>,
}

fn node_path<N: SysfsNode>(node: &Option<N>) -> Option<String> {
    node.as_ref().map(|n| n.path().display().to_string())
}

impl TopologySummary {
    pub fn new<N: SysfsNode>(
        power_led: PowerLed,
        handles: &Handles<N>,
        remembered_brightness: u8,
        registry: &Registry,
    ) -> Self {
        TopologySummary {
            power_led,
            backlight: node_path(&handles.backlight),
            power: node_path(&handles.power),
            power_state: node_path(&handles.power_state),
            buttons: node_path(&handles.buttons),
            buttons_state: node_path(&handles.buttons_state),
            remembered_brightness,
            lights: registry.lights(),
        }
    }
}

impl<N: SysfsNode> Topology<N> {
    pub fn summary(&self) -> TopologySummary {
        TopologySummary::new(
            self.power_led,
            &self.handles,
            self.remembered_brightness,
            &self.registry,
        )
    }
}

fn list<V: SysfsView>(view: &V, dir: &str) -> Result<Vec<PathBuf>> {
    view.list_dir(Path::new(dir))
        .map_err(|source| LightsError::Enumerate {
            dir: PathBuf::from(dir),
            source,
        })
}

/// Open `rel` into `slot` unless the slot already holds a node.
fn open_into<V: SysfsView>(view: &V, slot: &mut Option<V::Node>, rel: &Path, access: Access) {
    if slot.is_none() {
        *slot = view.open(rel, access);
    }
}

/// Parse a brightness value read from sysfs, clamped to a byte.
pub fn parse_brightness(raw: &str) -> Option<u8> {
    let value: i64 = raw.trim().parse().ok()?;
    Some(value.clamp(0, 255) as u8)
}

/// Discover the LED topology.
pub fn probe<V: SysfsView>(view: &V) -> Result<Topology<V::Node>> {
    let mut registry = Registry::new();
    let mut handles = Handles::default();

    // Always declared, even without a panel: backlight requests also drive
    // the power LED on sleep/wake.
    registry.register(LightKind::Backlight);

    if view.exists(Path::new(BACKLIGHT_DIR)) {
        for entry in list(view, BACKLIGHT_DIR)? {
            if let Some(node) = view.open(&entry.join(BACKLIGHT_NODE), Access::Write) {
                log::info!("Found backlight node: {}", entry.display());
                handles.backlight = Some(node);
                break;
            }
        }
    }

    let power_led = if let Some(node) = view.open(Path::new(ROTH_LED_NODE), Access::ReadWrite) {
        log::info!("Found roth led node");
        handles.power = Some(node);
        PowerLed::Roth
    } else if let Some(node) = view.open(Path::new(LIGHTBAR_NODE), Access::ReadWrite) {
        log::info!("Found lightbar node");
        handles.power = Some(node);
        handles.power_state = view.open(Path::new(LIGHTBAR_STATE), Access::Write);
        PowerLed::Lightbar
    } else if view.exists(Path::new(NVSHIELDLED_DIR)) {
        for entry in list(view, NVSHIELDLED_DIR)? {
            log::info!("Found nvshieldled node: {}", entry.display());
            open_into(
                view,
                &mut handles.power,
                &entry.join(NVSHIELDLED_POWER_NODE),
                Access::ReadWrite,
            );
            open_into(
                view,
                &mut handles.power_state,
                &entry.join(NVSHIELDLED_POWER_STATE),
                Access::Write,
            );
            open_into(
                view,
                &mut handles.buttons,
                &entry.join(NVSHIELDLED_BUTTONS_NODE),
                Access::Write,
            );
            open_into(
                view,
                &mut handles.buttons_state,
                &entry.join(NVSHIELDLED_BUTTONS_STATE),
                Access::Write,
            );
            if handles.power_state.is_some() || handles.buttons_state.is_some() {
                registry.register(LightKind::Buttons);
            }
        }
        PowerLed::NvShieldLed
    } else {
        PowerLed::None
    };

    let remembered_brightness = match handles.power.as_mut() {
        Some(node) => match node.read_value() {
            Ok(raw) => parse_brightness(&raw).unwrap_or_else(|| {
                log::warn!(
                    "unparseable brightness {raw:?} in {}, starting from 0",
                    node.path().display()
                );
                0
            }),
            Err(e) => {
                log::warn!("could not read {}: {e}", node.path().display());
                0
            }
        },
        None => 0,
    };

    Ok(Topology {
        power_led,
        handles,
        registry,
        remembered_brightness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightType;
    use crate::sysfs::mock::MockSysfs;

    #[test]
    fn empty_tree_registers_only_backlight() {
        let topo = probe(&MockSysfs::new()).unwrap();
        assert_eq!(topo.power_led, PowerLed::None);
        assert_eq!(topo.registry.lights(), vec![HwLight::new(0, LightType::Backlight)]);
        assert!(topo.handles.backlight.is_none());
        assert!(topo.handles.power.is_none());
        assert_eq!(topo.remembered_brightness, 0);
    }

    #[test]
    fn first_openable_backlight_wins() {
        let fs = MockSysfs::new()
            .dir("class/backlight/broken")
            .node("class/backlight/panel1/brightness", "0")
            .node("class/backlight/panel0/brightness", "0");
        let topo = probe(&fs).unwrap();
        let node = topo.handles.backlight.unwrap();
        assert_eq!(node.path(), Path::new("class/backlight/panel1/brightness"));
    }

    #[test]
    fn roth_led_takes_priority_over_lightbar() {
        let fs = MockSysfs::new()
            .node(ROTH_LED_NODE, "12")
            .node(LIGHTBAR_NODE, "0")
            .node(LIGHTBAR_STATE, "normal");
        let topo = probe(&fs).unwrap();
        assert_eq!(topo.power_led, PowerLed::Roth);
        assert_eq!(topo.handles.power.as_ref().unwrap().path(), Path::new(ROTH_LED_NODE));
        assert!(topo.handles.power_state.is_none());
        assert_eq!(topo.remembered_brightness, 12);
        assert_eq!(topo.registry.len(), 1);
    }

    #[test]
    fn lightbar_opens_effects_node() {
        let fs = MockSysfs::new()
            .node(LIGHTBAR_NODE, "3")
            .node(LIGHTBAR_STATE, "normal");
        let topo = probe(&fs).unwrap();
        assert_eq!(topo.power_led, PowerLed::Lightbar);
        assert!(topo.handles.power_state.is_some());
        assert_eq!(topo.remembered_brightness, 3);
    }

    #[test]
    fn lightbar_without_effects_is_tolerated() {
        let fs = MockSysfs::new().node(LIGHTBAR_NODE, "0");
        let topo = probe(&fs).unwrap();
        assert_eq!(topo.power_led, PowerLed::Lightbar);
        assert!(topo.handles.power_state.is_none());
    }

    #[test]
    fn lightbar_skips_nvshieldled() {
        let fs = MockSysfs::new()
            .node(LIGHTBAR_NODE, "0")
            .node("class/nvshieldled/led0/state2", "");
        let topo = probe(&fs).unwrap();
        assert!(topo.handles.buttons_state.is_none());
        assert_eq!(topo.registry.len(), 1);
    }

    #[test]
    fn nvshieldled_registers_buttons() {
        let fs = MockSysfs::new()
            .node("class/nvshieldled/led0/brightness", "40")
            .node("class/nvshieldled/led0/state", "")
            .node("class/nvshieldled/led0/brightness2", "0")
            .node("class/nvshieldled/led0/state2", "");
        let topo = probe(&fs).unwrap();
        assert_eq!(topo.power_led, PowerLed::NvShieldLed);
        assert_eq!(
            topo.registry.lights(),
            vec![
                HwLight::new(0, LightType::Backlight),
                HwLight::new(1, LightType::Buttons)
            ]
        );
        assert!(topo.handles.buttons.is_some());
        assert_eq!(topo.remembered_brightness, 40);
    }

    #[test]
    fn nvshieldled_entry_without_state_not_registered() {
        let fs = MockSysfs::new().node("class/nvshieldled/led0/brightness2", "0");
        let topo = probe(&fs).unwrap();
        assert_eq!(topo.registry.len(), 1);
        // The button node is still held even though no BUTTONS light exists.
        assert!(topo.handles.buttons.is_some());
    }

    #[test]
    fn nvshieldled_multiple_entries_each_register() {
        let fs = MockSysfs::new()
            .node("class/nvshieldled/a/state2", "")
            .node("class/nvshieldled/a/brightness2", "0")
            .node("class/nvshieldled/b/state2", "")
            .node("class/nvshieldled/b/brightness2", "0");
        let topo = probe(&fs).unwrap();
        assert_eq!(
            topo.registry.types(),
            vec![LightType::Backlight, LightType::Buttons, LightType::Buttons]
        );
        // First entry's handles are kept.
        assert_eq!(
            topo.handles.buttons.as_ref().unwrap().path(),
            Path::new("class/nvshieldled/a/brightness2")
        );
    }

    #[test]
    fn nvshieldled_later_entry_registers_once_state_held() {
        let fs = MockSysfs::new()
            .dir("class/nvshieldled/empty")
            .node("class/nvshieldled/led0/state", "")
            .dir("class/nvshieldled/trailing");
        let topo = probe(&fs).unwrap();
        // "empty" has nothing; "led0" opens state; "trailing" still sees it held.
        assert_eq!(topo.registry.len(), 3);
    }

    #[test]
    fn enumeration_failure_is_fatal() {
        let fs = MockSysfs::new().fail_list(BACKLIGHT_DIR);
        let err = probe(&fs).err().unwrap();
        assert!(matches!(err, LightsError::Enumerate { .. }));
    }

    #[test]
    fn nvshieldled_enumeration_failure_is_fatal() {
        let fs = MockSysfs::new().fail_list(NVSHIELDLED_DIR);
        assert!(matches!(probe(&fs), Err(LightsError::Enumerate { .. })));
    }

    #[test]
    fn unparseable_power_value_starts_at_zero() {
        let fs = MockSysfs::new().node(ROTH_LED_NODE, "garbage");
        assert_eq!(probe(&fs).unwrap().remembered_brightness, 0);
    }

    #[test]
    fn parse_brightness_clamps() {
        assert_eq!(parse_brightness("300"), Some(255));
        assert_eq!(parse_brightness("-4"), Some(0));
        assert_eq!(parse_brightness(" 17 \n"), Some(17));
        assert_eq!(parse_brightness(""), None);
    }

    #[test]
    fn summary_reports_paths_and_lights() {
        let fs = MockSysfs::new()
            .node("class/backlight/panel/brightness", "0")
            .node(LIGHTBAR_NODE, "9")
            .node(LIGHTBAR_STATE, "");
        let summary = probe(&fs).unwrap().summary();
        assert_eq!(summary.power_led, PowerLed::Lightbar);
        assert_eq!(summary.backlight.as_deref(), Some("class/backlight/panel/brightness"));
        assert_eq!(summary.power_state.as_deref(), Some(LIGHTBAR_STATE));
        assert!(summary.buttons.is_none());
        assert_eq!(summary.remembered_brightness, 9);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["power_led"], "lightbar");
    }
}
