//! Light dispatcher — the core behind both protocol front-ends.
//!
//! [`LightsCore`] owns the probed node handles and the remembered power LED
//! level behind a single mutex, so every hardware write is totally ordered
//! across all lights. The registry sits outside the lock: it is immutable
//! after construction.

use std::sync::{Mutex, MutexGuard};

use crate::error::{LightsError, Result};
use crate::light::{HwLight, LightState, LightType};
use crate::probe::{self, Handles, PowerLed, Topology, TopologySummary};
use crate::registry::{LightKind, Registry};
use crate::sysfs::{SysfsNode, SysfsView};

/// Effect written to the lightbar while the screen is on.
pub const EFFECT_NORMAL: &str = "normal";
/// Effect written to the lightbar while the screen is off.
pub const EFFECT_BREATHE: &str = "breathe";

/// Operations shared by both front-ends.
pub trait Lights: Send + Sync {
    /// Apply `state` to light `id`. `Err(Unsupported)` if `id` is not registered.
    fn set_light_state(&self, id: i32, state: &LightState) -> Result<()>;

    /// Registered lights in identifier order.
    fn get_lights(&self) -> Vec<HwLight>;

    /// Type tags of the registered lights in identifier order.
    fn supported_types(&self) -> Vec<LightType> {
        self.get_lights().iter().map(|l| l.light_type).collect()
    }

    /// Identifier of the first registered light of `light_type`.
    fn light_for_type(&self, light_type: LightType) -> Option<i32> {
        self.get_lights()
            .iter()
            .find(|l| l.light_type == light_type)
            .map(|l| l.id)
    }
}

/// Everything a hardware write touches.
struct Hardware<N> {
    handles: Handles<N>,
    remembered_brightness: u8,
}

pub struct LightsCore<N> {
    power_led: PowerLed,
    registry: Registry,
    hardware: Mutex<Hardware<N>>,
}

/// Write to a node; failures are logged and otherwise ignored.
fn write_node<N: SysfsNode>(node: &mut N, value: &str) {
    if let Err(e) = node.write_value(value) {
        log::warn!("write {value:?} to {} failed: {e}", node.path().display());
    }
}

impl<N: SysfsNode> LightsCore<N> {
    pub fn new(topology: Topology<N>) -> Self {
        LightsCore {
            power_led: topology.power_led,
            registry: topology.registry,
            hardware: Mutex::new(Hardware {
                handles: topology.handles,
                remembered_brightness: topology.remembered_brightness,
            }),
        }
    }

    /// Probe `view` and build the core from the result.
    pub fn from_view<V>(view: &V) -> Result<Self>
    where
        V: SysfsView<Node = N>,
    {
        Ok(Self::new(probe::probe(view)?))
    }

    pub fn power_led(&self) -> PowerLed {
        self.power_led
    }

    pub fn remembered_brightness(&self) -> u8 {
        self.lock().remembered_brightness
    }

    pub fn summary(&self) -> TopologySummary {
        let hw = self.lock();
        TopologySummary::new(
            self.power_led,
            &hw.handles,
            hw.remembered_brightness,
            &self.registry,
        )
    }

    fn lock(&self) -> MutexGuard<'_, Hardware<N>> {
        // Handles plus one byte: no invariant spans a panic.
        self.hardware
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_backlight(&self, state: &LightState) {
        let mut hw = self.lock();
        let brightness = state.brightness();
        let remembered = hw.remembered_brightness;

        if let Some(node) = hw.handles.power_state.as_mut() {
            let effect = if brightness != 0 {
                EFFECT_NORMAL
            } else {
                EFFECT_BREATHE
            };
            write_node(node, effect);
        } else if let Some(node) = hw.handles.power.as_mut() {
            let level = if brightness != 0 { remembered } else { 0 };
            write_node(node, &level.to_string());
        }

        if let Some(node) = hw.handles.backlight.as_mut() {
            write_node(node, &brightness.to_string());
        }
    }

    fn set_buttons(&self, state: &LightState) {
        let mut hw = self.lock();
        let brightness = state.brightness();
        hw.remembered_brightness = brightness;

        // Zero leaves the button LEDs as they are.
        if brightness != 0
            && let Some(node) = hw.handles.buttons.as_mut()
        {
            write_node(node, &brightness.to_string());
        }
    }
}

impl<N: SysfsNode> Lights for LightsCore<N> {
    fn set_light_state(&self, id: i32, state: &LightState) -> Result<()> {
        let entry = self.registry.get(id).ok_or(LightsError::Unsupported(id))?;
        log::debug!(
            "set light {id} ({}) to color {:#010x}",
            entry.light.light_type,
            state.color
        );
        match entry.kind {
            LightKind::Backlight => self.set_backlight(state),
            LightKind::Buttons => self.set_buttons(state),
        }
        Ok(())
    }

    fn get_lights(&self) -> Vec<HwLight> {
        self.registry.lights()
    }

    fn supported_types(&self) -> Vec<LightType> {
        self.registry.types()
    }

    fn light_for_type(&self, light_type: LightType) -> Option<i32> {
        self.registry.find_type(light_type).map(|e| e.light.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{LIGHTBAR_NODE, LIGHTBAR_STATE, ROTH_LED_NODE};
    use crate::sysfs::mock::{MockNode, MockSysfs};

    const PANEL: &str = "class/backlight/panel/brightness";
    const NV_POWER: &str = "class/nvshieldled/led0/brightness";
    const NV_STATE: &str = "class/nvshieldled/led0/state";
    const NV_BUTTONS: &str = "class/nvshieldled/led0/brightness2";
    const NV_BUTTONS_STATE: &str = "class/nvshieldled/led0/state2";

    fn core(fs: &MockSysfs) -> LightsCore<MockNode> {
        LightsCore::from_view(fs).unwrap()
    }

    fn gray(v: u32) -> LightState {
        LightState::with_color(0xFF00_0000 | (v << 16) | (v << 8) | v)
    }

    fn nvshieldled() -> MockSysfs {
        MockSysfs::new()
            .node(PANEL, "0")
            .node(NV_POWER, "0")
            .node(NV_STATE, "")
            .node(NV_BUTTONS, "0")
            .node(NV_BUTTONS_STATE, "")
    }

    #[test]
    fn backlight_always_present() {
        let lights = core(&MockSysfs::new()).get_lights();
        assert_eq!(lights[0], HwLight::new(0, LightType::Backlight));
    }

    #[test]
    fn unknown_id_is_unsupported_without_writes() {
        let fs = nvshieldled();
        let c = core(&fs);
        let err = c.set_light_state(7, &gray(100)).unwrap_err();
        assert!(matches!(err, LightsError::Unsupported(7)));
        assert!(c.set_light_state(-1, &gray(100)).is_err());
        assert!(fs.all_writes().is_empty());
    }

    #[test]
    fn backlight_without_hardware_is_noop() {
        let fs = MockSysfs::new();
        let c = core(&fs);
        c.set_light_state(0, &gray(200)).unwrap();
        assert!(fs.all_writes().is_empty());
    }

    #[test]
    fn backlight_writes_panel_brightness() {
        let fs = MockSysfs::new().node(PANEL, "0");
        let c = core(&fs);
        c.set_light_state(0, &LightState::with_color(0x00FF_0000)).unwrap();
        assert_eq!(fs.writes_to(PANEL), vec!["76\n"]);
    }

    #[test]
    fn lightbar_zero_writes_breathe_not_power() {
        let fs = MockSysfs::new()
            .node(PANEL, "0")
            .node(LIGHTBAR_NODE, "20")
            .node(LIGHTBAR_STATE, "");
        let c = core(&fs);
        c.set_light_state(0, &gray(0)).unwrap();
        assert_eq!(fs.writes_to(LIGHTBAR_STATE), vec!["breathe\n"]);
        assert!(fs.writes_to(LIGHTBAR_NODE).is_empty());
        assert_eq!(fs.writes_to(PANEL), vec!["0\n"]);
    }

    #[test]
    fn lightbar_nonzero_writes_normal() {
        let fs = MockSysfs::new()
            .node(LIGHTBAR_NODE, "20")
            .node(LIGHTBAR_STATE, "");
        let c = core(&fs);
        c.set_light_state(0, &gray(128)).unwrap();
        assert_eq!(fs.writes_to(LIGHTBAR_STATE), vec!["normal\n"]);
        assert!(fs.writes_to(LIGHTBAR_NODE).is_empty());
    }

    #[test]
    fn lightbar_without_effects_falls_back_to_power_node() {
        let fs = MockSysfs::new().node(LIGHTBAR_NODE, "20");
        let c = core(&fs);
        c.set_light_state(0, &gray(128)).unwrap();
        c.set_light_state(0, &gray(0)).unwrap();
        assert_eq!(fs.writes_to(LIGHTBAR_NODE), vec!["20\n", "0\n"]);
    }

    #[test]
    fn roth_backlight_uses_remembered_level() {
        let fs = MockSysfs::new().node(ROTH_LED_NODE, "33");
        let c = core(&fs);
        c.set_light_state(0, &gray(9)).unwrap();
        c.set_light_state(0, &gray(0)).unwrap();
        assert_eq!(fs.writes_to(ROTH_LED_NODE), vec!["33\n", "0\n"]);
    }

    #[test]
    fn buttons_sets_remembered_and_writes_nonzero() {
        let fs = nvshieldled();
        let c = core(&fs);
        c.set_light_state(1, &gray(5)).unwrap();
        assert_eq!(c.remembered_brightness(), 5);
        assert_eq!(fs.writes_to(NV_BUTTONS), vec!["5\n"]);
    }

    #[test]
    fn buttons_zero_does_not_clear() {
        let fs = nvshieldled();
        let c = core(&fs);
        c.set_light_state(1, &gray(5)).unwrap();
        c.set_light_state(1, &gray(0)).unwrap();
        assert_eq!(fs.writes_to(NV_BUTTONS), vec!["5\n"]);
        assert_eq!(c.remembered_brightness(), 0);
    }

    #[test]
    fn nvshieldled_backlight_drives_state_node() {
        let fs = nvshieldled();
        let c = core(&fs);
        c.set_light_state(0, &gray(0)).unwrap();
        c.set_light_state(0, &gray(50)).unwrap();
        assert_eq!(fs.writes_to(NV_STATE), vec!["breathe\n", "normal\n"]);
        assert!(fs.writes_to(NV_POWER).is_empty());
        assert_eq!(fs.writes_to(PANEL), vec!["0\n", "50\n"]);
    }

    #[test]
    fn failed_write_still_succeeds() {
        let fs = MockSysfs::new().node(PANEL, "0").fail_writes(PANEL);
        let c = core(&fs);
        assert!(c.set_light_state(0, &gray(10)).is_ok());
    }

    #[test]
    fn supported_types_and_lookup() {
        let c = core(&nvshieldled());
        assert_eq!(
            c.supported_types(),
            vec![LightType::Backlight, LightType::Buttons]
        );
        assert_eq!(c.light_for_type(LightType::Buttons), Some(1));
        assert_eq!(c.light_for_type(LightType::Battery), None);
    }

    #[test]
    fn summary_matches_probe() {
        let c = core(&nvshieldled());
        let s = c.summary();
        assert_eq!(s.power_led, PowerLed::NvShieldLed);
        assert_eq!(s.buttons.as_deref(), Some(NV_BUTTONS));
        assert_eq!(s.lights.len(), 2);
    }
}
