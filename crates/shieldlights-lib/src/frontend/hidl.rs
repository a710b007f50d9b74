//! Previous-generation interface: lights addressed by type.
//!
//! The older ABI keys lights by [`LightType`], so several BUTTONS entries in
//! the registry collapse into one: requests go to the first of that type and
//! each type is reported once.

use std::sync::Arc;

use crate::error::LightsError;
use crate::light::{LightState, LightType};
use crate::lights::Lights;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    LightNotSupported,
    BrightnessNotSupported,
    Unknown,
}

/// Type-addressed adapter over a [`Lights`] core.
#[derive(Clone)]
pub struct HidlLights {
    core: Arc<dyn Lights>,
}

impl HidlLights {
    pub fn new(core: Arc<dyn Lights>) -> Self {
        HidlLights { core }
    }

    pub fn set_light(&self, light_type: LightType, state: &LightState) -> Status {
        let Some(id) = self.core.light_for_type(light_type) else {
            return Status::LightNotSupported;
        };
        match self.core.set_light_state(id, state) {
            Ok(()) => Status::Success,
            Err(LightsError::Unsupported(_)) => Status::LightNotSupported,
            Err(e) => {
                log::warn!("set_light({light_type}) failed: {e}");
                Status::Unknown
            }
        }
    }

    /// Registered types in identifier order, each reported once.
    pub fn get_supported_types(&self) -> Vec<LightType> {
        let mut types = Vec::new();
        for t in self.core.supported_types() {
            if !types.contains(&t) {
                types.push(t);
            }
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lights::LightsCore;
    use crate::sysfs::mock::MockSysfs;

    fn two_controllers() -> MockSysfs {
        MockSysfs::new()
            .node("class/nvshieldled/a/state2", "")
            .node("class/nvshieldled/a/brightness2", "0")
            .node("class/nvshieldled/b/state2", "")
    }

    fn adapter(fs: &MockSysfs) -> HidlLights {
        HidlLights::new(Arc::new(LightsCore::from_view(fs).unwrap()))
    }

    #[test]
    fn supported_types_deduplicated() {
        let fs = two_controllers();
        assert_eq!(
            adapter(&fs).get_supported_types(),
            vec![LightType::Backlight, LightType::Buttons]
        );
    }

    #[test]
    fn set_buttons_by_type() {
        let fs = two_controllers();
        let status = adapter(&fs).set_light(LightType::Buttons, &LightState::with_color(0x0000_FF00));
        assert_eq!(status, Status::Success);
        assert_eq!(fs.writes_to("class/nvshieldled/a/brightness2"), vec!["149\n"]);
    }

    #[test]
    fn unregistered_type_not_supported() {
        let fs = MockSysfs::new();
        let status = adapter(&fs).set_light(LightType::Buttons, &LightState::with_color(0xFFFF_FFFF));
        assert_eq!(status, Status::LightNotSupported);
        assert!(fs.all_writes().is_empty());
    }

    #[test]
    fn backlight_always_supported() {
        let fs = MockSysfs::new();
        let a = adapter(&fs);
        assert_eq!(a.get_supported_types(), vec![LightType::Backlight]);
        assert_eq!(
            a.set_light(LightType::Backlight, &LightState::default()),
            Status::Success
        );
    }
}
