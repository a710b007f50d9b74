//! Light registry — identifier → (descriptor, dispatch behavior).
//!
//! Built once by the prober and never mutated afterwards, so lookups need no
//! lock. Identifiers are handed out sequentially from 0, which makes the
//! identifier the index into the entry list.

use crate::light::{HwLight, LightType};

/// Which dispatch behavior a registered light uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Backlight request: drives the panel and the power LED sleep/wake state.
    Backlight,
    /// Buttons request: drives the button LEDs and sets the remembered level.
    Buttons,
}

impl LightKind {
    pub fn light_type(self) -> LightType {
        match self {
            LightKind::Backlight => LightType::Backlight,
            LightKind::Buttons => LightType::Buttons,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub light: HwLight,
    pub kind: LightKind,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a light under the next free identifier and return it.
    pub fn register(&mut self, kind: LightKind) -> i32 {
        let id = self.entries.len() as i32;
        self.entries.push(RegistryEntry {
            light: HwLight::new(id, kind.light_type()),
            kind,
        });
        id
    }

    pub fn get(&self, id: i32) -> Option<&RegistryEntry> {
        let index = usize::try_from(id).ok()?;
        self.entries.get(index)
    }

    /// First registered light of the given type.
    pub fn find_type(&self, light_type: LightType) -> Option<&RegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.light.light_type == light_type)
    }

    pub fn lights(&self) -> Vec<HwLight> {
        self.entries.iter().map(|e| e.light).collect()
    }

    pub fn types(&self) -> Vec<LightType> {
        self.entries.iter().map(|e| e.light.light_type).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
