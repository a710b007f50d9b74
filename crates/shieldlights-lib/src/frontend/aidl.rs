//! Current-generation interface: lights addressed by identifier.

use std::fmt;
use std::sync::Arc;

use crate::error::LightsError;
use crate::light::{HwLight, LightState};
use crate::lights::Lights;

/// Interface descriptor the service registers under (with `/default`).
pub const DESCRIPTOR: &str = "android.hardware.light.ILights";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    IllegalArgument,
    UnsupportedOperation,
    ServiceSpecific,
}

/// Error status returned across the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: ExceptionCode,
    pub message: String,
}

impl Status {
    pub fn new(code: ExceptionCode, message: impl Into<String>) -> Self {
        Status {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for Status {}

impl From<LightsError> for Status {
    fn from(e: LightsError) -> Self {
        let code = match e {
            // Unknown ids are reported the way the platform expects from
            // vendor lights HALs: a service-specific failure.
            LightsError::Unsupported(_) => ExceptionCode::ServiceSpecific,
            LightsError::Protocol(_) | LightsError::Config(_) => ExceptionCode::IllegalArgument,
            LightsError::Io(_) | LightsError::Enumerate { .. } => ExceptionCode::ServiceSpecific,
        };
        Status::new(code, e.to_string())
    }
}

/// Identifier-addressed adapter over a [`Lights`] core.
#[derive(Clone)]
pub struct AidlLights {
    core: Arc<dyn Lights>,
}

impl AidlLights {
    pub fn new(core: Arc<dyn Lights>) -> Self {
        AidlLights { core }
    }

    /// Full instance name, e.g. `android.hardware.light.ILights/default`.
    pub fn instance_name(instance: &str) -> String {
        format!("{DESCRIPTOR}/{instance}")
    }

    pub fn set_light_state(&self, id: i32, state: &LightState) -> Result<(), Status> {
        self.core.set_light_state(id, state).map_err(Status::from)
    }

    pub fn get_lights(&self) -> Result<Vec<HwLight>, Status> {
        Ok(self.core.get_lights())
    }
}
