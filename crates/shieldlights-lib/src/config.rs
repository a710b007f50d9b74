//! Service configuration — optional TOML file, defaults for everything.
//!
//! The daemon runs fine with no file at all; the file exists so the sysfs
//! root can be pointed at a test tree and the worker count tuned.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sysfs::SYSFS_ROOT;

/// Default location of the config file on the device.
pub const DEFAULT_CONFIG_PATH: &str = "/vendor/etc/shieldlights.toml";

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Mount point of sysfs. Default: "/sys".
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,

    /// Instance the service registers as. Default: "default".
    #[serde(default = "default_instance")]
    pub instance: String,

    /// Request worker threads in the service host. Default: 4.
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Log filter used when `RUST_LOG` is unset. Default: "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from(SYSFS_ROOT)
}
fn default_instance() -> String {
    "default".into()
}
fn default_worker_threads() -> usize {
    4
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sysfs_root: default_sysfs_root(),
            instance: default_instance(),
            worker_threads: default_worker_threads(),
            log_level: default_log_level(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// `sysfs_root` is not an absolute path.
    RelativeSysfsRoot(PathBuf),
    /// `instance` is empty or whitespace-only.
    EmptyInstance,
    /// `worker_threads` is zero.
    NoWorkers,
    /// `log_level` is not a known level.
    InvalidLogLevel(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::RelativeSysfsRoot(p) => {
                write!(f, "sysfs_root must be absolute: {}", p.display())
            }
            ValidationError::EmptyInstance => write!(f, "instance cannot be empty"),
            ValidationError::NoWorkers => write!(f, "worker_threads must be at least 1"),
            ValidationError::InvalidLogLevel(l) => {
                write!(f, "Invalid log_level: {l} (expected one of {})", LOG_LEVELS.join(", "))
            }
        }
    }
}

impl Config {
    /// Load config from `path`, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from `path` (or the default location).
    ///
    /// Warnings are returned, not logged: the logger is set up from the result.
    pub fn load(path: Option<&Path>) -> (Self, Vec<String>) {
        Self::load_from(path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH)))
    }

    /// Full service name, e.g. `android.hardware.light.ILights/default`.
    pub fn service_name(&self) -> String {
        crate::frontend::AidlLights::instance_name(self.instance.trim())
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if !self.sysfs_root.is_absolute() {
            errors.push(ValidationError::RelativeSysfsRoot(self.sysfs_root.clone()));
        }
        if self.instance.trim().is_empty() {
            errors.push(ValidationError::EmptyInstance);
        }
        if self.worker_threads == 0 {
            errors.push(ValidationError::NoWorkers);
        }
        let level = self.log_level.trim().to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ValidationError::InvalidLogLevel(self.log_level.clone()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all problems into one [`crate::LightsError::Config`].
    pub fn validated(self) -> crate::error::Result<Self> {
        match self.validate() {
            Ok(()) => Ok(self),
            Err(errors) => {
                let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                Err(crate::LightsError::Config(msgs.join("; ")))
            }
        }
    }
}
