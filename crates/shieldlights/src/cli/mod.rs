//! CLI subcommands — daemon, topology probe, one-shot light control.

mod config_cmd;
mod probe;
mod serve;
mod set;

use std::path::Path;

use clap::Subcommand;
use serde::Serialize;

pub(super) use shieldlights_lib::config::Config;
pub(super) use shieldlights_lib::error::Result;
pub(super) use shieldlights_lib::probe::TopologySummary;
pub(super) use shieldlights_lib::sysfs::SysfsRoot;
pub(super) use shieldlights_lib::{Lights, LightsCore, color};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Probe the sysfs tree named by `config`.
pub(super) fn open_core(config: &Config) -> Result<LightsCore<shieldlights_lib::sysfs::SysfsFile>> {
    LightsCore::from_view(&SysfsRoot::new(&config.sysfs_root))
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ProbeOutput {
    pub sysfs_root: String,
    pub topology: TopologySummary,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: String,
    pub config_file_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file_error: Option<String>,
    pub service_name: String,
    pub settings: Config,
}

/// Where the effective config came from.
pub struct ConfigSource<'a> {
    /// `--config` argument, if any.
    pub path: Option<&'a Path>,
    /// Warnings raised while loading it.
    pub warnings: &'a [String],
}

#[derive(Subcommand)]
pub enum Command {
    /// Probe the hardware and serve light requests on stdin/stdout
    Serve,

    /// Probe LED and backlight hardware and print the discovered topology
    Probe,

    /// Set one light's color once
    Set {
        /// Light identifier (0 is always the backlight)
        id: i32,
        /// Color: #RRGGBB, 0xAARRGGBB, decimal, or a name (white, off, ...)
        color: String,
    },

    /// Show the effective configuration
    Config,
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, config: Config, source: &ConfigSource<'_>, json: bool) -> Result<()> {
    match cmd {
        Command::Serve => {
            if json {
                warn_json_unsupported("serve");
            }
            serve::cmd_serve(config.validated()?)
        }
        Command::Probe => probe::cmd_probe(&config, json),
        Command::Set { id, color } => {
            if json {
                warn_json_unsupported("set");
            }
            set::cmd_set(&config, id, &color)
        }
        Command::Config => config_cmd::cmd_config(config, source, json),
    }
}
