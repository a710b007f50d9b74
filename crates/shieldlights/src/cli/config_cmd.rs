//! `config` subcommand — show the effective configuration.

use std::path::Path;

use super::{Config, ConfigOutput, ConfigSource, Result, kv, kv_indent, kv_width};
use shieldlights_lib::config::DEFAULT_CONFIG_PATH;

pub(super) fn cmd_config(config: Config, source: &ConfigSource<'_>, json: bool) -> Result<()> {
    let config_path = source.path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
    let config_exists = config_path.exists();
    let parse_error = source.warnings.first().cloned();

    if json {
        let output = ConfigOutput {
            config_file: config_path.display().to_string(),
            config_file_exists: config_exists,
            config_file_error: parse_error,
            service_name: config.service_name(),
            settings: config,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?
        );
        return Ok(());
    }

    let w = kv_width(
        &["Config file:", "Service:"],
        &["sysfs_root:", "instance:", "worker_threads:", "log_level:"],
    );

    let status = if !config_exists {
        "not found, using defaults"
    } else if parse_error.is_some() {
        "parse error, using defaults"
    } else {
        "loaded"
    };
    kv("Config file:", format_args!("{} ({status})", config_path.display()), w);
    kv("Service:", config.service_name(), w);
    println!();

    println!("Settings:");
    kv_indent("sysfs_root:", config.sysfs_root.display(), w);
    kv_indent("instance:", &config.instance, w);
    kv_indent("worker_threads:", config.worker_threads, w);
    kv_indent("log_level:", &config.log_level, w);

    if let Err(errors) = config.validate() {
        println!();
        println!("Problems:");
        for e in errors {
            println!("  {e}");
        }
    }
    Ok(())
}
