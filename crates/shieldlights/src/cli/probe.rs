//! `probe` subcommand — show the discovered LED topology.

use super::{Config, ProbeOutput, Result, kv, kv_indent, kv_width, open_core};

pub(super) fn cmd_probe(config: &Config, json: bool) -> Result<()> {
    let core = open_core(config)?;
    let topology = core.summary();

    if json {
        let output = ProbeOutput {
            sysfs_root: config.sysfs_root.display().to_string(),
            topology,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?
        );
        return Ok(());
    }

    let w = kv_width(
        &["Sysfs root:", "Power LED:", "Remembered:"],
        &["backlight:", "power:", "power_state:", "buttons:", "buttons_state:"],
    );
    let node = |n: &Option<String>| n.clone().unwrap_or_else(|| "(absent)".into());

    kv("Sysfs root:", config.sysfs_root.display(), w);
    kv("Power LED:", format_args!("{:?}", topology.power_led), w);
    kv("Remembered:", topology.remembered_brightness, w);
    println!();

    println!("Nodes:");
    kv_indent("backlight:", node(&topology.backlight), w);
    kv_indent("power:", node(&topology.power), w);
    kv_indent("power_state:", node(&topology.power_state), w);
    kv_indent("buttons:", node(&topology.buttons), w);
    kv_indent("buttons_state:", node(&topology.buttons_state), w);
    println!();

    println!("Lights:");
    for light in &topology.lights {
        println!("  [{}] {}", light.id, light.light_type);
    }
    Ok(())
}
