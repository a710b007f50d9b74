//! `set` subcommand — apply one color to one light.

use super::{Config, Lights, Result, color, open_core};
use shieldlights_lib::light::LightState;

pub(super) fn cmd_set(config: &Config, id: i32, color_arg: &str) -> Result<()> {
    let value = color::parse_color(color_arg)?;
    let core = open_core(config)?;
    let state = LightState::with_color(value);
    core.set_light_state(id, &state)?;
    println!(
        "Light {id}: {} (brightness {})",
        color::format_color(value),
        state.brightness()
    );
    Ok(())
}
