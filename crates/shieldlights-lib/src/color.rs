//! Color parsing and formatting for command-line light requests.
//!
//! Colors use the platform format `0xAARRGGBB`. Alpha is carried through but
//! never affects brightness.

use crate::error::{LightsError, Result};

const OPAQUE: u32 = 0xFF00_0000;

/// Parse a color string into `0xAARRGGBB`.
///
/// Accepts:
/// - Hex RGB: `"#FF0000"`, `"FF0000"` (alpha set to `FF`)
/// - Hex ARGB: `"0xFF00FF00"`, `"#80FFFFFF"`
/// - Decimal: `"4294967295"`, except exactly six digits, which always read
///   as bare hex RGB (`"123456"` is `0xFF123456`)
/// - Named: `"white"`, `"red"`, `"green"`, `"blue"`, `"gray"`, `"off"`/`"black"`
pub fn parse_color(s: &str) -> Result<u32> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "white" => return Ok(0xFFFF_FFFF),
        "red" => return Ok(0xFFFF_0000),
        "green" => return Ok(0xFF00_FF00),
        "blue" => return Ok(0xFF00_00FF),
        "gray" | "grey" => return Ok(0xFF80_8080),
        "off" | "black" => return Ok(OPAQUE),
        _ => {}
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16)
            .map_err(|_| LightsError::Protocol(format!("Invalid hex color: {s}")));
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(s, hex);
    }

    if s.len() == 6 && s.chars().all(|c| c.is_ascii_hexdigit()) {
        return parse_hex(s, s);
    }

    s.parse::<u32>().map_err(|_| {
        LightsError::Protocol(format!(
            "Invalid color: {s} (use #RRGGBB, 0xAARRGGBB, or a color name)"
        ))
    })
}

fn parse_hex(original: &str, hex: &str) -> Result<u32> {
    let val = u32::from_str_radix(hex, 16)
        .map_err(|_| LightsError::Protocol(format!("Invalid hex color: {original}")))?;
    match hex.len() {
        6 => Ok(OPAQUE | val),
        8 => Ok(val),
        _ => Err(LightsError::Protocol(format!(
            "Invalid color: {original} (use #RRGGBB or #AARRGGBB)"
        ))),
    }
}

/// Format a color as `#AARRGGBB`.
pub fn format_color(val: u32) -> String {
    format!("#{val:08X}")
}
