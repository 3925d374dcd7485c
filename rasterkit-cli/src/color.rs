use anyhow::{Result, bail};
use rasterkit::image::Rgba;

/// Parses `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
pub fn parse_hex_color(s: &str) -> Result<Rgba<u8>> {
    let hex = s.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        bail!("Invalid color {s:?}; expected RRGGBB or RRGGBBAA");
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    let alpha = if hex.len() == 8 { channel(6)? } else { 0xFF };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_and_rgba() {
        assert_eq!(parse_hex_color("ff8000").unwrap(), Rgba([255, 128, 0, 255]));
        assert_eq!(parse_hex_color("#0000ff80").unwrap(), Rgba([0, 0, 255, 128]));
        assert_eq!(parse_hex_color("ABCDEF").unwrap(), Rgba([0xAB, 0xCD, 0xEF, 0xFF]));
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "fff", "gg0000", "12345", "1234567890"] {
            assert!(parse_hex_color(bad).is_err(), "{bad}");
        }
    }
}
