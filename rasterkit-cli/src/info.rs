use std::fs;

use anyhow::{Context, Result};
use rasterkit::jpeg;
use rasterkit::pixels::{PixelFormat, pixel_format};

use crate::cli::InfoArgs;

const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

pub fn run_info(args: &InfoArgs) -> Result<()> {
    let bytes = fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let img = rasterkit::load_bytes(&bytes)
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;

    println!("File: {}", args.input.display());
    println!("Size: {}x{}", img.width(), img.height());
    println!("Color: {:?}", img.color());
    println!(
        "Pixel format: {}",
        match pixel_format(&img) {
            PixelFormat::Rgb => "RGB",
            PixelFormat::Argb => "ARGB",
        }
    );

    if bytes.starts_with(&JPEG_SOI) {
        let frame = jpeg::inspect(&bytes).context("Failed to read JPEG frame header")?;
        println!(
            "JPEG: {} bit, {}",
            frame.precision,
            if frame.progressive { "progressive" } else { "baseline" }
        );
        match frame.subsampling() {
            Some(s) if frame.components.len() == 3 => println!("Subsampling: {s}"),
            _ => {}
        }
        for c in &frame.components {
            println!(
                "  component {}: {}x{} (quant table {})",
                c.id, c.horizontal, c.vertical, c.quant_table
            );
        }
    }
    Ok(())
}
