//! Saves one image with every chroma subsampling and reports the file sizes.
//!
//! ```text
//! cargo run -p rasterkit --example subsampling_sizes -- photo.png --quality 0.9
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rasterkit::{SaveOptions, Subsampling, jpeg};

#[derive(Parser, Debug)]
struct Args {
    /// Source image
    input: PathBuf,

    /// Directory for the JPEGs (defaults to the input's directory)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 0.8)]
    quality: f32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let img = rasterkit::load_path(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    let out_dir = args.out_dir.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let stem = args
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    for s in Subsampling::ALL {
        let path = out_dir.join(format!("{stem}-{}{}.jpg", s.horizontal(), s.vertical()));
        let opts = SaveOptions::default().quality(args.quality).subsampling(s);
        rasterkit::save_with(&img, &path, &opts)?;

        let bytes = std::fs::read(&path)?;
        let frame = jpeg::inspect(&bytes)?;
        println!(
            "{:>5}  {:>9} bytes  Y {}x{}  {}",
            s.to_string(),
            bytes.len(),
            frame.components[0].horizontal,
            frame.components[0].vertical,
            path.display()
        );
    }
    Ok(())
}
