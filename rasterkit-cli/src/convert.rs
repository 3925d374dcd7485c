use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rasterkit::image::DynamicImage;
use rasterkit::transform::{self, fit_height};
use rasterkit::{Adjustment, Convolution, Filter, ImageOp, SaveOptions};

use crate::cli::ConvertArgs;

pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    let img = rasterkit::load_path(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    println!(
        "Loaded {} ({}x{}, {:?})",
        args.input.display(),
        img.width(),
        img.height(),
        img.color()
    );

    let img = apply_geometry(img, args)?;
    let img = apply_filters(&img, args)?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| default_out_path(&args.input));
    let opts = SaveOptions {
        quality: args.quality,
        progressive: args.progressive_override(),
        subsampling: args.subsampling,
    };
    let written = rasterkit::save_with(&img, &out, &opts)
        .with_context(|| format!("Failed to write output {}", out.display()))?;

    println!("Wrote {} ({}x{})", written.display(), img.width(), img.height());
    Ok(())
}

fn apply_geometry(img: DynamicImage, args: &ConvertArgs) -> Result<DynamicImage> {
    let method = args.filter.into();
    let img = match (args.width, args.height) {
        (Some(w), h) => transform::resize_with(&img, w, h, method)?,
        (None, Some(h)) => {
            let w = fit_height(img.height(), img.width(), h);
            transform::resize_with(&img, w, Some(h), method)?
        }
        (None, None) => img,
    };
    let img = match args.rotate {
        Some(deg) => transform::rotate(&img, deg)?,
        None => img,
    };
    Ok(match args.flip {
        Some(dir) => transform::flip(&img, dir),
        None => img,
    })
}

fn apply_filters(img: &DynamicImage, args: &ConvertArgs) -> Result<DynamicImage> {
    let mut filters: Vec<Filter> = Vec::new();
    if let Some(sigma) = args.blur {
        filters.push(Adjustment::Blur { sigma }.into());
    }
    if args.sharpen {
        filters.push(Convolution::sharpen().into());
    }
    if args.grayscale {
        filters.push(Adjustment::Grayscale.into());
    }
    if filters.is_empty() {
        return Ok(img.clone());
    }
    log::debug!("applying {} filter(s)", filters.len());

    let ops: Vec<&dyn ImageOp> = filters.iter().map(|f| f as &dyn ImageOp).collect();
    Ok(rasterkit::apply_all(img, &ops)?)
}

fn default_out_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input.file_stem().unwrap_or_else(|| OsStr::new("image"));
    let ext = input.extension().unwrap_or_else(|| OsStr::new("png"));

    let mut filename = stem.to_os_string();
    filename.push("-converted");
    filename.push(".");
    filename.push(ext);

    let mut out = parent.to_path_buf();
    out.push(filename);
    out
}
