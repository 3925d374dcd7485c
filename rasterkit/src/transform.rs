//! Resizing, rotation and flipping.
//!
//! Scaling goes through `fast_image_resize`; rotations and flips are the
//! lossless `image` routines, so four quarter turns reproduce the input.

use std::str::FromStr;

use fast_image_resize as fr;
use image::DynamicImage;
use image::imageops::FilterType;

use crate::error::{Error, Result};

/// Interpolation used when the pixel grid changes size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResizeMethod {
    Nearest,
    Bilinear,
    #[default]
    CatmullRom,
    Mitchell,
    Lanczos3,
}

impl ResizeMethod {
    fn to_fast_alg(self) -> fr::ResizeAlg {
        match self {
            ResizeMethod::Nearest => fr::ResizeAlg::Nearest,
            ResizeMethod::Bilinear => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            ResizeMethod::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            ResizeMethod::Mitchell => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            ResizeMethod::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }

    fn to_image_filter(self) -> FilterType {
        match self {
            ResizeMethod::Nearest => FilterType::Nearest,
            ResizeMethod::Bilinear => FilterType::Triangle,
            ResizeMethod::CatmullRom => FilterType::CatmullRom,
            ResizeMethod::Mitchell => FilterType::Gaussian,
            ResizeMethod::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Quarter-turn rotation, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Maps an angle in degrees onto a quarter turn. Negative angles rotate
    /// counter-clockwise; anything that is not a multiple of 90 is rejected.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(Error::invalid_param(format!(
                "rotation angle {degrees} is not a multiple of 90 degrees"
            )));
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Rotation::None,
            90 => Rotation::Cw90,
            180 => Rotation::Cw180,
            _ => Rotation::Cw270,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    Horizontal,
    Vertical,
}

impl FromStr for FlipDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "horizontal" => Ok(FlipDirection::Horizontal),
            "v" | "vertical" => Ok(FlipDirection::Vertical),
            other => Err(Error::invalid_param(format!(
                "unknown flip direction {other:?} (expected horizontal or vertical)"
            ))),
        }
    }
}

/// Height that keeps the aspect ratio when the width becomes `width`.
pub fn fit_height(src_width: u32, src_height: u32, width: u32) -> u32 {
    let h = (width as f64 * src_height as f64 / src_width as f64).round();
    (h as u32).max(1)
}

/// Resizes to `width`, deriving the height from the aspect ratio when it is
/// not given.
pub fn resize(image: &DynamicImage, width: u32, height: Option<u32>) -> Result<DynamicImage> {
    resize_with(image, width, height, ResizeMethod::default())
}

pub fn resize_with(
    image: &DynamicImage,
    width: u32,
    height: Option<u32>,
    method: ResizeMethod,
) -> Result<DynamicImage> {
    let height = height.unwrap_or_else(|| fit_height(image.width(), image.height(), width));
    scale_with(image, width, height, method)
}

/// Resizes to exactly `width` x `height`, ignoring the aspect ratio.
pub fn scale(image: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    scale_with(image, width, height, ResizeMethod::default())
}

/// Multiplies both dimensions by `factor`.
pub fn zoom(image: &DynamicImage, factor: f32) -> Result<DynamicImage> {
    if !factor.is_finite() || factor <= 0.0 {
        return Err(Error::invalid_param(format!(
            "zoom factor must be positive, got {factor}"
        )));
    }
    if factor == 1.0 {
        return Ok(image.clone());
    }
    let width = ((image.width() as f32 * factor).round() as u32).max(1);
    let height = ((image.height() as f32 * factor).round() as u32).max(1);
    scale_with(image, width, height, ResizeMethod::default())
}

pub fn rotate(image: &DynamicImage, degrees: i32) -> Result<DynamicImage> {
    Ok(match Rotation::from_degrees(degrees)? {
        Rotation::None => image.clone(),
        Rotation::Cw90 => image.rotate90(),
        Rotation::Cw180 => image.rotate180(),
        Rotation::Cw270 => image.rotate270(),
    })
}

pub fn flip(image: &DynamicImage, direction: FlipDirection) -> DynamicImage {
    match direction {
        FlipDirection::Horizontal => image.fliph(),
        FlipDirection::Vertical => image.flipv(),
    }
}

fn scale_with(
    image: &DynamicImage,
    width: u32,
    height: u32,
    method: ResizeMethod,
) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_param(format!(
            "target dimensions must be non-zero, got {width}x{height}"
        )));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::invalid_param("cannot resize an empty image"));
    }
    if (width, height) == (image.width(), image.height()) {
        return Ok(image.clone());
    }
    check_allocation(image, width, height)?;

    log::debug!(
        "resize {}x{} -> {}x{} ({:?})",
        image.width(),
        image.height(),
        width,
        height,
        method
    );

    match fast_resize(image, width, height, method) {
        Ok(resized) => Ok(resized),
        Err(err) => {
            log::warn!(
                "fast_image_resize rejected {:?}, using image::resize_exact: {}",
                image.color(),
                err
            );
            Ok(image.resize_exact(width, height, method.to_image_filter()))
        }
    }
}

/// Rejects targets whose pixel buffer would exceed the decoder's default
/// allocation limit.
fn check_allocation(image: &DynamicImage, width: u32, height: u32) -> Result<()> {
    let max = image::Limits::default().max_alloc.unwrap_or(u64::MAX);
    let bytes = u64::from(width)
        .checked_mul(u64::from(height))
        .and_then(|n| n.checked_mul(u64::from(image.color().bytes_per_pixel())));
    match bytes {
        Some(n) if n <= max => Ok(()),
        _ => Err(Error::invalid_param(format!(
            "target {width}x{height} {:?} exceeds the {max} byte allocation limit",
            image.color()
        ))),
    }
}

fn fast_resize(
    image: &DynamicImage,
    width: u32,
    height: u32,
    method: ResizeMethod,
) -> std::result::Result<DynamicImage, fr::ResizeError> {
    let mut dst = DynamicImage::new(width, height, image.color());
    let options = fr::ResizeOptions::new().resize_alg(method.to_fast_alg());
    let mut resizer = fr::Resizer::new();
    resizer.resize(image, &mut dst, Some(&options))?;
    Ok(dst)
}
