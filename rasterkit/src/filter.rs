//! Image operators.
//!
//! [`ImageOp`] is the single capability every operator provides. Two families
//! implement it: [`Convolution`], a native 3x3 kernel, and [`Adjustment`],
//! the toolkit's own filters. [`Filter`] tags either one when the caller
//! wants to hold a mixed list by value.

use image::{DynamicImage, ImageBuffer, Pixel};

use crate::error::{Error, Result};

pub trait ImageOp {
    /// Produces a new image; the input is left untouched.
    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage>;
}

/// A 3x3 convolution kernel in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Convolution {
    kernel: [f32; 9],
}

impl Convolution {
    pub fn new(kernel: [f32; 9]) -> Result<Self> {
        if let Some(bad) = kernel.iter().find(|k| !k.is_finite()) {
            return Err(Error::invalid_param(format!(
                "convolution kernel contains non-finite weight {bad}"
            )));
        }
        Ok(Self { kernel })
    }

    pub fn sharpen() -> Self {
        Self {
            kernel: [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
        }
    }

    pub fn edge_detect() -> Self {
        Self {
            kernel: [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0],
        }
    }

    pub fn emboss() -> Self {
        Self {
            kernel: [-2.0, -1.0, 0.0, -1.0, 1.0, 1.0, 0.0, 1.0, 2.0],
        }
    }

    pub fn box_blur() -> Self {
        Self {
            kernel: [1.0 / 9.0; 9],
        }
    }

    pub fn kernel(&self) -> &[f32; 9] {
        &self.kernel
    }
}

impl ImageOp for Convolution {
    /// Samples outside the image repeat the nearest edge pixel.
    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Ok(image.clone());
        }
        // filter3x3 does not compute the outer one-pixel ring; pad so the
        // real border lands inside the filtered region.
        let padded = pad_edges(image).filter3x3(&self.kernel);
        Ok(padded.crop_imm(1, 1, width, height))
    }
}

fn pad_edges(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(buf) => DynamicImage::ImageLuma8(pad_buffer(buf)),
        DynamicImage::ImageLumaA8(buf) => DynamicImage::ImageLumaA8(pad_buffer(buf)),
        DynamicImage::ImageRgb8(buf) => DynamicImage::ImageRgb8(pad_buffer(buf)),
        DynamicImage::ImageRgba8(buf) => DynamicImage::ImageRgba8(pad_buffer(buf)),
        DynamicImage::ImageLuma16(buf) => DynamicImage::ImageLuma16(pad_buffer(buf)),
        DynamicImage::ImageLumaA16(buf) => DynamicImage::ImageLumaA16(pad_buffer(buf)),
        DynamicImage::ImageRgb16(buf) => DynamicImage::ImageRgb16(pad_buffer(buf)),
        DynamicImage::ImageRgba16(buf) => DynamicImage::ImageRgba16(pad_buffer(buf)),
        DynamicImage::ImageRgb32F(buf) => DynamicImage::ImageRgb32F(pad_buffer(buf)),
        DynamicImage::ImageRgba32F(buf) => DynamicImage::ImageRgba32F(pad_buffer(buf)),
        other => DynamicImage::ImageRgba32F(pad_buffer(&other.to_rgba32f())),
    }
}

/// Copies `buf` into a buffer one pixel larger on every side, repeating the
/// edge pixels outward. `buf` must not be empty.
fn pad_buffer<P: Pixel>(
    buf: &ImageBuffer<P, Vec<P::Subpixel>>,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (w, h) = buf.dimensions();
    ImageBuffer::from_fn(w + 2, h + 2, |x, y| {
        *buf.get_pixel(x.saturating_sub(1).min(w - 1), y.saturating_sub(1).min(h - 1))
    })
}

/// Filters implemented by the `image` toolkit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// Gaussian blur with the given standard deviation.
    Blur { sigma: f32 },
    /// Unsharp mask; `threshold` is the minimum brightness change to sharpen.
    Unsharpen { sigma: f32, threshold: i32 },
    Brighten(i32),
    /// Contrast change in percent; negative values reduce contrast.
    Contrast(f32),
    /// Hue rotation in degrees.
    HueRotate(i32),
    Grayscale,
    Invert,
}

impl ImageOp for Adjustment {
    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage> {
        match *self {
            Adjustment::Blur { sigma } => {
                check_sigma(sigma)?;
                Ok(image.blur(sigma))
            }
            Adjustment::Unsharpen { sigma, threshold } => {
                check_sigma(sigma)?;
                Ok(image.unsharpen(sigma, threshold))
            }
            Adjustment::Brighten(value) => Ok(image.brighten(value)),
            Adjustment::Contrast(percent) => {
                if !percent.is_finite() {
                    return Err(Error::invalid_param(format!(
                        "contrast must be finite, got {percent}"
                    )));
                }
                Ok(image.adjust_contrast(percent))
            }
            Adjustment::HueRotate(degrees) => Ok(image.huerotate(degrees)),
            Adjustment::Grayscale => Ok(image.grayscale()),
            Adjustment::Invert => {
                let mut out = image.clone();
                out.invert();
                Ok(out)
            }
        }
    }
}

fn check_sigma(sigma: f32) -> Result<()> {
    if sigma.is_finite() && sigma > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_param(format!(
            "filter sigma must be positive, got {sigma}"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Native(Convolution),
    Library(Adjustment),
}

impl From<Convolution> for Filter {
    fn from(op: Convolution) -> Self {
        Filter::Native(op)
    }
}

impl From<Adjustment> for Filter {
    fn from(op: Adjustment) -> Self {
        Filter::Library(op)
    }
}

impl ImageOp for Filter {
    fn apply(&self, image: &DynamicImage) -> Result<DynamicImage> {
        match self {
            Filter::Native(op) => op.apply(image),
            Filter::Library(op) => op.apply(image),
        }
    }
}

/// Runs `ops` in order, each on the previous result.
pub fn apply_all(image: &DynamicImage, ops: &[&dyn ImageOp]) -> Result<DynamicImage> {
    let mut current = image.clone();
    for op in ops {
        current = op.apply(&current)?;
    }
    Ok(current)
}
