use image::{DynamicImage, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Rasterizes `color_at` across the width of a new image.
///
/// Column `x` is painted with `color_at(t)` where `t = x / (width - 1)`, so
/// the first column samples `0.0` and the last samples `1.0`. Every row is
/// identical.
pub fn gradient<F>(width: u32, height: u32, color_at: F) -> Result<DynamicImage>
where
    F: Fn(f32) -> Rgba<u8>,
{
    if width == 0 || height == 0 {
        return Err(Error::invalid_param(format!(
            "gradient dimensions must be non-zero, got {width}x{height}"
        )));
    }

    let span = (width - 1).max(1) as f32;
    let row: Vec<Rgba<u8>> = (0..width).map(|x| color_at(x as f32 / span)).collect();
    let img = RgbaImage::from_fn(width, height, |x, _| row[x as usize]);
    Ok(DynamicImage::ImageRgba8(img))
}

/// Two-stop linear gradient from `from` on the left to `to` on the right.
pub fn linear_gradient(
    width: u32,
    height: u32,
    from: Rgba<u8>,
    to: Rgba<u8>,
) -> Result<DynamicImage> {
    gradient(width, height, |t| lerp(from, to, t))
}

fn lerp(from: Rgba<u8>, to: Rgba<u8>, t: f32) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for (i, c) in out.iter_mut().enumerate() {
        let a = from.0[i] as f32;
        let b = to.0[i] as f32;
        *c = (a + (b - a) * t).round() as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_both_colors() {
        let black = Rgba([0, 0, 0, 255]);
        let white = Rgba([255, 255, 255, 255]);
        let img = linear_gradient(11, 3, black, white).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 0), &black);
        assert_eq!(img.get_pixel(10, 2), &white);
        assert_eq!(img.get_pixel(5, 1), &Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn rows_are_identical() {
        let img = gradient(7, 4, |t| Rgba([(t * 255.0) as u8, 0, 0, 255]))
            .unwrap()
            .to_rgba8();
        for y in 1..4 {
            for x in 0..7 {
                assert_eq!(img.get_pixel(x, y), img.get_pixel(x, 0));
            }
        }
    }

    #[test]
    fn single_column_samples_start() {
        let img = gradient(1, 2, |t| Rgba([(t * 100.0) as u8, 0, 0, 255]))
            .unwrap()
            .to_rgba8();
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn empty_gradient_is_rejected() {
        assert!(gradient(0, 1, |_| Rgba([0; 4])).is_err());
    }
}
