//! Bulk access to an image's pixels as packed `0xAARRGGBB` integers.
//!
//! Reading packs every pixel in row-major order. RGB images report an opaque
//! alpha of `0xFF`; writing into an RGB image ignores the alpha byte.

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// The two canonical layouts a raster is created with or reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb,
    Argb,
}

/// Reports whether `image` carries an alpha channel.
pub fn pixel_format(image: &DynamicImage) -> PixelFormat {
    if image.color().has_alpha() {
        PixelFormat::Argb
    } else {
        PixelFormat::Rgb
    }
}

/// Allocates a zero-filled 8-bit image of the given layout.
pub fn blank(width: u32, height: u32, format: PixelFormat) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_param(format!(
            "image dimensions must be non-zero, got {width}x{height}"
        )));
    }
    Ok(match format {
        PixelFormat::Rgb => DynamicImage::new_rgb8(width, height),
        PixelFormat::Argb => DynamicImage::new_rgba8(width, height),
    })
}

#[inline]
pub fn pack_argb(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

#[inline]
pub fn unpack_argb(px: u32) -> [u8; 4] {
    [(px >> 16) as u8, (px >> 8) as u8, px as u8, (px >> 24) as u8]
}

/// Copies the whole pixel grid out as packed ARGB values.
pub fn read_pixels(image: &DynamicImage) -> Vec<u32> {
    match image {
        DynamicImage::ImageRgb8(buf) => pack_rgb(buf.as_raw()),
        DynamicImage::ImageRgba8(buf) => pack_rgba(buf.as_raw()),
        other => pack_rgba(other.to_rgba8().as_raw()),
    }
}

/// Overwrites the whole pixel grid from packed ARGB values.
///
/// `pixels` must hold exactly `width * height` entries. Images that are not
/// 8-bit RGB or RGBA are converted to RGBA8 first.
pub fn write_pixels(image: &mut DynamicImage, pixels: &[u32]) -> Result<()> {
    let expected = image.width() as usize * image.height() as usize;
    if pixels.len() != expected {
        return Err(Error::invalid_param(format!(
            "pixel buffer holds {} values, image {}x{} needs {}",
            pixels.len(),
            image.width(),
            image.height(),
            expected
        )));
    }

    match image {
        DynamicImage::ImageRgb8(buf) => write_rgb(buf, pixels),
        DynamicImage::ImageRgba8(buf) => write_rgba(buf, pixels),
        other => {
            let mut rgba = other.to_rgba8();
            write_rgba(&mut rgba, pixels);
            *other = DynamicImage::ImageRgba8(rgba);
        }
    }
    Ok(())
}

fn pack_rgb(raw: &[u8]) -> Vec<u32> {
    raw.chunks_exact(3)
        .map(|c| pack_argb(c[0], c[1], c[2], 0xFF))
        .collect()
}

fn pack_rgba(raw: &[u8]) -> Vec<u32> {
    raw.chunks_exact(4)
        .map(|c| pack_argb(c[0], c[1], c[2], c[3]))
        .collect()
}

fn write_rgb(buf: &mut RgbImage, pixels: &[u32]) {
    for (dst, &px) in buf.chunks_exact_mut(3).zip(pixels) {
        let [r, g, b, _] = unpack_argb(px);
        dst.copy_from_slice(&[r, g, b]);
    }
}

fn write_rgba(buf: &mut RgbaImage, pixels: &[u32]) {
    for (dst, &px) in buf.chunks_exact_mut(4).zip(pixels) {
        dst.copy_from_slice(&unpack_argb(px));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};
    use proptest::prelude::*;

    #[test]
    fn rgb_reads_back_opaque() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0x12, 0x34, 0x56]));
        img.put_pixel(1, 0, Rgb([0xff, 0x00, 0x80]));
        let px = read_pixels(&DynamicImage::ImageRgb8(img));
        assert_eq!(px, vec![0xff12_3456, 0xffff_0080]);
    }

    #[test]
    fn write_into_rgb_drops_alpha() {
        let mut img = blank(1, 1, PixelFormat::Rgb).unwrap();
        write_pixels(&mut img, &[0x0011_2233]).unwrap();
        assert_eq!(img.to_rgb8().get_pixel(0, 0), &Rgb([0x11, 0x22, 0x33]));
        assert_eq!(read_pixels(&img), vec![0xff11_2233]);
    }

    #[test]
    fn write_converts_gray_to_rgba() {
        let mut img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([7])));
        write_pixels(&mut img, &[0x8001_0203; 4]).unwrap();
        assert_eq!(pixel_format(&img), PixelFormat::Argb);
        assert_eq!(read_pixels(&img), vec![0x8001_0203; 4]);
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let mut img = blank(3, 2, PixelFormat::Argb).unwrap();
        let err = write_pixels(&mut img, &[0; 5]).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(msg) if msg.contains("5")));
    }

    #[test]
    fn zero_sized_blank_is_rejected() {
        assert!(blank(0, 4, PixelFormat::Rgb).is_err());
    }

    proptest! {
        #[test]
        fn argb_write_then_read_is_identity(
            (w, h, data) in (1u32..8, 1u32..8).prop_flat_map(|(w, h)| {
                proptest::collection::vec(any::<u32>(), (w * h) as usize)
                    .prop_map(move |data| (w, h, data))
            })
        ) {
            let mut img = blank(w, h, PixelFormat::Argb).unwrap();
            write_pixels(&mut img, &data).unwrap();
            prop_assert_eq!(read_pixels(&img), data);
        }
    }
}
