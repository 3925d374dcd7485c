//! On-screen display.
//!
//! [`framebuffer`] is always available and produces the `0RGB` buffer a
//! window expects. [`show`] needs the `viewer` feature.

use image::DynamicImage;

use crate::error::Result;
use crate::transform;

/// Packed `0x00RRGGBB` pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub zoom: f32,
    pub title: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            title: "rasterkit".to_string(),
        }
    }
}

impl ViewOptions {
    pub fn zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Scales `image` by `zoom` and flattens it to a window framebuffer. Alpha
/// is dropped.
pub fn framebuffer(image: &DynamicImage, zoom: f32) -> Result<Framebuffer> {
    let scaled = transform::zoom(image, zoom)?;
    let rgb = scaled.to_rgb8();
    let pixels = rgb
        .pixels()
        .map(|p| (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32)
        .collect();
    Ok(Framebuffer {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
        pixels,
    })
}

/// Opens a window showing `image` and blocks until it is closed or Escape
/// is pressed.
#[cfg(feature = "viewer")]
pub fn show(image: &DynamicImage, opts: &ViewOptions) -> Result<()> {
    use minifb::{Key, Window, WindowOptions};

    use crate::error::Error;

    let fb = framebuffer(image, opts.zoom)?;
    let mut window = Window::new(&opts.title, fb.width, fb.height, WindowOptions::default())
        .map_err(|e| Error::Display {
            detail: e.to_string(),
        })?;
    window.set_target_fps(30);
    log::debug!("viewer window {}x{} {:?}", fb.width, fb.height, opts.title);

    while window.is_open() && !window.is_key_down(Key::Escape) {
        window
            .update_with_buffer(&fb.pixels, fb.width, fb.height)
            .map_err(|e| Error::Display {
                detail: e.to_string(),
            })?;
    }
    Ok(())
}
