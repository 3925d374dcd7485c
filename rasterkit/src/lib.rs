//! Convenience layer over the [`image`] crate for everyday raster work.
//!
//! The crate wraps a [`DynamicImage`](image::DynamicImage) with a small set of
//! forwarding helpers and one piece of real logic, JPEG chroma subsampling
//! control when saving:
//! - [`pixels`] reads and writes whole pixel grids as packed ARGB `u32`s.
//! - [`transform`] resizes, rotates and flips.
//! - [`filter`] runs 3x3 convolutions and toolkit adjustments through [`ImageOp`].
//! - [`loader`] decodes from paths, `file://` URLs and in-memory bytes.
//! - [`gradient`] rasterizes a color function across the width of an image.
//! - [`save`] picks a writer from the file extension and applies
//!   [`SaveOptions`] (quality, progressive, subsampling).
//! - [`jpeg`] holds the writer metadata tree, the subsampling patcher and a
//!   frame header reader.
//! - [`viewer`] builds a window framebuffer and, with the `viewer` feature,
//!   shows it.
//!
//! ```no_run
//! use rasterkit::{SaveOptions, Subsampling};
//!
//! let img = rasterkit::load_path("photo.png")?;
//! let img = rasterkit::transform::resize(&img, 800, None)?;
//! rasterkit::save_with(&img, "photo.jpg", &SaveOptions::default().subsampling(Subsampling::S420))?;
//! # Ok::<(), rasterkit::Error>(())
//! ```

/// The underlying image toolkit, re-exported so callers can name its types.
pub use image;

mod error;

pub mod filter;
pub mod gradient;
pub mod jpeg;
pub mod loader;
pub mod pixels;
pub mod save;
pub mod transform;
pub mod viewer;
pub mod writer;

pub use error::{EncodeError, Error, Result};
pub use filter::{Adjustment, Convolution, Filter, ImageOp, apply_all};
pub use gradient::{gradient, linear_gradient};
pub use jpeg::Subsampling;
pub use loader::{ImageSource, load, load_bytes, load_path, load_url};
pub use pixels::PixelFormat;
pub use save::{SaveOptions, encode, save, save_with};
pub use transform::{FlipDirection, ResizeMethod};
pub use viewer::{Framebuffer, ViewOptions, framebuffer};
#[cfg(feature = "viewer")]
pub use viewer::show;
pub use writer::ImageWriter;
