//! Encoder registry.
//!
//! An [`ImageWriter`] is picked by file extension. Each writer advertises what
//! it can be told through [`WriteParam`] (compression, progressive scans) and,
//! for JPEG, exposes a default metadata tree that callers may edit before
//! encoding.

use std::borrow::Cow;
use std::io::{Seek, Write};

use image::codecs::gif::GifEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{DynamicImage, Frame, ImageFormat};
use jpeg_encoder::{ColorType as JpegColorType, Encoder as JpegEncoder, SamplingFactor};

use crate::error::{EncodeError, Error, Result};
use crate::jpeg::{ImageTypeDescriptor, JpegMetadata};

/// Compression quality every writer starts from until one is set explicitly.
pub const DEFAULT_QUALITY: f32 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageWriter {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    Tga,
    WebP,
    Ico,
    Pnm,
}

impl ImageWriter {
    pub const ALL: [ImageWriter; 9] = [
        ImageWriter::Jpeg,
        ImageWriter::Png,
        ImageWriter::Gif,
        ImageWriter::Bmp,
        ImageWriter::Tiff,
        ImageWriter::Tga,
        ImageWriter::WebP,
        ImageWriter::Ico,
        ImageWriter::Pnm,
    ];

    /// Case-insensitive lookup by extension, without the leading dot.
    pub fn for_extension(extension: &str) -> Option<Self> {
        let ext = extension.to_ascii_lowercase();
        Self::ALL.into_iter().find(|w| w.extensions().contains(&ext.as_str()))
    }

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageWriter::Jpeg => &["jpg", "jpeg"],
            ImageWriter::Png => &["png"],
            ImageWriter::Gif => &["gif"],
            ImageWriter::Bmp => &["bmp"],
            ImageWriter::Tiff => &["tif", "tiff"],
            ImageWriter::Tga => &["tga"],
            ImageWriter::WebP => &["webp"],
            ImageWriter::Ico => &["ico"],
            ImageWriter::Pnm => &["pbm", "pgm", "ppm", "pnm", "pam"],
        }
    }

    pub fn format_name(self) -> &'static str {
        match self {
            ImageWriter::Jpeg => "JPEG",
            ImageWriter::Png => "PNG",
            ImageWriter::Gif => "GIF",
            ImageWriter::Bmp => "BMP",
            ImageWriter::Tiff => "TIFF",
            ImageWriter::Tga => "TGA",
            ImageWriter::WebP => "WebP",
            ImageWriter::Ico => "ICO",
            ImageWriter::Pnm => "PNM",
        }
    }

    fn compression_types(self) -> &'static [&'static str] {
        match self {
            ImageWriter::Jpeg => &["JPEG"],
            ImageWriter::Png => &["Deflate"],
            ImageWriter::Gif => &["LZW"],
            _ => &[],
        }
    }

    pub fn default_write_param(self) -> WriteParam {
        WriteParam {
            compression_types: self.compression_types(),
            can_write_progressive: self == ImageWriter::Jpeg,
            compression_mode: CompressionMode::Default,
            compression_type: None,
            compression_quality: DEFAULT_QUALITY,
            progressive_mode: ProgressiveMode::CopyFromMetadata,
        }
    }

    /// Whether this writer can encode luma sampling factors `h` x `v`.
    /// Writers without chroma subsampling accept anything.
    pub fn supports_sampling(self, h: u8, v: u8) -> bool {
        match self {
            ImageWriter::Jpeg => SamplingFactor::from_factors(h, v).is_some(),
            _ => true,
        }
    }

    /// The metadata this writer would emit for `desc`. Only JPEG has one.
    pub fn default_image_metadata(self, desc: &ImageTypeDescriptor) -> Option<JpegMetadata> {
        match self {
            ImageWriter::Jpeg => Some(JpegMetadata::default_for(desc)),
            _ => None,
        }
    }

    /// Encodes `image` into `sink`.
    ///
    /// `metadata` is only consulted by the JPEG writer: the first frame
    /// component's sampling factors and, in [`ProgressiveMode::CopyFromMetadata`],
    /// the frame's coding process.
    pub fn write<W: Write + Seek>(
        self,
        image: &DynamicImage,
        metadata: Option<&JpegMetadata>,
        param: &WriteParam,
        sink: &mut W,
    ) -> std::result::Result<(), EncodeError> {
        match self {
            ImageWriter::Jpeg => write_jpeg(image, metadata, param, sink),
            ImageWriter::Png => {
                let compression = if param.compression_mode == CompressionMode::Explicit {
                    png_compression(param.compression_quality)
                } else {
                    CompressionType::Default
                };
                let encoder = PngEncoder::new_with_quality(sink, compression, PngFilter::Adaptive);
                image.write_with_encoder(encoder)?;
                Ok(())
            }
            ImageWriter::Gif => {
                let mut encoder = GifEncoder::new(sink);
                encoder.encode_frame(Frame::new(image.to_rgba8()))?;
                Ok(())
            }
            ImageWriter::Bmp => write_plain(&to_8bit(image), ImageFormat::Bmp, sink),
            ImageWriter::Tiff => write_plain(image, ImageFormat::Tiff, sink),
            ImageWriter::Tga => write_plain(&to_8bit(image), ImageFormat::Tga, sink),
            ImageWriter::WebP => write_plain(&to_rgb_family(image), ImageFormat::WebP, sink),
            ImageWriter::Ico => write_plain(&to_rgb_family(image), ImageFormat::Ico, sink),
            ImageWriter::Pnm => write_plain(&to_8bit(image), ImageFormat::Pnm, sink),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompressionMode {
    /// The writer picks its own settings.
    #[default]
    Default,
    /// Type and quality come from the parameters.
    Explicit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressiveMode {
    Disabled,
    /// Progressive scans on.
    Default,
    /// Follow the coding process recorded in the metadata; baseline without it.
    #[default]
    CopyFromMetadata,
}

/// Settings handed to a writer for one encode.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteParam {
    compression_types: &'static [&'static str],
    can_write_progressive: bool,
    compression_mode: CompressionMode,
    compression_type: Option<&'static str>,
    compression_quality: f32,
    progressive_mode: ProgressiveMode,
}

impl WriteParam {
    pub fn can_write_compressed(&self) -> bool {
        !self.compression_types.is_empty()
    }

    pub fn can_write_progressive(&self) -> bool {
        self.can_write_progressive
    }

    pub fn compression_types(&self) -> &'static [&'static str] {
        self.compression_types
    }

    pub fn compression_mode(&self) -> CompressionMode {
        self.compression_mode
    }

    pub fn compression_type(&self) -> Option<&'static str> {
        self.compression_type
    }

    pub fn compression_quality(&self) -> f32 {
        self.compression_quality
    }

    pub fn progressive_mode(&self) -> ProgressiveMode {
        self.progressive_mode
    }

    pub fn set_compression_mode(&mut self, mode: CompressionMode) -> Result<()> {
        if !self.can_write_compressed() {
            return Err(Error::invalid_param("writer does not support compression settings"));
        }
        self.compression_mode = mode;
        Ok(())
    }

    pub fn set_compression_type(&mut self, name: &str) -> Result<()> {
        self.require_explicit()?;
        let found = self
            .compression_types
            .iter()
            .find(|t| t.eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                Error::invalid_param(format!(
                    "unknown compression type {name:?} (available: {:?})",
                    self.compression_types
                ))
            })?;
        self.compression_type = Some(found);
        Ok(())
    }

    /// Quality in `0.0..=1.0`; higher keeps more detail.
    pub fn set_compression_quality(&mut self, quality: f32) -> Result<()> {
        self.require_explicit()?;
        if !(0.0..=1.0).contains(&quality) {
            return Err(Error::invalid_param(format!(
                "compression quality {quality} is outside 0.0..=1.0"
            )));
        }
        self.compression_quality = quality;
        Ok(())
    }

    pub fn set_progressive_mode(&mut self, mode: ProgressiveMode) -> Result<()> {
        if !self.can_write_progressive {
            return Err(Error::invalid_param("writer does not support progressive encoding"));
        }
        self.progressive_mode = mode;
        Ok(())
    }

    fn require_explicit(&self) -> Result<()> {
        if self.compression_mode == CompressionMode::Explicit {
            Ok(())
        } else {
            Err(Error::invalid_param("compression mode is not explicit"))
        }
    }
}

fn write_jpeg<W: Write>(
    image: &DynamicImage,
    metadata: Option<&JpegMetadata>,
    param: &WriteParam,
    sink: &mut W,
) -> std::result::Result<(), EncodeError> {
    let width = u16::try_from(image.width()).map_err(|_| {
        EncodeError::Unsupported(format!("JPEG width {} exceeds 65535", image.width()))
    })?;
    let height = u16::try_from(image.height()).map_err(|_| {
        EncodeError::Unsupported(format!("JPEG height {} exceeds 65535", image.height()))
    })?;

    let quality = if param.compression_mode == CompressionMode::Explicit {
        param.compression_quality
    } else {
        DEFAULT_QUALITY
    };
    let quality = (quality * 100.0).round().clamp(1.0, 100.0) as u8;

    let progressive = match param.progressive_mode {
        ProgressiveMode::Disabled => false,
        ProgressiveMode::Default => true,
        ProgressiveMode::CopyFromMetadata => metadata.is_some_and(JpegMetadata::is_progressive),
    };

    let mut encoder = JpegEncoder::new(sink, quality);
    encoder.set_progressive(progressive);
    if let Some((h, v)) = metadata.and_then(JpegMetadata::luma_sampling) {
        let factor = SamplingFactor::from_factors(h, v).ok_or_else(|| {
            EncodeError::Unsupported(format!("JPEG sampling factors {h}x{v} are not supported"))
        })?;
        encoder.set_sampling_factor(factor);
    }
    log::debug!(
        "jpeg {}x{} quality={} progressive={} sampling={:?}",
        width,
        height,
        quality,
        progressive,
        metadata.and_then(JpegMetadata::luma_sampling)
    );

    match image {
        DynamicImage::ImageLuma8(buf) => encoder.encode(buf, width, height, JpegColorType::Luma)?,
        DynamicImage::ImageRgb8(buf) => encoder.encode(buf, width, height, JpegColorType::Rgb)?,
        DynamicImage::ImageRgba8(buf) => encoder.encode(buf, width, height, JpegColorType::Rgba)?,
        other if other.color().has_color() => {
            encoder.encode(&other.to_rgb8(), width, height, JpegColorType::Rgb)?
        }
        other => encoder.encode(&other.to_luma8(), width, height, JpegColorType::Luma)?,
    }
    Ok(())
}

fn png_compression(quality: f32) -> CompressionType {
    // Higher quality trades file size for speed, as with deflate levels.
    if quality >= 0.75 {
        CompressionType::Fast
    } else if quality <= 0.25 {
        CompressionType::Best
    } else {
        CompressionType::Default
    }
}

fn write_plain<W: Write + Seek>(
    image: &DynamicImage,
    format: ImageFormat,
    sink: &mut W,
) -> std::result::Result<(), EncodeError> {
    image.write_to(sink, format)?;
    Ok(())
}

fn to_8bit(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
        other if other.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
        }
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

fn to_rgb_family(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => Cow::Borrowed(image),
        other if other.color().has_alpha() => {
            Cow::Owned(DynamicImage::ImageRgba8(other.to_rgba8()))
        }
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}
