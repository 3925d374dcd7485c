use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{EncodeError, Error, Result};
use crate::jpeg::{JpegMetadata, Subsampling, subsampling_metadata};
use crate::writer::{CompressionMode, ImageWriter, ProgressiveMode, WriteParam};

/// How [`save_with`] and [`encode`] configure the writer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaveOptions {
    /// Compression quality in `0.0..=1.0`.
    pub quality: f32,
    /// `None` keeps whatever the metadata asks for.
    pub progressive: Option<bool>,
    /// Chroma subsampling for three-component JPEGs.
    pub subsampling: Subsampling,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            quality: 0.8,
            progressive: None,
            subsampling: Subsampling::S444,
        }
    }
}

impl SaveOptions {
    pub fn quality(mut self, quality: f32) -> Self {
        self.quality = quality;
        self
    }

    pub fn progressive(mut self, progressive: bool) -> Self {
        self.progressive = Some(progressive);
        self
    }

    pub fn subsampling(mut self, subsampling: Subsampling) -> Self {
        self.subsampling = subsampling;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.quality.is_finite() || !(0.0..=1.0).contains(&self.quality) {
            return Err(Error::invalid_param(format!(
                "quality {} is outside 0.0..=1.0",
                self.quality
            )));
        }
        Ok(())
    }
}

/// Saves with [`SaveOptions::default`].
pub fn save(image: &DynamicImage, path: impl AsRef<Path>) -> Result<PathBuf> {
    save_with(image, path, &SaveOptions::default())
}

/// Encodes `image` into `path`, picking the writer from the extension.
///
/// The file is only created once the writer and options are known to be
/// valid. On an encoder failure a partially written file may remain.
pub fn save_with(
    image: &DynamicImage,
    path: impl AsRef<Path>,
    opts: &SaveOptions,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let plan = Plan::new(image, extension, opts)?;
    let target = path.display().to_string();

    let file = File::create(path).map_err(|e| Error::save_failed(&target, e))?;
    let mut out = BufWriter::new(file);
    plan.run(image, &mut out).map_err(|e| Error::save_failed(&target, e))?;
    let file = out
        .into_inner()
        .map_err(|e| Error::save_failed(&target, e.into_error()))?;
    file.sync_all().map_err(|e| Error::save_failed(&target, e))?;

    log::info!(
        "saved {} ({}x{}, {})",
        target,
        image.width(),
        image.height(),
        plan.writer.format_name()
    );
    Ok(path.to_path_buf())
}

/// Same as [`save_with`] but returns the encoded bytes.
pub fn encode(image: &DynamicImage, extension: &str, opts: &SaveOptions) -> Result<Vec<u8>> {
    let plan = Plan::new(image, extension, opts)?;
    let mut out = Cursor::new(Vec::new());
    plan.run(image, &mut out)
        .map_err(|e| Error::save_failed(format!("<memory>.{extension}"), e))?;
    Ok(out.into_inner())
}

/// Writer, parameters and metadata resolved for one save.
struct Plan {
    writer: ImageWriter,
    param: WriteParam,
    metadata: Option<JpegMetadata>,
}

impl Plan {
    fn new(image: &DynamicImage, extension: &str, opts: &SaveOptions) -> Result<Self> {
        let extension = extension.to_ascii_lowercase();
        let writer =
            ImageWriter::for_extension(&extension).ok_or_else(|| Error::UnsupportedFormat {
                extension: extension.clone(),
            })?;
        opts.validate()?;

        let mut param = writer.default_write_param();
        if param.can_write_compressed() {
            param.set_compression_mode(CompressionMode::Explicit)?;
            if extension == "gif" {
                param.set_compression_type("LZW")?;
            } else {
                param.set_compression_quality(opts.quality)?;
            }
        }
        if param.can_write_progressive() {
            match opts.progressive {
                Some(true) => param.set_progressive_mode(ProgressiveMode::Default)?,
                Some(false) => param.set_progressive_mode(ProgressiveMode::Disabled)?,
                None => {}
            }
        }

        let metadata = subsampling_metadata(writer, opts.subsampling, image)?;
        if let Some((h, v)) = metadata.as_ref().and_then(JpegMetadata::luma_sampling) {
            if !writer.supports_sampling(h, v) {
                return Err(Error::invalid_param(format!(
                    "{} writer cannot encode sampling factors {h}x{v}",
                    writer.format_name()
                )));
            }
        }
        log::debug!(
            "writer {} for .{} (quality={}, progressive={:?}, override={})",
            writer.format_name(),
            extension,
            opts.quality,
            param.progressive_mode(),
            metadata.is_some()
        );
        Ok(Self {
            writer,
            param,
            metadata,
        })
    }

    fn run<W: Write + std::io::Seek>(
        &self,
        image: &DynamicImage,
        sink: &mut W,
    ) -> std::result::Result<(), EncodeError> {
        self.writer.write(image, self.metadata.as_ref(), &self.param, sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = SaveOptions::default();
        assert_eq!(opts.quality, 0.8);
        assert_eq!(opts.progressive, None);
        assert_eq!(opts.subsampling, Subsampling::S444);
    }

    #[test]
    fn builder_setters() {
        let opts = SaveOptions::default()
            .quality(0.3)
            .progressive(true)
            .subsampling(Subsampling::S420);
        assert_eq!(opts.quality, 0.3);
        assert_eq!(opts.progressive, Some(true));
        assert_eq!(opts.subsampling, Subsampling::S420);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let img = DynamicImage::new_rgb8(2, 2);
        let err = encode(&img, "xyz", &SaveOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "xyz"));
    }

    #[test]
    fn quality_out_of_range() {
        let img = DynamicImage::new_rgb8(2, 2);
        for q in [-0.1, 1.01, f32::NAN] {
            let err = encode(&img, "jpg", &SaveOptions::default().quality(q)).unwrap_err();
            assert!(matches!(err, Error::InvalidParameter(_)), "{q}");
        }
    }

    #[test]
    fn gif_uses_lzw_and_ignores_quality() {
        let img = DynamicImage::new_rgb8(2, 2);
        let plan = Plan::new(&img, "GIF", &SaveOptions::default().quality(0.1)).unwrap();
        assert_eq!(plan.writer, ImageWriter::Gif);
        assert_eq!(plan.param.compression_type(), Some("LZW"));
        assert_eq!(plan.param.compression_mode(), CompressionMode::Explicit);
        assert!(plan.metadata.is_none());
    }

    #[test]
    fn jpeg_plan_carries_quality_and_override() {
        let img = DynamicImage::new_rgb8(2, 2);
        let opts = SaveOptions::default()
            .quality(0.5)
            .progressive(false)
            .subsampling(Subsampling::S422);
        let plan = Plan::new(&img, "JPEG", &opts).unwrap();
        assert_eq!(plan.param.compression_quality(), 0.5);
        assert_eq!(plan.param.progressive_mode(), ProgressiveMode::Disabled);
        assert_eq!(plan.metadata.unwrap().luma_sampling(), Some((2, 1)));
    }

    #[test]
    fn unencodable_sampling_is_rejected_up_front() {
        let img = DynamicImage::new_rgb8(4, 4);
        let s = Subsampling::from_factors(3, 1).unwrap();
        let err = encode(&img, "jpg", &SaveOptions::default().subsampling(s)).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(ref m) if m.contains("3x1")), "{err}");
        // grayscale frames take no override, so any code is fine
        let gray = DynamicImage::new_luma8(4, 4);
        assert!(encode(&gray, "jpg", &SaveOptions::default().subsampling(s)).is_ok());
    }

    #[test]
    fn progressive_left_unset_copies_metadata() {
        let img = DynamicImage::new_rgb8(2, 2);
        let plan = Plan::new(&img, "jpg", &SaveOptions::default()).unwrap();
        assert_eq!(plan.param.progressive_mode(), ProgressiveMode::CopyFromMetadata);
    }

    #[test]
    fn encodes_png_in_memory() {
        let img = DynamicImage::new_rgb8(3, 3);
        let bytes = encode(&img, "png", &SaveOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
