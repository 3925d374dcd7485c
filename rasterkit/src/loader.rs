//! Decoding images from paths, `file://` URLs and in-memory resources.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader};
use url::Url;

use crate::error::{Error, Result};

/// Where an image is read from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    Path(&'a Path),
    /// A `file://` URL.
    Url(&'a str),
    /// Encoded bytes, typically an `include_bytes!` resource.
    Bytes(&'a [u8]),
}

impl<'a> From<&'a Path> for ImageSource<'a> {
    fn from(path: &'a Path) -> Self {
        ImageSource::Path(path)
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ImageSource::Bytes(bytes)
    }
}

pub fn load(source: ImageSource<'_>) -> Result<DynamicImage> {
    match source {
        ImageSource::Path(path) => load_path(path),
        ImageSource::Url(url) => load_url(url),
        ImageSource::Bytes(bytes) => load_bytes(bytes),
    }
}

pub fn load_path(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let path = path.as_ref();
    let hint = path.display().to_string();
    log::debug!("decoding {}", hint);

    let reader = ImageReader::open(path)
        .map_err(|e| Error::decode(&hint, e))?
        .with_guessed_format()
        .map_err(|e| Error::decode(&hint, e))?;
    if reader.format().is_none() {
        return Err(Error::decode(hint, "unrecognized image format"));
    }
    reader.decode().map_err(|e| Error::decode(hint, e))
}

/// Loads the file a `file://` URL points at. Other schemes are not resolved.
pub fn load_url(url: &str) -> Result<DynamicImage> {
    load_path(file_url_path(url)?)
}

pub fn load_bytes(bytes: &[u8]) -> Result<DynamicImage> {
    let hint = format!("<{} bytes in memory>", bytes.len());
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| Error::decode(&hint, e))?;
    if reader.format().is_none() {
        return Err(Error::decode(hint, "unrecognized image format"));
    }
    reader.decode().map_err(|e| Error::decode(hint, e))
}

fn file_url_path(raw: &str) -> Result<PathBuf> {
    let url = Url::parse(raw).map_err(|e| Error::decode(raw, e))?;
    if url.scheme() != "file" {
        return Err(Error::decode(raw, "only file:// URLs can be loaded"));
    }
    url.to_file_path()
        .map_err(|()| Error::decode(raw, "URL does not name a local file"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn file_urls_map_to_paths() {
        assert_eq!(
            file_url_path("file:///tmp/a.png").unwrap(),
            PathBuf::from("/tmp/a.png")
        );
        assert_eq!(
            file_url_path("FILE://localhost/tmp/a.png").unwrap(),
            PathBuf::from("/tmp/a.png")
        );
        assert_eq!(
            file_url_path("file:///tmp/with%20space/caf%C3%A9.png").unwrap(),
            PathBuf::from("/tmp/with space/caf\u{e9}.png")
        );
    }

    #[test]
    fn non_file_urls_are_rejected() {
        for bad in ["https://example.com/a.png", "/tmp/a.png", "not a url"] {
            assert!(
                matches!(file_url_path(bad), Err(Error::Decode { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn http_url_is_a_decode_error() {
        let err = load_url("http://example.com/a.png").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = load_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, Error::Decode { detail, .. } if detail.contains("unrecognized")));
    }

    #[test]
    fn missing_file_fails_to_decode() {
        let err = load(ImageSource::Path(Path::new("/nonexistent/rasterkit.png"))).unwrap_err();
        match err {
            Error::Decode { source_hint, .. } => assert!(source_hint.contains("rasterkit.png")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn png_bytes_decode() {
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        let decoded = load(ImageSource::Bytes(buf.get_ref())).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }
}
