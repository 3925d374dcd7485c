use std::fmt;
use std::str::FromStr;

use image::DynamicImage;

use super::metadata::{
    ImageTypeDescriptor, JpegMetadata, MarkerNode, NATIVE_FORMAT, is_color_frame,
};
use crate::error::{Error, Result};
use crate::writer::ImageWriter;

const MARKER_SEQUENCE_INDEX: usize = 1;

/// Chroma subsampling as a packed code: horizontal luma factor in the high
/// nibble, vertical in the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subsampling(u8);

impl Subsampling {
    pub const S444: Subsampling = Subsampling(0x11);
    pub const S422: Subsampling = Subsampling(0x21);
    pub const S420: Subsampling = Subsampling(0x22);
    pub const S411: Subsampling = Subsampling(0x41);

    pub const ALL: [Subsampling; 4] = [Self::S444, Self::S422, Self::S420, Self::S411];

    /// Builds a code from luma sampling factors, each in `1..=4`.
    pub fn from_factors(horizontal: u8, vertical: u8) -> Result<Self> {
        for (axis, f) in [("horizontal", horizontal), ("vertical", vertical)] {
            if !(1..=4).contains(&f) {
                return Err(Error::invalid_param(format!(
                    "{axis} sampling factor {f} is outside 1..=4"
                )));
            }
        }
        Ok(Subsampling(horizontal << 4 | vertical))
    }

    pub fn from_code(code: u8) -> Result<Self> {
        Self::from_factors((code >> 4) & 0xF, code & 0xF)
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn horizontal(self) -> u8 {
        (self.0 >> 4) & 0xF
    }

    pub fn vertical(self) -> u8 {
        self.0 & 0xF
    }
}

impl Default for Subsampling {
    fn default() -> Self {
        Self::S444
    }
}

impl fmt::Display for Subsampling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::S444 => f.write_str("4:4:4"),
            Self::S422 => f.write_str("4:2:2"),
            Self::S420 => f.write_str("4:2:0"),
            Self::S411 => f.write_str("4:1:1"),
            other => write!(f, "{}x{}", other.horizontal(), other.vertical()),
        }
    }
}

impl FromStr for Subsampling {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "4:4:4" | "444" => Ok(Self::S444),
            "4:2:2" | "422" => Ok(Self::S422),
            "4:2:0" | "420" => Ok(Self::S420),
            "4:1:1" | "411" => Ok(Self::S411),
            other => Err(Error::invalid_param(format!(
                "unknown subsampling {other:?} (expected 4:4:4, 4:2:2, 4:2:0 or 4:1:1)"
            ))),
        }
    }
}

/// Metadata that makes `writer` encode `image` with `subsampling`.
///
/// Returns `Ok(None)` when the writer is not JPEG, or when the default
/// metadata has no three-component frame to patch (grayscale, CMYK). The
/// writer then falls back to its own defaults.
pub fn subsampling_metadata(
    writer: ImageWriter,
    subsampling: Subsampling,
    image: &DynamicImage,
) -> Result<Option<JpegMetadata>> {
    let desc = ImageTypeDescriptor::from_image(image);
    match writer.default_image_metadata(&desc) {
        Some(metadata) => patch_metadata(metadata, subsampling),
        None => Ok(None),
    }
}

/// Applies `subsampling` to a metadata object, see [`subsampling_metadata`].
pub fn patch_metadata(
    mut metadata: JpegMetadata,
    subsampling: Subsampling,
) -> Result<Option<JpegMetadata>> {
    let mut tree = metadata.as_tree(NATIVE_FORMAT)?;
    let Some(markers) = tree.children_mut().get_mut(MARKER_SEQUENCE_INDEX) else {
        return Ok(None);
    };
    if !patch_frame_sampling(markers.children_mut(), subsampling) {
        return Ok(None);
    }
    metadata.set_from_tree(NATIVE_FORMAT, tree)?;
    log::debug!("frame sampling patched to {}", subsampling);
    Ok(Some(metadata))
}

/// Finds the first `sof` marker with exactly three components and rewrites
/// the sampling factors of its first component. Returns whether a marker
/// was patched.
pub fn patch_frame_sampling<N: MarkerNode>(markers: &mut [N], subsampling: Subsampling) -> bool {
    let Some(sof) = markers.iter_mut().find(|m| is_color_frame(&**m)) else {
        return false;
    };
    let Some(component) = sof.first_child_mut() else {
        return false;
    };
    if component.attribute("HsamplingFactor").is_none()
        || component.attribute("VsamplingFactor").is_none()
    {
        return false;
    }
    component.set_attribute("VsamplingFactor", subsampling.vertical().to_string());
    component.set_attribute("HsamplingFactor", subsampling.horizontal().to_string());
    true
}
