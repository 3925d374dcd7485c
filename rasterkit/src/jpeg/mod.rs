//! JPEG-specific pieces: the writer's metadata tree, chroma subsampling, and
//! reading the frame header back out of an encoded stream.

mod metadata;
mod subsampling;

pub use metadata::{
    ImageTypeDescriptor, JpegColorSpace, JpegMetadata, MarkerNode, MetadataNode, NATIVE_FORMAT,
    is_color_frame,
};
pub use subsampling::{Subsampling, patch_frame_sampling, patch_metadata, subsampling_metadata};

use bytes::Bytes;
use img_parts::jpeg::{Jpeg, markers};

use crate::error::{Error, Result};

/// One component of an encoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInfo {
    pub id: u8,
    pub horizontal: u8,
    pub vertical: u8,
    pub quant_table: u8,
}

/// Frame header of an encoded JPEG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u16,
    pub height: u16,
    pub precision: u8,
    pub progressive: bool,
    pub components: Vec<ComponentInfo>,
}

impl FrameInfo {
    /// Sampling of the first component as a subsampling code, if the
    /// factors are in range.
    pub fn subsampling(&self) -> Option<Subsampling> {
        let first = self.components.first()?;
        Subsampling::from_factors(first.horizontal, first.vertical).ok()
    }
}

/// Reads the first start-of-frame segment of an encoded JPEG.
pub fn inspect(bytes: &[u8]) -> Result<FrameInfo> {
    let jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(bytes))
        .map_err(|e| Error::decode("JPEG stream", e))?;
    let segment = jpeg
        .segments()
        .iter()
        .find(|s| is_sof(s.marker()))
        .ok_or_else(|| Error::decode("JPEG stream", "no start-of-frame segment"))?;
    parse_sof(segment.marker(), segment.contents())
}

// DHT, JPG and DAC sit inside the SOF range.
const DHT: u8 = 0xC4;
const JPG: u8 = 0xC8;
const DAC: u8 = 0xCC;

fn is_sof(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker) && !matches!(marker, DHT | JPG | DAC)
}

fn parse_sof(marker: u8, data: &[u8]) -> Result<FrameInfo> {
    let truncated = || Error::decode("JPEG stream", "truncated start-of-frame segment");
    if data.len() < 6 {
        return Err(truncated());
    }
    let count = data[5] as usize;
    let specs = data.get(6..6 + count * 3).ok_or_else(truncated)?;

    Ok(FrameInfo {
        precision: data[0],
        height: u16::from_be_bytes([data[1], data[2]]),
        width: u16::from_be_bytes([data[3], data[4]]),
        progressive: matches!(marker, markers::SOF2 | 0xC6 | 0xCA | 0xCE),
        components: specs
            .chunks_exact(3)
            .map(|c| ComponentInfo {
                id: c[0],
                horizontal: c[1] >> 4,
                vertical: c[1] & 0xF,
                quant_table: c[2],
            })
            .collect(),
    })
}
