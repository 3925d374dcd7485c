//! The JPEG writer's metadata tree.
//!
//! Metadata is exchanged as a loosely typed tree of named nodes with string
//! attributes, in the writer's native format ([`NATIVE_FORMAT`]):
//!
//! ```text
//! jpeg_metadata
//! ├── variety
//! │   └── app0JFIF (majorVersion, minorVersion, resUnits, Xdensity, Ydensity)
//! └── markerSequence
//!     ├── dqt
//!     │   └── dqtable (elementPrecision, qtableId)   one per table
//!     ├── sof (process, samplePrecision, numLines, samplesPerLine, numFrameComponents)
//!     │   └── componentSpec (componentId, HsamplingFactor, VsamplingFactor, QtableSelector)
//!     └── sos (numScanComponents)
//!         └── scanComponentSpec (componentSelector, dcHuffTable, acHuffTable)
//! ```
//!
//! Code that edits marker nodes goes through [`MarkerNode`] rather than the
//! raw tree.

use image::DynamicImage;

use crate::error::{Error, Result};

/// Name of the native metadata format understood by the JPEG writer.
pub const NATIVE_FORMAT: &str = "rasterkit_jpeg_1.0";

const ROOT: &str = "jpeg_metadata";
const MARKER_SEQUENCE: &str = "markerSequence";
const PROCESS_BASELINE: &str = "0";
const PROCESS_PROGRESSIVE: &str = "2";

/// Narrow view of a marker node: what the subsampling patch needs to read
/// and write.
pub trait MarkerNode {
    fn name(&self) -> &str;
    fn child_count(&self) -> usize;
    fn first_child_mut(&mut self) -> Option<&mut Self>;
    fn attribute(&self, name: &str) -> Option<&str>;
    /// Overwrites an existing attribute. Returns `false` if it is absent.
    fn set_attribute(&mut self, name: &str, value: String) -> bool;
}

/// Whether `node` is a frame header carrying three components, the only
/// kind of frame whose chroma subsampling can be chosen.
pub fn is_color_frame<N: MarkerNode>(node: &N) -> bool {
    node.name().eq_ignore_ascii_case("sof") && node.child_count() == COLOR_FRAME_COMPONENTS
}

const COLOR_FRAME_COMPONENTS: usize = 3;

/// A node in a metadata tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<MetadataNode>,
}

impl MetadataNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl ToString) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_child(mut self, child: MetadataNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[MetadataNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [MetadataNode] {
        &mut self.children
    }

    pub fn push_child(&mut self, child: MetadataNode) {
        self.children.push(child);
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&MetadataNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

impl MarkerNode for MetadataNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn first_child_mut(&mut self) -> Option<&mut Self> {
        self.children.first_mut()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: String) -> bool {
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => {
                *v = value;
                true
            }
            None => false,
        }
    }
}

/// Color space a JPEG frame is written in; fixes the component count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JpegColorSpace {
    Grayscale,
    YCbCr,
    Cmyk,
}

impl JpegColorSpace {
    pub fn components(self) -> u8 {
        match self {
            JpegColorSpace::Grayscale => 1,
            JpegColorSpace::YCbCr => 3,
            JpegColorSpace::Cmyk => 4,
        }
    }
}

/// What the writer needs to know about an image to describe its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTypeDescriptor {
    pub width: u32,
    pub height: u32,
    pub color_space: JpegColorSpace,
}

impl ImageTypeDescriptor {
    /// Luma images are written as grayscale; everything else as YCbCr with
    /// any alpha channel dropped.
    pub fn from_image(image: &DynamicImage) -> Self {
        let color_space = match image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => JpegColorSpace::Grayscale,
            _ => JpegColorSpace::YCbCr,
        };
        Self {
            width: image.width(),
            height: image.height(),
            color_space,
        }
    }
}

/// Per-image metadata object of the JPEG writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegMetadata {
    root: MetadataNode,
}

impl JpegMetadata {
    /// The metadata the writer would produce on its own for `desc`: a
    /// baseline frame, luma sampled 2x2 in colour frames, everything else 1x1.
    pub fn default_for(desc: &ImageTypeDescriptor) -> Self {
        let components = desc.color_space.components();
        let tables = if components == 1 { 1 } else { 2 };

        let variety = MetadataNode::new("variety").with_child(
            MetadataNode::new("app0JFIF")
                .with_attribute("majorVersion", 1)
                .with_attribute("minorVersion", 2)
                .with_attribute("resUnits", 0)
                .with_attribute("Xdensity", 1)
                .with_attribute("Ydensity", 1),
        );

        let mut dqt = MetadataNode::new("dqt");
        for id in 0..tables {
            dqt.push_child(
                MetadataNode::new("dqtable")
                    .with_attribute("elementPrecision", 0)
                    .with_attribute("qtableId", id),
            );
        }

        let mut sof = MetadataNode::new("sof")
            .with_attribute("process", PROCESS_BASELINE)
            .with_attribute("samplePrecision", 8)
            .with_attribute("numLines", desc.height)
            .with_attribute("samplesPerLine", desc.width)
            .with_attribute("numFrameComponents", components);
        let mut sos = MetadataNode::new("sos").with_attribute("numScanComponents", components);

        for i in 0..components {
            let factor = if i == 0 && components > 1 { 2 } else { 1 };
            let table = if i == 0 { 0 } else { tables - 1 };
            sof.push_child(
                MetadataNode::new("componentSpec")
                    .with_attribute("componentId", i + 1)
                    .with_attribute("HsamplingFactor", factor)
                    .with_attribute("VsamplingFactor", factor)
                    .with_attribute("QtableSelector", table),
            );
            sos.push_child(
                MetadataNode::new("scanComponentSpec")
                    .with_attribute("componentSelector", i + 1)
                    .with_attribute("dcHuffTable", table)
                    .with_attribute("acHuffTable", table),
            );
        }

        let markers = MetadataNode::new(MARKER_SEQUENCE)
            .with_child(dqt)
            .with_child(sof)
            .with_child(sos);

        Self {
            root: MetadataNode::new(ROOT).with_child(variety).with_child(markers),
        }
    }

    /// Copy of the tree in the named format.
    pub fn as_tree(&self, format: &str) -> Result<MetadataNode> {
        check_format(format)?;
        Ok(self.root.clone())
    }

    /// Replaces the tree. The root must be a `jpeg_metadata` node.
    pub fn set_from_tree(&mut self, format: &str, tree: MetadataNode) -> Result<()> {
        check_format(format)?;
        if tree.name != ROOT {
            return Err(Error::invalid_param(format!(
                "metadata root must be {ROOT:?}, got {:?}",
                tree.name
            )));
        }
        self.root = tree;
        Ok(())
    }

    /// The first frame header in the marker sequence.
    pub fn frame(&self) -> Option<&MetadataNode> {
        self.root
            .child(MARKER_SEQUENCE)?
            .children
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case("sof"))
    }

    /// The first three-component frame header, the one subsampling applies to.
    pub fn color_frame(&self) -> Option<&MetadataNode> {
        self.root
            .child(MARKER_SEQUENCE)?
            .children
            .iter()
            .find(|n| is_color_frame(*n))
    }

    /// `(horizontal, vertical)` sampling factors of the first component of
    /// [`color_frame`](Self::color_frame). `None` for frames with another
    /// component count, whose sampling the writer fixes itself.
    pub fn luma_sampling(&self) -> Option<(u8, u8)> {
        let component = self.color_frame()?.children.first()?;
        let h = component.attribute("HsamplingFactor")?.parse().ok()?;
        let v = component.attribute("VsamplingFactor")?.parse().ok()?;
        Some((h, v))
    }

    pub fn is_progressive(&self) -> bool {
        self.frame()
            .and_then(|sof| sof.attribute("process"))
            .is_some_and(|p| p == PROCESS_PROGRESSIVE)
    }
}

fn check_format(format: &str) -> Result<()> {
    if format == NATIVE_FORMAT {
        Ok(())
    } else {
        Err(Error::invalid_param(format!(
            "unsupported metadata format {format:?} (expected {NATIVE_FORMAT:?})"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ycbcr(width: u32, height: u32) -> ImageTypeDescriptor {
        ImageTypeDescriptor {
            width,
            height,
            color_space: JpegColorSpace::YCbCr,
        }
    }

    #[test]
    fn default_tree_layout() {
        let meta = JpegMetadata::default_for(&ycbcr(64, 48));
        let tree = meta.as_tree(NATIVE_FORMAT).unwrap();
        assert_eq!(tree.name(), "jpeg_metadata");
        assert_eq!(tree.child_count(), 2);

        let markers = &tree.children()[1];
        let names: Vec<_> = markers.children().iter().map(|n| n.name()).collect();
        assert_eq!(names, ["dqt", "sof", "sos"]);

        let sof = meta.frame().unwrap();
        assert_eq!(sof.child_count(), 3);
        assert_eq!(sof.attribute("samplesPerLine"), Some("64"));
        assert_eq!(sof.attribute("numLines"), Some("48"));
        assert_eq!(meta.luma_sampling(), Some((2, 2)));
        assert!(!meta.is_progressive());
    }

    #[test]
    fn grayscale_frame_has_one_component() {
        let desc = ImageTypeDescriptor {
            width: 4,
            height: 4,
            color_space: JpegColorSpace::Grayscale,
        };
        let meta = JpegMetadata::default_for(&desc);
        assert_eq!(meta.frame().unwrap().child_count(), 1);
        assert!(meta.color_frame().is_none());
        assert_eq!(meta.luma_sampling(), None);
    }

    #[test]
    fn descriptor_from_image() {
        let gray = DynamicImage::new_luma8(3, 2);
        let rgba = DynamicImage::new_rgba8(3, 2);
        assert_eq!(
            ImageTypeDescriptor::from_image(&gray).color_space,
            JpegColorSpace::Grayscale
        );
        assert_eq!(
            ImageTypeDescriptor::from_image(&rgba).color_space,
            JpegColorSpace::YCbCr
        );
    }

    #[test]
    fn wrong_format_name_is_rejected() {
        let mut meta = JpegMetadata::default_for(&ycbcr(1, 1));
        assert!(meta.as_tree("javax_imageio_1.0").is_err());
        let tree = meta.as_tree(NATIVE_FORMAT).unwrap();
        assert!(meta.set_from_tree("other", tree).is_err());
        assert!(meta.set_from_tree(NATIVE_FORMAT, MetadataNode::new("root")).is_err());
    }

    #[test]
    fn sampling_is_read_from_the_color_frame() {
        let component = |f: u8| {
            MetadataNode::new("componentSpec")
                .with_attribute("HsamplingFactor", f)
                .with_attribute("VsamplingFactor", f)
        };
        let markers = MetadataNode::new(MARKER_SEQUENCE)
            .with_child(MetadataNode::new("sof").with_child(component(4)))
            .with_child(
                MetadataNode::new("sof")
                    .with_child(component(2))
                    .with_child(component(1))
                    .with_child(component(1)),
            );
        let mut meta = JpegMetadata::default_for(&ycbcr(8, 8));
        meta.set_from_tree(NATIVE_FORMAT, MetadataNode::new(ROOT).with_child(markers))
            .unwrap();

        assert_eq!(meta.frame().unwrap().child_count(), 1);
        assert_eq!(meta.color_frame().unwrap().child_count(), 3);
        assert_eq!(meta.luma_sampling(), Some((2, 2)));
    }

    #[test]
    fn set_attribute_only_overwrites_existing() {
        let mut node = MetadataNode::new("componentSpec").with_attribute("HsamplingFactor", 2);
        assert!(node.set_attribute("HsamplingFactor", "1".into()));
        assert!(!node.set_attribute("missing", "1".into()));
        assert_eq!(node.attribute("HsamplingFactor"), Some("1"));
        assert_eq!(node.attribute("missing"), None);
    }

    #[test]
    fn progressive_flag_reads_process() {
        let mut meta = JpegMetadata::default_for(&ycbcr(8, 8));
        let mut tree = meta.as_tree(NATIVE_FORMAT).unwrap();
        let sof = tree.children_mut()[1]
            .children_mut()
            .iter_mut()
            .find(|n| n.name() == "sof")
            .unwrap();
        assert!(sof.set_attribute("process", PROCESS_PROGRESSIVE.to_string()));
        meta.set_from_tree(NATIVE_FORMAT, tree).unwrap();
        assert!(meta.is_progressive());
    }
}
