use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::ValueHint};
use rasterkit::{FlipDirection, ResizeMethod, Subsampling};

/// Command-line arguments for rasterkit.
#[derive(Parser, Debug)]
#[command(
    name = "rasterkit",
    about = "Convert, inspect and generate raster images.",
    author,
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load an image, transform it and save it in the format of the output extension
    Convert(ConvertArgs),
    /// Print dimensions, color type and JPEG frame details
    Info(InfoArgs),
    /// Render a two-color horizontal gradient
    Gradient(GradientArgs),
    /// Show an image in a window (Escape closes it; needs the `viewer` feature)
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source image
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output path; the extension picks the format (defaults to <stem>-converted.<ext>)
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Target width; height follows the aspect ratio unless given
    #[arg(long, short = 'W', value_parser = clap::value_parser!(u32).range(1..))]
    pub width: Option<u32>,

    /// Target height; with no width the width follows the aspect ratio
    #[arg(long, short = 'H', value_parser = clap::value_parser!(u32).range(1..))]
    pub height: Option<u32>,

    /// Resampling filter
    #[arg(long, value_enum, default_value_t = Method::CatmullRom)]
    pub filter: Method,

    /// Clockwise rotation in degrees (multiple of 90)
    #[arg(long, allow_negative_numbers = true)]
    pub rotate: Option<i32>,

    /// Mirror the image: h(orizontal) or v(ertical)
    #[arg(long, value_parser = parse_flip)]
    pub flip: Option<FlipDirection>,

    /// Gaussian blur sigma
    #[arg(long, value_name = "SIGMA")]
    pub blur: Option<f32>,

    /// Apply a 3x3 sharpen kernel
    #[arg(long)]
    pub sharpen: bool,

    /// Convert to grayscale
    #[arg(long)]
    pub grayscale: bool,

    /// Compression quality (0.0-1.0)
    #[arg(long, short = 'q', default_value_t = 0.8)]
    pub quality: f32,

    /// Force progressive JPEG scans
    #[arg(long, conflicts_with = "baseline")]
    pub progressive: bool,

    /// Force baseline JPEG scans
    #[arg(long)]
    pub baseline: bool,

    /// JPEG chroma subsampling (4:4:4, 4:2:2, 4:2:0, 4:1:1)
    #[arg(long, short = 's', default_value = "4:4:4", value_parser = parse_subsampling)]
    pub subsampling: Subsampling,
}

impl ConvertArgs {
    pub fn progressive_override(&self) -> Option<bool> {
        match (self.progressive, self.baseline) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,
}

#[derive(Args, Debug)]
pub struct GradientArgs {
    /// Output path; the extension picks the format
    #[arg(long, short = 'o', value_hint = ValueHint::FilePath, value_name = "FILE")]
    pub out: PathBuf,

    #[arg(
        long,
        short = 'W',
        default_value_t = 256,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub width: u32,

    #[arg(
        long,
        short = 'H',
        default_value_t = 64,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub height: u32,

    /// Left color as RRGGBB or RRGGBBAA
    #[arg(long, default_value = "000000")]
    pub from: String,

    /// Right color as RRGGBB or RRGGBBAA
    #[arg(long, default_value = "ffffff")]
    pub to: String,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Display scale factor
    #[arg(long, short = 'z', default_value_t = 1.0)]
    pub zoom: f32,

    /// Window title (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Method {
    Nearest,
    Bilinear,
    CatmullRom,
    Mitchell,
    Lanczos3,
}

impl From<Method> for ResizeMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Nearest => ResizeMethod::Nearest,
            Method::Bilinear => ResizeMethod::Bilinear,
            Method::CatmullRom => ResizeMethod::CatmullRom,
            Method::Mitchell => ResizeMethod::Mitchell,
            Method::Lanczos3 => ResizeMethod::Lanczos3,
        }
    }
}

fn parse_flip(s: &str) -> Result<FlipDirection, String> {
    s.parse().map_err(|e: rasterkit::Error| e.to_string())
}

fn parse_subsampling(s: &str) -> Result<Subsampling, String> {
    s.parse().map_err(|e: rasterkit::Error| e.to_string())
}
