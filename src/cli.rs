//! Command-line interface definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::blur::PixelRect;

/// Blur, pixelate or magnify regions of an image
#[derive(Debug, Parser)]
#[command(name = "region-blur", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Composite a list of regions onto an image
    Render(RenderArgs),
    /// Blur an image (or a rectangle of it) directly
    Blur(BlurArgs),
    /// Pixelate a whole image
    Mosaic(MosaicArgs),
    /// Show version, effective defaults and config locations
    Info,
}

/// Which canvas `render` produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TargetKind {
    /// Display size × DPR
    Display,
    /// Natural image size × DPR
    #[default]
    Export,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Source image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output image (format from extension)
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON file with the region list
    #[arg(short, long)]
    pub regions: PathBuf,

    /// Width of the display the regions were drawn on
    #[arg(long)]
    pub display_width: f64,

    /// Height of the display the regions were drawn on
    #[arg(long)]
    pub display_height: f64,

    /// Output canvas
    #[arg(long, value_enum, default_value_t = TargetKind::Export)]
    pub target: TargetKind,

    /// Device-pixel-ratio of the output canvas
    #[arg(long)]
    pub dpr: Option<f64>,

    /// Cap on the blur radius in output pixels
    #[arg(long)]
    pub max_radius: Option<u32>,

    /// Config file (defaults to the standard lookup)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BlurArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    /// Blur radius in pixels (1-254; larger values are clamped)
    #[arg(short, long)]
    pub radius: f64,

    /// Only blur this rectangle: X,Y,WIDTH,HEIGHT
    #[arg(long, value_parser = parse_rect)]
    pub rect: Option<PixelRect>,
}

#[derive(Debug, Args)]
pub struct MosaicArgs {
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    /// Block size in pixels
    #[arg(short, long)]
    pub block: u32,
}

/// Parse `X,Y,WIDTH,HEIGHT`
pub fn parse_rect(value: &str) -> Result<PixelRect, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected X,Y,WIDTH,HEIGHT, got '{value}'"));
    }
    let mut nums = [0u32; 4];
    for (slot, part) in nums.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid number '{part}': {e}"))?;
    }
    Ok(PixelRect::new(nums[0], nums[1], nums[2], nums[3]))
}
