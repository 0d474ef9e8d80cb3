//! region-blur - StackBlur, mosaic and edge-extending region extraction
//!
//! Degrade (blur or pixelate) or magnify regions of an RGBA image, on a
//! downscaled display canvas or a full-resolution export canvas.
//!
//! # Modules
//!
//! - [`blur`] - StackBlur kernel and its fixed-point lookup tables
//! - [`extract`] - Edge-extending region extraction
//! - [`mosaic`] - Block-average pixelation
//! - [`coords`] - Display / image / export coordinate mapping
//! - [`region`] - Region descriptors, rendering and compositing
//! - [`config`] - TOML configuration
//! - [`cli`] - Command-line definitions
//!
//! # Example
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use region_blur::{extract_with_edge_extension, mosaic, stack_blur, PixelRect, SourceRect};
//!
//! let source = RgbaImage::from_pixel(64, 64, Rgba([200, 50, 50, 255]));
//!
//! // Padded buffer around the top-left corner; the margin outside the image
//! // repeats the edge pixels.
//! let mut padded = RgbaImage::new(48, 48);
//! extract_with_edge_extension(&mut padded, &source, SourceRect::new(-16.0, -16.0, 48.0, 48.0));
//!
//! stack_blur(&mut padded, PixelRect::full(48, 48), 8.0);
//! assert_eq!(*padded.get_pixel(0, 0), Rgba([200, 50, 50, 255]));
//!
//! mosaic(&mut padded, 8);
//! ```

pub mod blur;
pub mod cli;
pub mod config;
pub mod coords;
pub mod extract;
pub mod mosaic;
pub mod region;

// Blur kernel
pub use blur::{
    stack_blur, stack_blur_rgba, BlurKernel, BlurRadius, PixelRect, StackBlur, MAX_BLUR_RADIUS,
};

// Extraction, mosaic, coordinates
pub use coords::{CoordinateMapper, Point, ScaleFactors, Size, DEFAULT_EXPORT_DPR};
pub use extract::{extract_with_edge_extension, SourceRect, ValidRegion};
pub use mosaic::{mosaic, mosaic_rgba};

// Region pipeline
pub use region::{
    composite, load_regions, load_rgba, parse_regions, rgba_from_raw, save_rgba, Border, Clip,
    ProcessedRegion, Region, RegionEffect, RegionError, RegionRenderer, RegionShape,
    RenderOptions, RenderTarget,
};

// Config & CLI
pub use cli::{BlurArgs, Cli, Commands, MosaicArgs, RenderArgs, TargetKind};
pub use config::{CliOverrides, Config, ConfigError};

/// Process exit codes
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Unspecified failure
    pub const GENERAL_ERROR: i32 = 1;
    /// Bad arguments or config
    pub const INVALID_ARGS: i32 = 2;
    /// Input file missing
    pub const INPUT_NOT_FOUND: i32 = 3;
}
