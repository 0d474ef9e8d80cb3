//! Region pipeline
//!
//! Applies blur, mosaic and magnifier regions to an image, on either the
//! on-screen canvas or a higher-resolution export canvas.
//!
//! # Pipeline
//!
//! 1. Map the region from display pixels into target and image pixels
//! 2. Clip its bounding box to the target canvas
//! 3. Size a padding margin of twice the blur radius on every side
//! 4. Extract the padded source rectangle with edge extension
//! 5. Run the blur kernel or the mosaic reducer over the padded buffer
//! 6. Composite the interior through a circle or rounded-rectangle clip
//! 7. Stroke a border ring around magnifiers
//!
//! # Example
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use region_blur::{Region, RegionEffect, RegionRenderer, RenderOptions, RenderTarget, Size};
//!
//! let image = RgbaImage::from_pixel(200, 100, Rgba([40, 80, 120, 255]));
//! let regions = [Region::circle(50.0, 25.0, 10.0, RegionEffect::Blur { amount: 6.0 })];
//!
//! let renderer = RegionRenderer::new(RenderOptions::default());
//! let export = renderer.render(
//!     &image,
//!     Size::new(100.0, 50.0),
//!     RenderTarget::Export { dpr: 2.0 },
//!     &regions,
//! );
//! assert_eq!(export.dimensions(), (400, 200));
//! ```

mod border;
mod io;
mod render;
mod types;

// Re-export public API
pub use border::Border;
pub use io::{load_regions, load_rgba, parse_regions, rgba_from_raw, save_rgba};
pub use render::{composite, Clip, ProcessedRegion, RegionRenderer};
pub use types::{Region, RegionEffect, RegionError, RegionShape, RenderTarget, Result};

use crate::blur::MAX_BLUR_RADIUS;

// ============================================================
// Constants
// ============================================================

/// Default rounded-rectangle corner radius, in display pixels
const DEFAULT_CORNER_RADIUS: f64 = 8.0;

/// Smallest mosaic block on the display canvas
const DEFAULT_DISPLAY_MOSAIC_MIN_BLOCK: u32 = 8;

/// Smallest mosaic block on the export canvas
const DEFAULT_EXPORT_MOSAIC_MIN_BLOCK: u32 = 4;

/// Largest accepted corner radius
const MAX_CORNER_RADIUS: f64 = 1024.0;

// ============================================================
// Options
// ============================================================

/// Region rendering options
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Upper bound on the blur radius in target pixels (1..=254)
    pub max_blur_radius: u32,
    /// Rounded-rectangle corner radius in display pixels
    pub corner_radius: f64,
    /// Mosaic block floor on the display canvas
    pub display_mosaic_min_block: u32,
    /// Mosaic block floor on the export canvas
    pub export_mosaic_min_block: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_blur_radius: MAX_BLUR_RADIUS,
            corner_radius: DEFAULT_CORNER_RADIUS,
            display_mosaic_min_block: DEFAULT_DISPLAY_MOSAIC_MIN_BLOCK,
            export_mosaic_min_block: DEFAULT_EXPORT_MOSAIC_MIN_BLOCK,
        }
    }
}

impl RenderOptions {
    /// Create a new options builder
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder::default()
    }

    /// Lower radius cap for live previews during interaction
    pub fn preview() -> Self {
        Self {
            max_blur_radius: 40,
            ..Default::default()
        }
    }

    /// Mosaic block size for a radius: half the radius, floored per target
    pub fn mosaic_block(&self, radius: u32, export: bool) -> u32 {
        let floor = if export {
            self.export_mosaic_min_block
        } else {
            self.display_mosaic_min_block
        };
        (radius / 2).max(floor).max(1)
    }
}

/// Builder for RenderOptions
#[derive(Debug, Default)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    /// Set the blur radius cap (clamped to 1..=254)
    #[must_use]
    pub fn max_blur_radius(mut self, radius: u32) -> Self {
        self.options.max_blur_radius = radius.clamp(1, MAX_BLUR_RADIUS);
        self
    }

    /// Set the corner radius in display pixels
    #[must_use]
    pub fn corner_radius(mut self, radius: f64) -> Self {
        self.options.corner_radius = if radius.is_finite() {
            radius.clamp(0.0, MAX_CORNER_RADIUS)
        } else {
            0.0
        };
        self
    }

    /// Set the display mosaic block floor
    #[must_use]
    pub fn display_mosaic_min_block(mut self, block: u32) -> Self {
        self.options.display_mosaic_min_block = block.max(1);
        self
    }

    /// Set the export mosaic block floor
    #[must_use]
    pub fn export_mosaic_min_block(mut self, block: u32) -> Self {
        self.options.export_mosaic_min_block = block.max(1);
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> RenderOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_default() {
        let opts = RenderOptions::default();
        assert_eq!(opts.max_blur_radius, 254);
        assert_eq!(opts.corner_radius, 8.0);
        assert_eq!(opts.display_mosaic_min_block, 8);
        assert_eq!(opts.export_mosaic_min_block, 4);
    }

    #[test]
    fn test_render_options_builder_clamps() {
        let opts = RenderOptions::builder()
            .max_blur_radius(1000)
            .corner_radius(-5.0)
            .display_mosaic_min_block(0)
            .export_mosaic_min_block(6)
            .build();
        assert_eq!(opts.max_blur_radius, 254);
        assert_eq!(opts.corner_radius, 0.0);
        assert_eq!(opts.display_mosaic_min_block, 1);
        assert_eq!(opts.export_mosaic_min_block, 6);

        let opts = RenderOptions::builder().max_blur_radius(0).build();
        assert_eq!(opts.max_blur_radius, 1);
    }

    #[test]
    fn test_render_options_preview() {
        let opts = RenderOptions::preview();
        assert_eq!(opts.max_blur_radius, 40);
        assert_eq!(opts.corner_radius, 8.0);
    }

    #[test]
    fn test_mosaic_block() {
        let opts = RenderOptions::default();
        assert_eq!(opts.mosaic_block(40, false), 20);
        assert_eq!(opts.mosaic_block(6, false), 8);
        assert_eq!(opts.mosaic_block(6, true), 4);
        assert_eq!(opts.mosaic_block(0, true), 4);
    }
}
