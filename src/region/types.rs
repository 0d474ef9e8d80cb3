//! Region pipeline core types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::coords::{Point, ScaleFactors, Size};

// ============================================================
// Error Types
// ============================================================

/// Region pipeline error types
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid pixel buffer: {len} bytes for {width}x{height} RGBA")]
    InvalidBuffer { width: u32, height: u32, len: usize },

    #[error("Invalid regions: {0}")]
    InvalidRegions(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RegionError>;

// ============================================================
// Region Descriptor
// ============================================================

/// Region outline, in display pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionShape {
    /// Circle around the region center
    Circle { radius: f64 },
    /// Rectangle centered on the region center
    Rectangle { width: f64, height: f64 },
}

impl RegionShape {
    /// Bounding box size after scaling into another space.
    ///
    /// Circles scale by the uniform factor so they stay round.
    pub fn extent(&self, scale: ScaleFactors) -> Size {
        match *self {
            RegionShape::Circle { radius } => {
                let d = 2.0 * radius * scale.uniform();
                Size::new(d, d)
            }
            RegionShape::Rectangle { width, height } => {
                Size::new(width * scale.x, height * scale.y)
            }
        }
    }
}

/// What a region does to the pixels under it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegionEffect {
    /// StackBlur; `amount` is the radius in display pixels
    Blur { amount: f64 },
    /// Block average; `amount` is a blur-equivalent radius in display pixels
    Mosaic { amount: f64 },
    /// Zoomed view of the image under the region, framed by a border ring
    Magnify {
        zoom: f64,
        /// Black ring instead of white
        #[serde(default)]
        dark_border: bool,
    },
}

impl RegionEffect {
    pub fn name(&self) -> &'static str {
        match self {
            RegionEffect::Blur { .. } => "blur",
            RegionEffect::Mosaic { .. } => "mosaic",
            RegionEffect::Magnify { .. } => "magnify",
        }
    }
}

/// One annotation region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Center in display pixels
    pub center: Point,
    pub shape: RegionShape,
    pub effect: RegionEffect,
}

impl Region {
    pub fn new(center: Point, shape: RegionShape, effect: RegionEffect) -> Self {
        Self {
            center,
            shape,
            effect,
        }
    }

    pub fn circle(x: f64, y: f64, radius: f64, effect: RegionEffect) -> Self {
        Self::new(Point::new(x, y), RegionShape::Circle { radius }, effect)
    }

    pub fn rectangle(x: f64, y: f64, width: f64, height: f64, effect: RegionEffect) -> Self {
        Self::new(
            Point::new(x, y),
            RegionShape::Rectangle { width, height },
            effect,
        )
    }
}

// ============================================================
// Render Target
// ============================================================

/// Which canvas the regions are composited onto
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderTarget {
    /// On-screen canvas: display size × DPR
    Display { dpr: f64 },
    /// Export canvas: natural image size × DPR
    Export { dpr: f64 },
}

impl RenderTarget {
    /// Canvas size for a display and natural image size
    pub fn canvas_size(&self, display: Size, natural: Size) -> Size {
        match *self {
            RenderTarget::Display { dpr } => display.scaled(dpr),
            RenderTarget::Export { dpr } => natural.scaled(dpr),
        }
    }

    pub fn is_export(&self) -> bool {
        matches!(self, RenderTarget::Export { .. })
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        RenderTarget::Export {
            dpr: crate::coords::DEFAULT_EXPORT_DPR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_extent_is_uniform() {
        let shape = RegionShape::Circle { radius: 10.0 };
        assert_eq!(shape.extent(ScaleFactors::new(4.0, 2.0)), Size::new(40.0, 40.0));
    }

    #[test]
    fn test_rectangle_extent_per_axis() {
        let shape = RegionShape::Rectangle {
            width: 10.0,
            height: 5.0,
        };
        assert_eq!(shape.extent(ScaleFactors::new(4.0, 2.0)), Size::new(40.0, 10.0));
    }

    #[test]
    fn test_region_json_format() {
        let json = r#"[
            {"center": {"x": 10, "y": 20}, "shape": {"type": "circle", "radius": 5},
             "effect": {"type": "blur", "amount": 12}},
            {"center": {"x": 1.5, "y": 2}, "shape": {"type": "rectangle", "width": 4, "height": 3},
             "effect": {"type": "magnify", "zoom": 2}}
        ]"#;
        let regions: Vec<Region> = serde_json::from_str(json).unwrap();
        assert_eq!(
            regions[0],
            Region::circle(10.0, 20.0, 5.0, RegionEffect::Blur { amount: 12.0 })
        );
        assert_eq!(
            regions[1],
            Region::rectangle(
                1.5,
                2.0,
                4.0,
                3.0,
                RegionEffect::Magnify {
                    zoom: 2.0,
                    dark_border: false
                }
            )
        );
    }

    #[test]
    fn test_magnify_dark_border_json() {
        let region: Region = serde_json::from_str(
            r#"{"center": {"x": 0, "y": 0}, "shape": {"type": "circle", "radius": 5},
                "effect": {"type": "magnify", "zoom": 3, "dark_border": true}}"#,
        )
        .unwrap();
        assert_eq!(
            region.effect,
            RegionEffect::Magnify {
                zoom: 3.0,
                dark_border: true
            }
        );
    }

    #[test]
    fn test_canvas_size() {
        let display = Size::new(400.0, 300.0);
        let natural = Size::new(1600.0, 1200.0);
        assert_eq!(
            RenderTarget::Display { dpr: 1.5 }.canvas_size(display, natural),
            Size::new(600.0, 450.0)
        );
        assert_eq!(
            RenderTarget::Export { dpr: 2.0 }.canvas_size(display, natural),
            Size::new(3200.0, 2400.0)
        );
        assert!(RenderTarget::default().is_export());
    }

    #[test]
    fn test_effect_name() {
        assert_eq!(RegionEffect::Mosaic { amount: 1.0 }.name(), "mosaic");
    }

    #[test]
    fn test_invalid_buffer_message() {
        let err = RegionError::InvalidBuffer {
            width: 2,
            height: 2,
            len: 3,
        };
        assert_eq!(err.to_string(), "Invalid pixel buffer: 3 bytes for 2x2 RGBA");
    }
}
