//! Coordinate mapping between display, image and export pixel spaces
//!
//! - **Display**: the on-screen canvas, where regions are defined
//! - **Image**: the source image's natural pixels
//! - **Export**: natural pixels times an export device-pixel-ratio
//!
//! Every conversion is `value * (target size / source size)`, with X and Y
//! scaled independently. Lengths that must stay isotropic (radii, blur
//! amounts, corner radii) use the smaller of the two factors.

use serde::{Deserialize, Serialize};

/// Default export device-pixel-ratio
pub const DEFAULT_EXPORT_DPR: f64 = 2.0;

// ============================================================
// Primitives
// ============================================================

/// Point in some pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size in some pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of an image-crate buffer
    pub fn of_dimensions((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// True when either side is zero, negative or not finite
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }

    /// Multiply both sides by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    /// Whole-pixel dimensions, rounded up and saturating at zero
    pub fn ceil_dimensions(&self) -> (u32, u32) {
        let side = |v: f64| if v.is_finite() && v > 0.0 { v.ceil() as u32 } else { 0 };
        (side(self.width), side(self.height))
    }
}

// ============================================================
// Scale Factors
// ============================================================

/// Independent X/Y scale from one space to another
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Factors mapping `from` onto `to`.
    ///
    /// A degenerate `from` (zero, negative or non-finite side) yields
    /// `(0, 0)` instead of dividing by zero.
    pub fn between(from: Size, to: Size) -> Self {
        if from.is_degenerate() || !to.width.is_finite() || !to.height.is_finite() {
            return Self::default();
        }
        Self::new(to.width / from.width, to.height / from.height)
    }

    /// Smaller of the two factors, for lengths that must not stretch
    pub fn uniform(&self) -> f64 {
        self.x.min(self.y)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.x > 0.0 && self.y > 0.0)
    }

    pub fn point(&self, p: Point) -> Point {
        Point::new(p.x * self.x, p.y * self.y)
    }

    pub fn size(&self, s: Size) -> Size {
        Size::new(s.width * self.x, s.height * self.y)
    }

    /// Scale an isotropic length
    pub fn length(&self, len: f64) -> f64 {
        len * self.uniform()
    }

    /// Compose: first `self`, then `next`
    pub fn then(&self, next: ScaleFactors) -> Self {
        Self::new(self.x * next.x, self.y * next.y)
    }
}

// ============================================================
// Mapper
// ============================================================

/// Converts between display, image and export spaces.
///
/// Holds no state beyond its inputs; rebuild it whenever the display size
/// or the loaded image changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    display: Size,
    natural: Size,
    export_dpr: f64,
}

impl CoordinateMapper {
    pub fn new(display: Size, natural: Size, export_dpr: f64) -> Self {
        Self {
            display,
            natural,
            export_dpr,
        }
    }

    /// Mapper with the default export DPR of 2
    pub fn with_default_dpr(display: Size, natural: Size) -> Self {
        Self::new(display, natural, DEFAULT_EXPORT_DPR)
    }

    pub fn display_size(&self) -> Size {
        self.display
    }

    pub fn natural_size(&self) -> Size {
        self.natural
    }

    pub fn export_dpr(&self) -> f64 {
        self.export_dpr
    }

    /// Export canvas size (natural × DPR)
    pub fn export_size(&self) -> Size {
        self.natural.scaled(self.export_dpr)
    }

    /// Display → image (natural / display)
    pub fn display_to_image(&self) -> ScaleFactors {
        ScaleFactors::between(self.display, self.natural)
    }

    /// Image → display (display / natural)
    pub fn image_to_display(&self) -> ScaleFactors {
        ScaleFactors::between(self.natural, self.display)
    }

    /// Image → export (DPR on both axes)
    pub fn image_to_export(&self) -> ScaleFactors {
        ScaleFactors::between(self.natural, self.export_size())
    }

    /// Display → export
    pub fn display_to_export(&self) -> ScaleFactors {
        ScaleFactors::between(self.display, self.export_size())
    }

    pub fn point_to_image(&self, p: Point) -> Point {
        self.display_to_image().point(p)
    }

    pub fn point_to_display(&self, p: Point) -> Point {
        self.image_to_display().point(p)
    }

    pub fn point_to_export(&self, p: Point) -> Point {
        self.display_to_export().point(p)
    }

    pub fn size_to_image(&self, s: Size) -> Size {
        self.display_to_image().size(s)
    }

    pub fn size_to_export(&self, s: Size) -> Size {
        self.display_to_export().size(s)
    }

    /// Display-space isotropic length in image pixels
    pub fn length_to_image(&self, len: f64) -> f64 {
        self.display_to_image().length(len)
    }

    /// Display-space isotropic length in export pixels
    pub fn length_to_export(&self, len: f64) -> f64 {
        self.display_to_export().length(len)
    }
}
