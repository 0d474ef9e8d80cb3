//! Common types for the blur module

// ============================================================
// Constants
// ============================================================

/// Largest supported blur radius (bounded by the lookup tables)
pub const MAX_BLUR_RADIUS: u32 = 254;

/// Smallest radius that changes anything
pub const MIN_BLUR_RADIUS: u32 = 1;

// ============================================================
// Blur Radius
// ============================================================

/// A validated blur radius in `1..=MAX_BLUR_RADIUS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlurRadius(u32);

impl BlurRadius {
    /// Build from an integer radius, clamping to the maximum.
    ///
    /// Returns `None` for zero.
    pub fn new(radius: u32) -> Option<Self> {
        if radius < MIN_BLUR_RADIUS {
            return None;
        }
        Some(Self(radius.min(MAX_BLUR_RADIUS)))
    }

    /// Build from a floating point radius.
    ///
    /// NaN and values that round below 1 yield `None`; everything else is
    /// rounded and clamped, so `+inf` becomes the maximum radius.
    pub fn from_f64(radius: f64) -> Option<Self> {
        if radius.is_nan() {
            return None;
        }
        let rounded = radius.round();
        if rounded < MIN_BLUR_RADIUS as f64 {
            return None;
        }
        if rounded >= MAX_BLUR_RADIUS as f64 {
            return Some(Self(MAX_BLUR_RADIUS));
        }
        Some(Self(rounded as u32))
    }

    /// Same as [`BlurRadius::from_f64`] with a lower cap.
    pub fn from_f64_capped(radius: f64, cap: u32) -> Option<Self> {
        let radius = Self::from_f64(radius)?;
        Self::new(radius.0.min(cap))
    }

    /// Radius in pixels
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    /// Window length `2r + 1`
    #[inline]
    pub fn window(self) -> usize {
        self.0 as usize * 2 + 1
    }
}

// ============================================================
// Pixel Rectangle
// ============================================================

/// Integer sub-rectangle of a pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width x height` buffer
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    /// Intersect with a `width x height` buffer.
    ///
    /// Returns `None` when nothing of the rectangle lies inside.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let right = self.right().min(width as u64) as u32;
        let bottom = self.bottom().min(height as u64) as u32;
        let clipped = Self::new(self.x, self.y, right - self.x, bottom - self.y);
        (!clipped.is_empty()).then_some(clipped)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && (x as u64) < self.right() && y >= self.y && (y as u64) < self.bottom()
    }
}
