//! Edge-extending region extraction
//!
//! Paints a destination buffer from a source rectangle that may hang off
//! the image. The part inside the image is resampled to the destination
//! size; every margin that fell outside is filled by stretching the nearest
//! drawn row or column, so a blur run afterwards never pulls in black or
//! transparent pixels.

use image::{GenericImageView, Rgba, RgbaImage};
use tracing::{debug, trace};

use crate::blur::PixelRect;

const CHANNELS: usize = 4;

// ============================================================
// Types
// ============================================================

/// Rectangle in source-image pixels; may extend past the image bounds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn is_usable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Intersection with a `width x height` image, `None` when empty
    pub fn intersect(&self, width: u32, height: u32) -> Option<Self> {
        let left = self.x.max(0.0);
        let top = self.y.max(0.0);
        let right = self.right().min(width as f64);
        let bottom = self.bottom().min(height as f64);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(left, top, right - left, bottom - top))
    }
}

/// What [`extract_with_edge_extension`] actually sampled from the image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRegion {
    /// Part of the requested rectangle inside the image
    pub source: SourceRect,
    /// Where that part landed in the destination
    pub dest: PixelRect,
}

// ============================================================
// Extraction
// ============================================================

/// Paint `dest` with `src` of `source`, stretching edges into the margins
/// that lie outside the image.
///
/// X and Y are scaled independently by `dest size / src size`. Returns
/// `None` and leaves `dest` untouched when nothing of `src` overlaps the
/// image, when `src` has no area, or when `dest` is empty.
pub fn extract_with_edge_extension<I>(
    dest: &mut RgbaImage,
    source: &I,
    src: SourceRect,
) -> Option<ValidRegion>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    let (dest_w, dest_h) = dest.dimensions();
    if dest_w == 0 || dest_h == 0 || !src.is_usable() {
        trace!(?src, dest_w, dest_h, "extract skipped: degenerate geometry");
        return None;
    }

    let (img_w, img_h) = source.dimensions();
    let Some(valid) = src.intersect(img_w, img_h) else {
        trace!(?src, img_w, img_h, "extract skipped: rectangle outside image");
        return None;
    };

    let scale_x = dest_w as f64 / src.width;
    let scale_y = dest_h as f64 / src.height;

    let (x0, x1) = dest_span((valid.x - src.x) * scale_x, valid.width * scale_x, dest_w);
    let (y0, y1) = dest_span((valid.y - src.y) * scale_y, valid.height * scale_y, dest_h);
    let mapped = PixelRect::new(x0, y0, x1 - x0, y1 - y0);

    debug!(?src, ?valid, ?mapped, dest_w, dest_h, "extract with edge extension");

    let sampler = Sampler::new(source, &valid);
    for dy in y0..y1 {
        let sy = src.y + (dy as f64 + 0.5) / scale_y - 0.5;
        for dx in x0..x1 {
            let sx = src.x + (dx as f64 + 0.5) / scale_x - 0.5;
            dest.put_pixel(dx, dy, sampler.bilinear(sx, sy));
        }
    }

    // Left and right over the drawn rows, then top and bottom over the full
    // width so the corners pick up the already-stretched columns.
    if src.x < 0.0 && x0 > 0 {
        stretch_column(dest, x0, 0..x0, y0..y1);
    }
    if src.right() > img_w as f64 && x1 < dest_w {
        stretch_column(dest, x1 - 1, x1..dest_w, y0..y1);
    }
    if src.y < 0.0 && y0 > 0 {
        stretch_row(dest, y0, 0..y0);
    }
    if src.bottom() > img_h as f64 && y1 < dest_h {
        stretch_row(dest, y1 - 1, y1..dest_h);
    }

    Some(ValidRegion {
        source: valid,
        dest: mapped,
    })
}

/// Round a float span into `[0, limit]`, keeping at least one pixel
fn dest_span(start: f64, len: f64, limit: u32) -> (u32, u32) {
    let clamp = |v: f64| v.round().clamp(0.0, limit as f64) as u32;
    let mut lo = clamp(start);
    let mut hi = clamp(start + len);
    if hi <= lo {
        lo = lo.min(limit - 1);
        hi = lo + 1;
    }
    (lo, hi)
}

fn stretch_column(
    dest: &mut RgbaImage,
    from_x: u32,
    to: std::ops::Range<u32>,
    rows: std::ops::Range<u32>,
) {
    for y in rows {
        let px = *dest.get_pixel(from_x, y);
        for x in to.clone() {
            dest.put_pixel(x, y, px);
        }
    }
}

fn stretch_row(dest: &mut RgbaImage, from_y: u32, to: std::ops::Range<u32>) {
    let stride = dest.width() as usize * CHANNELS;
    let src_start = from_y as usize * stride;
    let buf: &mut [u8] = &mut **dest;
    for y in to {
        buf.copy_within(src_start..src_start + stride, y as usize * stride);
    }
}

// ============================================================
// Sampling
// ============================================================

/// Bilinear sampler confined to the valid pixel range of the source
struct Sampler<'a, I> {
    image: &'a I,
    min_x: i64,
    max_x: i64,
    min_y: i64,
    max_y: i64,
}

impl<'a, I> Sampler<'a, I>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    fn new(image: &'a I, valid: &SourceRect) -> Self {
        let (w, h) = image.dimensions();
        let bound = |lo: f64, hi: f64, size: u32| {
            let min = (lo.floor() as i64).clamp(0, size as i64 - 1);
            let max = ((hi.ceil() as i64) - 1).clamp(min, size as i64 - 1);
            (min, max)
        };
        let (min_x, max_x) = bound(valid.x, valid.right(), w);
        let (min_y, max_y) = bound(valid.y, valid.bottom(), h);
        Self {
            image,
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    #[inline]
    fn texel(&self, x: i64, y: i64) -> [f32; 4] {
        let x = x.clamp(self.min_x, self.max_x) as u32;
        let y = y.clamp(self.min_y, self.max_y) as u32;
        let p = self.image.get_pixel(x, y).0;
        [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
    }

    fn bilinear(&self, x: f64, y: f64) -> Rgba<u8> {
        let x = x.clamp(self.min_x as f64, self.max_x as f64);
        let y = y.clamp(self.min_y as f64, self.max_y as f64);
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let fx = (x - x0 as f64) as f32;
        let fy = (y - y0 as f64) as f32;

        let p00 = self.texel(x0, y0);
        let p10 = self.texel(x0 + 1, y0);
        let p01 = self.texel(x0, y0 + 1);
        let p11 = self.texel(x0 + 1, y0 + 1);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let v = p00[c] * (1.0 - fx) * (1.0 - fy)
                + p10[c] * fx * (1.0 - fy)
                + p01[c] * (1.0 - fx) * fy
                + p11[c] * fx * fy;
            out[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(out)
    }
}

// ============================================================
// Tests
// ============================================================
