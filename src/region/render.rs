//! Region rendering and compositing
//!
//! For each region: map its outline from display space into the target
//! canvas and the source image, clip it to the canvas, extract the visible
//! part plus a padding margin with edge extension, run the effect over it,
//! then composite the unpadded interior through a clip matching the
//! region's shape. Magnifiers get a border ring on top.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use super::border::{draw_border, Border};
use super::types::{Region, RegionEffect, RegionShape, RenderTarget};
use super::RenderOptions;
use crate::blur::{BlurKernel, BlurRadius, PixelRect, StackBlur};
use crate::coords::{Point, ScaleFactors, Size};
use crate::extract::{extract_with_edge_extension, SourceRect};
use crate::mosaic::mosaic;

/// Padding on each side, in multiples of the blur radius
const PADDING_PER_RADIUS: u32 = 2;

// ============================================================
// Types
// ============================================================

/// A region's processed pixels, ready to composite
#[derive(Debug, Clone)]
pub struct ProcessedRegion {
    /// Padded buffer the effect ran on
    pub buffer: RgbaImage,
    /// Effect padding (twice the blur radius), in target pixels
    pub padding: u32,
    /// Visible part of the region's bounding box on the target canvas
    pub window: PixelRect,
    /// Position of `window`'s top-left pixel inside `buffer`
    pub inset: (u32, u32),
    /// Top-left of the region's full bounding box on the target canvas
    pub origin: Point,
    /// Full bounding box size on the target canvas
    pub extent: Size,
    /// Outline in target space
    pub clip: Clip,
    /// Ring drawn around the outline after compositing
    pub border: Option<Border>,
}

impl ProcessedRegion {
    /// Visible interior size in whole pixels
    pub fn interior(&self) -> (u32, u32) {
        (self.window.width, self.window.height)
    }
}

/// Clip outline in target pixels, relative to the bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Clip {
    Ellipse,
    RoundedRect { corner_radius: f64 },
}

impl Clip {
    /// Whether a point (relative to the box's top-left) lies inside
    pub fn contains(&self, extent: Size, x: f64, y: f64) -> bool {
        let (w, h) = (extent.width, extent.height);
        if x < 0.0 || y < 0.0 || x > w || y > h {
            return false;
        }
        match *self {
            Clip::Ellipse => {
                let (rx, ry) = (w / 2.0, h / 2.0);
                let dx = (x - rx) / rx;
                let dy = (y - ry) / ry;
                dx * dx + dy * dy <= 1.0
            }
            Clip::RoundedRect { corner_radius } => {
                let r = corner_radius.clamp(0.0, w.min(h) / 2.0);
                let qx = x.clamp(r, w - r);
                let qy = y.clamp(r, h - r);
                let (dx, dy) = (x - qx, y - qy);
                dx * dx + dy * dy <= r * r
            }
        }
    }

    /// Distance from a point to the outline: negative inside, positive outside.
    ///
    /// Exact for circles and rounded rectangles; ellipses with unequal
    /// axes use the radial approximation.
    pub fn signed_distance(&self, extent: Size, x: f64, y: f64) -> f64 {
        let (hw, hh) = (extent.width / 2.0, extent.height / 2.0);
        let (dx, dy) = (x - hw, y - hh);
        match *self {
            Clip::Ellipse => {
                if hw == hh {
                    return dx.hypot(dy) - hw;
                }
                let k = (dx / hw).hypot(dy / hh);
                (k - 1.0) * hw.min(hh)
            }
            Clip::RoundedRect { corner_radius } => {
                let r = corner_radius.clamp(0.0, hw.min(hh));
                let qx = dx.abs() - (hw - r);
                let qy = dy.abs() - (hh - r);
                let outside = qx.max(0.0).hypot(qy.max(0.0));
                let inside = qx.max(qy).min(0.0);
                outside + inside - r
            }
        }
    }
}

/// Scale factors and canvas shared by every region of one render call
#[derive(Debug, Clone, Copy)]
struct Geometry {
    to_image: ScaleFactors,
    to_target: ScaleFactors,
    canvas: (u32, u32),
    export: bool,
}

impl Geometry {
    fn new(display_size: Size, natural: Size, canvas: (u32, u32), export: bool) -> Self {
        Self {
            to_image: ScaleFactors::between(display_size, natural),
            to_target: ScaleFactors::between(
                display_size,
                Size::new(canvas.0 as f64, canvas.1 as f64),
            ),
            canvas,
            export,
        }
    }
}

/// Part of the float rectangle `(x, y, width, height)` inside a canvas
pub(super) fn canvas_window(
    (canvas_w, canvas_h): (u32, u32),
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Option<PixelRect> {
    if !(x.is_finite() && y.is_finite() && width.is_finite() && height.is_finite()) {
        return None;
    }
    let x0 = x.floor().clamp(0.0, canvas_w as f64) as u32;
    let y0 = y.floor().clamp(0.0, canvas_h as f64) as u32;
    let x1 = (x + width).ceil().clamp(0.0, canvas_w as f64) as u32;
    let y1 = (y + height).ceil().clamp(0.0, canvas_h as f64) as u32;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
}

// ============================================================
// Renderer
// ============================================================

/// Renders regions onto a display or export canvas
#[derive(Debug, Clone, Default)]
pub struct RegionRenderer<K = StackBlur> {
    options: RenderOptions,
    kernel: K,
}

impl RegionRenderer<StackBlur> {
    pub fn new(options: RenderOptions) -> Self {
        Self::with_kernel(options, StackBlur)
    }
}

impl<K: BlurKernel> RegionRenderer<K> {
    pub fn with_kernel(options: RenderOptions, kernel: K) -> Self {
        Self { options, kernel }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Draw `source` at the target's canvas size and composite every region.
    ///
    /// `display_size` is the size regions were defined against. A degenerate
    /// display size leaves the base canvas without regions.
    pub fn render(
        &self,
        source: &RgbaImage,
        display_size: Size,
        target: RenderTarget,
        regions: &[Region],
    ) -> RgbaImage {
        let natural = Size::of_dimensions(source.dimensions());
        let (canvas_w, canvas_h) = target.canvas_size(display_size, natural).ceil_dimensions();
        if canvas_w == 0 || canvas_h == 0 {
            debug!(canvas = ?target, ?display_size, "render skipped: empty canvas");
            return RgbaImage::new(canvas_w, canvas_h);
        }

        let mut canvas = if source.dimensions() == (canvas_w, canvas_h) {
            source.clone()
        } else {
            imageops::resize(source, canvas_w, canvas_h, FilterType::Triangle)
        };

        if display_size.is_degenerate() {
            debug!(?display_size, "regions skipped: display size is degenerate");
            return canvas;
        }

        let geometry = Geometry::new(
            display_size,
            natural,
            (canvas_w, canvas_h),
            target.is_export(),
        );
        for region in regions {
            if let Some(processed) = self.process(source, region, geometry) {
                composite(&mut canvas, &processed);
            }
        }

        canvas
    }

    /// Process one region for the given target without compositing it.
    pub fn process_region(
        &self,
        source: &RgbaImage,
        display_size: Size,
        target: RenderTarget,
        region: &Region,
    ) -> Option<ProcessedRegion> {
        let natural = Size::of_dimensions(source.dimensions());
        let canvas = target.canvas_size(display_size, natural).ceil_dimensions();
        let geometry = Geometry::new(display_size, natural, canvas, target.is_export());
        self.process(source, region, geometry)
    }

    fn process(
        &self,
        source: &RgbaImage,
        region: &Region,
        geometry: Geometry,
    ) -> Option<ProcessedRegion> {
        if geometry.to_image.is_degenerate() || geometry.to_target.is_degenerate() {
            return None;
        }

        let extent = region.shape.extent(geometry.to_target);
        if extent.is_degenerate() {
            debug!(?region, "region skipped: empty on target");
            return None;
        }

        let image_extent = region.shape.extent(geometry.to_image);
        let image_center = geometry.to_image.point(region.center);
        let target_center = geometry.to_target.point(region.center);
        let origin = Point::new(
            target_center.x - extent.width / 2.0,
            target_center.y - extent.height / 2.0,
        );
        let (left, top) = (origin.x.round(), origin.y.round());
        let Some(window) = canvas_window(
            geometry.canvas,
            left,
            top,
            extent.width.ceil(),
            extent.height.ceil(),
        ) else {
            debug!(?region, "region skipped: outside canvas");
            return None;
        };

        let clip = match region.shape {
            RegionShape::Circle { .. } => Clip::Ellipse,
            RegionShape::Rectangle { .. } => Clip::RoundedRect {
                corner_radius: geometry.to_target.length(self.options.corner_radius),
            },
        };

        // Image pixels per target pixel, per axis
        let per_px_x = image_extent.width / extent.width;
        let per_px_y = image_extent.height / extent.height;

        // Source rectangle for a buffer whose pixel (0, 0) sits at canvas
        // position (x, y), sampled at `scale` image pixels per target pixel
        let source_rect = |x: f64, y: f64, w: u32, h: u32, scale: f64| {
            SourceRect::new(
                image_center.x + (x - target_center.x) * per_px_x * scale,
                image_center.y + (y - target_center.y) * per_px_y * scale,
                w as f64 * per_px_x * scale,
                h as f64 * per_px_y * scale,
            )
        };

        let (buffer, padding, inset, border) = match region.effect {
            RegionEffect::Blur { amount } | RegionEffect::Mosaic { amount } => {
                let radius = BlurRadius::from_f64_capped(
                    amount * geometry.to_target.uniform(),
                    self.options.max_blur_radius,
                );
                let radius_px = radius.map_or(0, BlurRadius::get);
                let block = match region.effect {
                    RegionEffect::Mosaic { .. } => {
                        Some(self.options.mosaic_block(radius_px, geometry.export))
                    }
                    _ if radius.is_none() => {
                        debug!(?region, "region skipped: blur radius rounds to zero");
                        return None;
                    }
                    _ => None,
                };

                // Mosaic tiles keep the phase they have when the whole
                // region is on the canvas.
                let align = |cut: f64| block.map_or(0, |b| (cut % b as f64) as u32);
                let padding = radius_px * PADDING_PER_RADIUS;
                let lead_x = padding + align(window.x as f64 - left);
                let lead_y = padding + align(window.y as f64 - top);
                let padded_w = window.width.saturating_add(lead_x).saturating_add(padding);
                let padded_h = window.height.saturating_add(lead_y).saturating_add(padding);

                let src = source_rect(
                    window.x as f64 - lead_x as f64,
                    window.y as f64 - lead_y as f64,
                    padded_w,
                    padded_h,
                    1.0,
                );
                let mut buffer = RgbaImage::new(padded_w, padded_h);
                extract_with_edge_extension(&mut buffer, source, src)?;

                match block {
                    Some(block) => {
                        debug!(?region, block, padding, ?window, "mosaic region");
                        mosaic(&mut buffer, block);
                    }
                    None => {
                        debug!(?region, radius = radius_px, padding, ?window, "blur region");
                        self.kernel.blur(
                            &mut buffer,
                            PixelRect::full(padded_w, padded_h),
                            radius_px as f64,
                        );
                    }
                }
                (buffer, padding, (lead_x, lead_y), None)
            }
            RegionEffect::Magnify { zoom, dark_border } => {
                if !zoom.is_finite() || zoom <= 0.0 {
                    debug!(?region, "region skipped: invalid zoom");
                    return None;
                }
                let src = source_rect(
                    window.x as f64,
                    window.y as f64,
                    window.width,
                    window.height,
                    1.0 / zoom,
                );

                let mut buffer = RgbaImage::new(window.width, window.height);
                extract_with_edge_extension(&mut buffer, source, src)?;
                debug!(?region, zoom, ?window, "magnify region");
                let border = Border {
                    dark: dark_border,
                    scale: geometry.to_target.uniform(),
                };
                (buffer, 0, (0, 0), Some(border))
            }
        };

        Some(ProcessedRegion {
            buffer,
            padding,
            window,
            inset,
            origin,
            extent,
            clip,
            border,
        })
    }
}

// ============================================================
// Compositing
// ============================================================

/// Draw the interior of `region` onto `canvas` through its clip, then its
/// border if it has one.
pub fn composite(canvas: &mut RgbaImage, region: &ProcessedRegion) {
    let (canvas_w, canvas_h) = canvas.dimensions();
    let window = region.window;
    let (inset_x, inset_y) = region.inset;

    for j in 0..window.height {
        let cy = window.y as u64 + j as u64;
        if cy >= canvas_h as u64 {
            break;
        }
        let local_y = cy as f64 + 0.5 - region.origin.y;
        for i in 0..window.width {
            let cx = window.x as u64 + i as u64;
            if cx >= canvas_w as u64 {
                break;
            }
            let local_x = cx as f64 + 0.5 - region.origin.x;
            if !region.clip.contains(region.extent, local_x, local_y) {
                continue;
            }
            let src = *region.buffer.get_pixel(inset_x + i, inset_y + j);
            let dst = canvas.get_pixel_mut(cx as u32, cy as u32);
            *dst = blend_over(*dst, src);
        }
    }

    if let Some(border) = region.border {
        draw_border(canvas, region.origin, region.extent, region.clip, border);
    }
}

/// Source-over alpha blend
pub(super) fn blend_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 || dst[3] == 0 {
        return src;
    }
    if src[3] == 0 {
        return dst;
    }
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

// ============================================================
// Tests
// ============================================================
