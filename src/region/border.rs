//! Magnifier border ring
//!
//! A 2px outer stroke over a soft drop shadow, then a 1px stroke one pixel
//! further out. White by default, black for dark borders. The outer width,
//! shadow blur and shadow offset scale with the target canvas.

use image::{Rgba, RgbaImage};

use super::render::{blend_over, canvas_window, Clip};
use crate::blur::{stack_blur, PixelRect, MAX_BLUR_RADIUS};
use crate::coords::{Point, Size};

/// Outer stroke width in display pixels
const OUTER_WIDTH: f64 = 2.0;
const OUTER_ALPHA: f64 = 0.8;

/// Inner stroke, in target pixels
const INNER_WIDTH: f64 = 1.0;
const INNER_OFFSET: f64 = 1.0;
const INNER_ALPHA: f64 = 0.4;

/// Shadow blur and downward offset in display pixels
const SHADOW_BLUR: f64 = 15.0;
const SHADOW_OFFSET_Y: f64 = 4.0;
const SHADOW_ALPHA: f64 = 0.3;

/// Border style for one magnifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    /// Black ring instead of white
    pub dark: bool,
    /// Uniform display-to-target scale
    pub scale: f64,
}

impl Border {
    fn stroke_color(&self, alpha: f64, coverage: f64) -> Rgba<u8> {
        let v = if self.dark { 0 } else { 255 };
        Rgba([v, v, v, to_alpha(alpha * coverage)])
    }

    fn outer_width(&self) -> f64 {
        OUTER_WIDTH * self.scale
    }

    fn shadow_radius(&self) -> u32 {
        (SHADOW_BLUR * self.scale)
            .round()
            .clamp(0.0, MAX_BLUR_RADIUS as f64) as u32
    }

    fn shadow_offset(&self) -> f64 {
        SHADOW_OFFSET_Y * self.scale
    }
}

/// Stroke the outline of `clip` (bounding box at `origin`, size `extent`)
/// onto `canvas`. Only the part of the ring on the canvas is touched.
pub fn draw_border(
    canvas: &mut RgbaImage,
    origin: Point,
    extent: Size,
    clip: Clip,
    border: Border,
) {
    let outer = border.outer_width();
    let radius = border.shadow_radius();
    let offset = border.shadow_offset();
    let reach = outer / 2.0 + INNER_OFFSET + INNER_WIDTH + radius as f64 + 1.0;

    let Some(window) = canvas_window(
        canvas.dimensions(),
        origin.x - reach,
        origin.y - reach,
        extent.width + 2.0 * reach,
        extent.height + 2.0 * reach + offset,
    ) else {
        return;
    };

    draw_shadow(canvas, window, origin, extent, clip, border);

    for y in window.y..window.y + window.height {
        let local_y = y as f64 + 0.5 - origin.y;
        for x in window.x..window.x + window.width {
            let local_x = x as f64 + 0.5 - origin.x;
            let d = clip.signed_distance(extent, local_x, local_y);

            let outer_cov = coverage(d, outer);
            let inner_cov = coverage(d - INNER_OFFSET, INNER_WIDTH);
            if outer_cov <= 0.0 && inner_cov <= 0.0 {
                continue;
            }
            let px = canvas.get_pixel_mut(x, y);
            if outer_cov > 0.0 {
                *px = blend_over(*px, border.stroke_color(OUTER_ALPHA, outer_cov));
            }
            if inner_cov > 0.0 {
                *px = blend_over(*px, border.stroke_color(INNER_ALPHA, inner_cov));
            }
        }
    }
}

/// Rasterize the outer stroke shifted down into a scratch layer, blur it
/// and blend it onto the canvas window.
fn draw_shadow(
    canvas: &mut RgbaImage,
    window: PixelRect,
    origin: Point,
    extent: Size,
    clip: Clip,
    border: Border,
) {
    let outer = border.outer_width();
    let radius = border.shadow_radius();
    let offset = border.shadow_offset();

    // Margin so the blur sees the stroke just outside the window
    let margin = radius + 1;
    let layer_x = window.x as f64 - margin as f64;
    let layer_y = window.y as f64 - margin as f64;
    let mut layer = RgbaImage::from_fn(
        window.width + 2 * margin,
        window.height + 2 * margin,
        |i, j| {
            let local_x = layer_x + i as f64 + 0.5 - origin.x;
            let local_y = layer_y + j as f64 + 0.5 - origin.y - offset;
            let cov = coverage(clip.signed_distance(extent, local_x, local_y), outer);
            Rgba([0, 0, 0, to_alpha(SHADOW_ALPHA * cov)])
        },
    );
    if radius > 0 {
        let (w, h) = layer.dimensions();
        stack_blur(&mut layer, PixelRect::full(w, h), radius as f64);
    }

    for j in 0..window.height {
        for i in 0..window.width {
            let shadow = *layer.get_pixel(i + margin, j + margin);
            if shadow[3] == 0 {
                continue;
            }
            let px = canvas.get_pixel_mut(window.x + i, window.y + j);
            *px = blend_over(*px, shadow);
        }
    }
}

/// Fraction of a pixel at distance `d` from a stroke's centre line covered
/// by a stroke of `width`
fn coverage(d: f64, width: f64) -> f64 {
    (width / 2.0 + 0.5 - d.abs()).clamp(0.0, 1.0)
}

fn to_alpha(a: f64) -> u8 {
    (a * 255.0).round().clamp(0.0, 255.0) as u8
}
