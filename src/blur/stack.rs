//! StackBlur kernel
//!
//! Two separable passes (rows, then columns) over a sub-rectangle of an
//! RGBA8 buffer. Each line keeps a ring of the last `2r + 1` samples and
//! three running sums, so every pixel costs the same regardless of radius.
//!
//! # Algorithm
//!
//! 1. Seed the ring with the first sample repeated `r + 1` times and the
//!    next `r` samples (clamped to the line), weighting them `1..=r+1..=1`
//! 2. For each output pixel: write `sum / (r + 1)^2` via multiply/shift,
//!    drop the outgoing half of the window, pull the next sample in
//! 3. Samples past either end of the line repeat the end pixel

use image::RgbaImage;
use tracing::{debug, trace, warn};

use super::tables::divisor_constants;
use super::types::{BlurRadius, PixelRect};

/// Bytes per RGBA pixel
const CHANNELS: usize = 4;

// ============================================================
// Kernel trait
// ============================================================

/// A blur that mutates a sub-rectangle of an RGBA buffer in place
pub trait BlurKernel {
    /// Blur `rect` of `image` with the given radius.
    ///
    /// Invalid radii and empty rectangles leave `image` untouched.
    fn blur(&self, image: &mut RgbaImage, rect: PixelRect, radius: f64);
}

/// Mario Klingemann's StackBlur
#[derive(Debug, Clone, Copy, Default)]
pub struct StackBlur;

impl BlurKernel for StackBlur {
    fn blur(&self, image: &mut RgbaImage, rect: PixelRect, radius: f64) {
        stack_blur(image, rect, radius);
    }
}

// ============================================================
// Entry points
// ============================================================

/// Blur `rect` of `image` in place.
pub fn stack_blur(image: &mut RgbaImage, rect: PixelRect, radius: f64) {
    let (width, height) = image.dimensions();
    stack_blur_rgba(&mut **image, width, height, rect, radius);
}

/// Blur `rect` of a raw RGBA8 buffer of `width x height` pixels in place.
///
/// Does nothing when the radius is NaN or rounds below 1, when the
/// rectangle misses the buffer, or when `pixels.len()` is not
/// `width * height * 4`.
pub fn stack_blur_rgba(pixels: &mut [u8], width: u32, height: u32, rect: PixelRect, radius: f64) {
    let Some(radius) = BlurRadius::from_f64(radius) else {
        trace!(radius, "blur skipped: radius below 1 or NaN");
        return;
    };

    let expected = width as usize * height as usize * CHANNELS;
    if pixels.len() != expected {
        warn!(
            len = pixels.len(),
            expected, "blur skipped: buffer length does not match dimensions"
        );
        return;
    }

    let Some(rect) = rect.clip_to(width, height) else {
        trace!(?rect, width, height, "blur skipped: empty rectangle");
        return;
    };

    debug!(radius = radius.get(), ?rect, "stack blur");

    let stride = width as usize * CHANNELS;
    let origin = rect.y as usize * stride + rect.x as usize * CHANNELS;
    let mut line = LineBlur::new(radius);

    // Horizontal pass
    for row in 0..rect.height as usize {
        line.run(pixels, origin + row * stride, CHANNELS, rect.width as usize);
    }

    // Vertical pass
    for col in 0..rect.width as usize {
        line.run(pixels, origin + col * CHANNELS, stride, rect.height as usize);
    }
}

// ============================================================
// Line pass
// ============================================================

type Sums = [u64; CHANNELS];

/// Scratch state for blurring one line; reused across lines of a call
struct LineBlur {
    radius: usize,
    mul: u64,
    shg: u32,
    ring: Vec<[u8; CHANNELS]>,
}

impl LineBlur {
    fn new(radius: BlurRadius) -> Self {
        let (mul, shg) = divisor_constants(radius.get());
        Self {
            radius: radius.get() as usize,
            mul,
            shg,
            ring: vec![[0; CHANNELS]; radius.window()],
        }
    }

    /// Blur `len` pixels starting at byte `start`, `step` bytes apart.
    fn run(&mut self, pixels: &mut [u8], start: usize, step: usize, len: usize) {
        if len == 0 {
            return;
        }

        let radius = self.radius;
        let window = self.ring.len();
        let last = len - 1;
        let offset = |i: usize| start + i * step;

        let mut sum: Sums = [0; CHANNELS];
        let mut sum_in: Sums = [0; CHANNELS];
        let mut sum_out: Sums = [0; CHANNELS];

        let first = read_pixel(pixels, offset(0));
        for (i, slot) in self.ring[..=radius].iter_mut().enumerate() {
            *slot = first;
            accumulate(&mut sum, first, (i + 1) as u64);
            accumulate(&mut sum_out, first, 1);
        }

        for i in 1..=radius {
            let px = read_pixel(pixels, offset(i.min(last)));
            self.ring[i + radius] = px;
            accumulate(&mut sum, px, (radius + 1 - i) as u64);
            accumulate(&mut sum_in, px, 1);
        }

        let mut ring_ptr = radius;
        let mut next = radius.min(last);

        for x in 0..len {
            let dst = offset(x);
            for c in 0..CHANNELS {
                pixels[dst + c] = ((sum[c] * self.mul) >> self.shg) as u8;
            }

            for c in 0..CHANNELS {
                sum[c] -= sum_out[c];
            }

            let mut ring_start = ring_ptr + window - radius;
            if ring_start >= window {
                ring_start -= window;
            }
            release(&mut sum_out, self.ring[ring_start]);

            if next < last {
                next += 1;
            }
            let incoming = read_pixel(pixels, offset(next));
            self.ring[ring_start] = incoming;
            accumulate(&mut sum_in, incoming, 1);
            for c in 0..CHANNELS {
                sum[c] += sum_in[c];
            }

            ring_ptr += 1;
            if ring_ptr >= window {
                ring_ptr = 0;
            }
            let center = self.ring[ring_ptr];
            accumulate(&mut sum_out, center, 1);
            release(&mut sum_in, center);
        }
    }
}

#[inline]
fn read_pixel(pixels: &[u8], at: usize) -> [u8; CHANNELS] {
    [pixels[at], pixels[at + 1], pixels[at + 2], pixels[at + 3]]
}

#[inline]
fn accumulate(sums: &mut Sums, px: [u8; CHANNELS], weight: u64) {
    for c in 0..CHANNELS {
        sums[c] += px[c] as u64 * weight;
    }
}

#[inline]
fn release(sums: &mut Sums, px: [u8; CHANNELS]) {
    for c in 0..CHANNELS {
        sums[c] -= px[c] as u64;
    }
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x / 2 + y / 2) % 2 == 0 {
                Rgba([240, 30, 90, 255])
            } else {
                Rgba([10, 200, 60, 128])
            }
        })
    }

    fn channel_mean(image: &RgbaImage) -> f64 {
        let raw = image.as_raw();
        raw.iter().map(|&v| v as f64).sum::<f64>() / raw.len() as f64
    }

    #[test]
    fn test_uniform_red_stays_red() {
        let mut image = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
        stack_blur(&mut image, PixelRect::full(10, 10), 3.0);
        assert!(image.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[test]
    fn test_uniform_color_any_radius() {
        for radius in [1.0, 2.0, 7.0, 40.0, 254.0, 500.0] {
            let mut image = RgbaImage::from_pixel(13, 9, Rgba([17, 99, 201, 77]));
            stack_blur(&mut image, PixelRect::full(13, 9), radius);
            assert!(
                image.pixels().all(|p| *p == Rgba([17, 99, 201, 77])),
                "radius {radius}"
            );
        }
    }

    #[test]
    fn test_zero_and_nan_radius_are_noops() {
        let original = checkerboard(12, 12);
        for radius in [0.0, f64::NAN, -4.0, 0.3] {
            let mut image = original.clone();
            stack_blur(&mut image, PixelRect::full(12, 12), radius);
            assert_eq!(image, original);
        }
    }

    #[test]
    fn test_deterministic() {
        let mut a = checkerboard(20, 15);
        let mut b = a.clone();
        stack_blur(&mut a, PixelRect::full(20, 15), 4.0);
        stack_blur(&mut b, PixelRect::full(20, 15), 4.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_blur_changes_pattern() {
        let original = checkerboard(16, 16);
        let mut image = original.clone();
        stack_blur(&mut image, PixelRect::full(16, 16), 3.0);
        assert_ne!(image, original);
    }

    #[test]
    fn test_pixels_outside_rect_untouched() {
        let original = checkerboard(20, 20);
        let mut image = original.clone();
        let rect = PixelRect::new(4, 6, 9, 7);
        stack_blur(&mut image, rect, 5.0);

        for (x, y, px) in image.enumerate_pixels() {
            if !rect.contains(x, y) {
                assert_eq!(px, original.get_pixel(x, y), "pixel ({x}, {y}) changed");
            }
        }
        assert_eq!(image.dimensions(), original.dimensions());
    }

    #[test]
    fn test_rect_is_clipped_to_buffer() {
        let original = checkerboard(8, 8);
        let mut image = original.clone();
        stack_blur(&mut image, PixelRect::new(4, 4, 100, 100), 2.0);
        for (x, y, px) in image.enumerate_pixels() {
            if x < 4 || y < 4 {
                assert_eq!(px, original.get_pixel(x, y));
            }
        }
        assert_ne!(image, original);
    }

    #[test]
    fn test_rect_outside_buffer_is_noop() {
        let original = checkerboard(8, 8);
        let mut image = original.clone();
        stack_blur(&mut image, PixelRect::new(8, 0, 4, 4), 2.0);
        assert_eq!(image, original);
    }

    #[test]
    fn test_mean_is_approximately_conserved() {
        let mut image = checkerboard(32, 24);
        let before = channel_mean(&image);
        stack_blur(&mut image, PixelRect::full(32, 24), 6.0);
        let after = channel_mean(&image);
        assert!((before - after).abs() < 2.0, "before {before}, after {after}");
    }

    #[test]
    fn test_edge_replication_does_not_darken() {
        // Bright image: edge pixels must stay bright, no fade to black
        let mut image = RgbaImage::from_fn(10, 10, |x, _| {
            if x % 2 == 0 {
                Rgba([250, 250, 250, 255])
            } else {
                Rgba([230, 230, 230, 255])
            }
        });
        stack_blur(&mut image, PixelRect::full(10, 10), 8.0);
        for px in image.pixels() {
            assert!(px.0[0] >= 228, "edge darkened: {:?}", px);
            assert_eq!(px.0[3], 255);
        }
    }

    #[test]
    fn test_alpha_is_blurred() {
        let mut image = RgbaImage::from_fn(9, 1, |x, _| {
            if x < 4 {
                Rgba([0, 0, 0, 0])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        stack_blur(&mut image, PixelRect::full(9, 1), 2.0);
        let alpha = image.get_pixel(4, 0).0[3];
        assert!(alpha > 0 && alpha < 255, "alpha {alpha}");
    }

    #[test]
    fn test_single_pixel_and_single_row() {
        let mut dot = RgbaImage::from_pixel(1, 1, Rgba([9, 8, 7, 6]));
        stack_blur(&mut dot, PixelRect::full(1, 1), 10.0);
        assert_eq!(*dot.get_pixel(0, 0), Rgba([9, 8, 7, 6]));

        let mut row = checkerboard(30, 1);
        stack_blur(&mut row, PixelRect::full(30, 1), 254.0);
        assert_eq!(row.dimensions(), (30, 1));
    }

    #[test]
    fn test_raw_buffer_length_mismatch_is_noop() {
        let mut raw = vec![100u8; 10 * 10 * 4 - 1];
        raw[0] = 0;
        let original = raw.clone();
        stack_blur_rgba(&mut raw, 10, 10, PixelRect::full(10, 10), 3.0);
        assert_eq!(raw, original);
    }

    #[test]
    fn test_empty_buffer_is_noop() {
        let mut raw: Vec<u8> = Vec::new();
        stack_blur_rgba(&mut raw, 0, 0, PixelRect::full(0, 0), 3.0);
        assert!(raw.is_empty());
    }

    #[test]
    fn test_step_edge_is_smoothed_monotonically() {
        let mut image = RgbaImage::from_fn(10, 1, |x, _| {
            if x < 5 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        stack_blur(&mut image, PixelRect::full(10, 1), 2.0);
        let reds: Vec<u8> = image.pixels().map(|p| p.0[0]).collect();
        assert_eq!(reds, vec![0, 0, 0, 28, 85, 170, 227, 255, 255, 255]);
    }

    #[test]
    fn test_trait_object_dispatch() {
        let kernel: &dyn BlurKernel = &StackBlur;
        let mut image = RgbaImage::from_pixel(6, 6, Rgba([1, 2, 3, 4]));
        kernel.blur(&mut image, PixelRect::full(6, 6), 2.0);
        assert!(image.pixels().all(|p| *p == Rgba([1, 2, 3, 4])));
    }
}
