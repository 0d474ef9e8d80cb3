//! Mosaic (pixelation) filter
//!
//! Replaces every `block x block` tile with the flat average of its pixels.
//! Tiles cut off by the right or bottom edge average only what is inside.

use image::RgbaImage;
use tracing::{debug, trace, warn};

const CHANNELS: usize = 4;

/// Pixelate the whole image in place.
pub fn mosaic(image: &mut RgbaImage, block_size: u32) {
    let (width, height) = image.dimensions();
    mosaic_rgba(&mut **image, width, height, block_size);
}

/// Pixelate a raw RGBA8 buffer of `width x height` pixels in place.
///
/// A zero block size, an empty buffer or a length that does not match the
/// dimensions leaves the buffer untouched.
pub fn mosaic_rgba(pixels: &mut [u8], width: u32, height: u32, block_size: u32) {
    if block_size == 0 || width == 0 || height == 0 {
        trace!(block_size, width, height, "mosaic skipped: degenerate input");
        return;
    }
    let expected = width as usize * height as usize * CHANNELS;
    if pixels.len() != expected {
        warn!(
            len = pixels.len(),
            expected, "mosaic skipped: buffer length does not match dimensions"
        );
        return;
    }

    debug!(block_size, width, height, "mosaic");

    let (w, h, block) = (width as usize, height as usize, block_size as usize);
    let stride = w * CHANNELS;

    for by in (0..h).step_by(block) {
        let rows = by..(by + block).min(h);
        for bx in (0..w).step_by(block) {
            let cols = bx * CHANNELS..(bx + block).min(w) * CHANNELS;

            let mut sums = [0u64; CHANNELS];
            for y in rows.clone() {
                let line = &pixels[y * stride + cols.start..y * stride + cols.end];
                for px in line.chunks_exact(CHANNELS) {
                    for c in 0..CHANNELS {
                        sums[c] += px[c] as u64;
                    }
                }
            }

            let count = (rows.len() * cols.len() / CHANNELS) as u64;
            let mut average = [0u8; CHANNELS];
            for c in 0..CHANNELS {
                average[c] = ((sums[c] + count / 2) / count) as u8;
            }

            for y in rows.clone() {
                let line = &mut pixels[y * stride + cols.start..y * stride + cols.end];
                for px in line.chunks_exact_mut(CHANNELS) {
                    px.copy_from_slice(&average);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::collections::HashSet;

    fn noise(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = (x * 31 + y * 17) as u8;
            Rgba([v, v.wrapping_mul(3), 255 - v, 200 + (x % 5) as u8])
        })
    }

    #[test]
    fn test_black_white_split_becomes_gray() {
        let mut image = RgbaImage::from_fn(4, 4, |x, _| {
            if x < 2 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([255, 255, 255, 255])
            }
        });
        mosaic(&mut image, 4);

        let first = *image.get_pixel(0, 0);
        assert!(image.pixels().all(|p| *p == first));
        for c in 0..3 {
            assert!(first.0[c] == 127 || first.0[c] == 128, "{first:?}");
        }
        assert_eq!(first.0[3], 255);
    }

    #[test]
    fn test_blocks_are_flat() {
        let mut image = noise(23, 17);
        mosaic(&mut image, 5);

        for by in (0..17).step_by(5) {
            for bx in (0..23).step_by(5) {
                let mut colors = HashSet::new();
                for y in by..(by + 5).min(17) {
                    for x in bx..(bx + 5).min(23) {
                        colors.insert(image.get_pixel(x, y).0);
                    }
                }
                assert_eq!(colors.len(), 1, "block ({bx}, {by})");
            }
        }
    }

    #[test]
    fn test_partial_tile_averages_in_bounds_pixels() {
        // 3 wide, block 2: right tile is a single column of 10s and 20s
        let mut image = RgbaImage::from_fn(3, 2, |x, y| {
            if x == 2 {
                Rgba([10 + 10 * y as u8, 0, 0, 255])
            } else {
                Rgba([200, 0, 0, 255])
            }
        });
        mosaic(&mut image, 2);
        assert_eq!(*image.get_pixel(2, 0), Rgba([15, 0, 0, 255]));
        assert_eq!(*image.get_pixel(0, 1), Rgba([200, 0, 0, 255]));
    }

    #[test]
    fn test_block_size_one_is_identity() {
        let original = noise(9, 9);
        let mut image = original.clone();
        mosaic(&mut image, 1);
        assert_eq!(image, original);
    }

    #[test]
    fn test_zero_block_is_noop() {
        let original = noise(9, 9);
        let mut image = original.clone();
        mosaic(&mut image, 0);
        assert_eq!(image, original);
    }

    #[test]
    fn test_block_larger_than_image() {
        let mut image = noise(6, 4);
        mosaic(&mut image, 64);
        let first = *image.get_pixel(0, 0);
        assert!(image.pixels().all(|p| *p == first));
    }

    #[test]
    fn test_second_pass_is_stable_once_flat() {
        let mut image = noise(16, 16);
        mosaic(&mut image, 4);
        let once = image.clone();
        mosaic(&mut image, 4);
        assert_eq!(image, once);
    }

    #[test]
    fn test_raw_length_mismatch_is_noop() {
        let mut raw = vec![7u8; 15];
        mosaic_rgba(&mut raw, 2, 2, 2);
        assert_eq!(raw, vec![7u8; 15]);
    }
}
