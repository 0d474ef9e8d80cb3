//! Blur module
//!
//! Fast approximate Gaussian blur ("StackBlur") for RGBA8 buffers.
//!
//! # Features
//!
//! - Triangular-weighted sliding window, O(width × height) for any radius
//! - Fixed-point divide via per-radius lookup tables ([`tables`])
//! - Edge replication at the sub-rectangle boundary
//! - Alpha blurred like any other channel
//!
//! # Example
//!
//! ```rust
//! use image::{Rgba, RgbaImage};
//! use region_blur::{stack_blur, PixelRect};
//!
//! let mut image = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
//! stack_blur(&mut image, PixelRect::full(10, 10), 3.0);
//! assert_eq!(*image.get_pixel(5, 5), Rgba([255, 0, 0, 255]));
//! ```

pub mod stack;
pub mod tables;
mod types;

// Re-export public API
pub use stack::{stack_blur, stack_blur_rgba, BlurKernel, StackBlur};
pub use tables::{divisor_constants, MUL_TABLE, SHG_TABLE};
pub use types::{BlurRadius, PixelRect, MAX_BLUR_RADIUS, MIN_BLUR_RADIUS};
