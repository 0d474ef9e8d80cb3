//! Loading and saving images and region lists

use image::RgbaImage;
use std::path::Path;

use super::types::{Region, RegionError, Result};

/// Load any image the `image` crate can decode as RGBA8
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    if !path.exists() {
        return Err(RegionError::ImageNotFound(path.to_path_buf()));
    }
    let img = image::open(path).map_err(|e| RegionError::InvalidImage(e.to_string()))?;
    Ok(img.to_rgba8())
}

/// Save an RGBA8 image; the format follows the file extension
pub fn save_rgba(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save(path)
        .map_err(|e| RegionError::ProcessingFailed(e.to_string()))
}

/// Wrap raw RGBA8 bytes, checking `len == width * height * 4`
pub fn rgba_from_raw(width: u32, height: u32, bytes: Vec<u8>) -> Result<RgbaImage> {
    let len = bytes.len();
    let invalid = RegionError::InvalidBuffer { width, height, len };
    if len as u64 != width as u64 * height as u64 * 4 {
        return Err(invalid);
    }
    RgbaImage::from_raw(width, height, bytes).ok_or(invalid)
}

/// Parse a JSON array of regions
pub fn parse_regions(json: &str) -> Result<Vec<Region>> {
    serde_json::from_str(json).map_err(|e| RegionError::InvalidRegions(e.to_string()))
}

/// Read a JSON array of regions from a file
pub fn load_regions(path: &Path) -> Result<Vec<Region>> {
    let content = std::fs::read_to_string(path)?;
    parse_regions(&content)
}
