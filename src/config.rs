//! Configuration file support
//!
//! Settings come from a TOML file, looked up in order:
//!
//! 1. `./region-blur.toml`
//! 2. `<config dir>/region-blur/config.toml`
//!
//! Command-line values override file values.
//!
//! ```toml
//! [render]
//! display_dpr = 1.0
//! export_dpr = 2.0
//! max_blur_radius = 254
//! corner_radius = 8.0
//! display_mosaic_min_block = 8
//! export_mosaic_min_block = 4
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::coords::DEFAULT_EXPORT_DPR;
use crate::region::{RenderOptions, RenderTarget};

/// Local config file name
pub const LOCAL_CONFIG_FILE: &str = "region-blur.toml";

/// Directory under the user config dir
pub const CONFIG_DIR_NAME: &str = "region-blur";

/// File name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default display device-pixel-ratio
const DEFAULT_DISPLAY_DPR: f64 = 1.0;

/// Largest accepted DPR
const MAX_DPR: f64 = 8.0;

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// `[render]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub display_dpr: Option<f64>,
    pub export_dpr: Option<f64>,
    pub max_blur_radius: Option<u32>,
    pub corner_radius: Option<f64>,
    pub display_mosaic_min_block: Option<u32>,
    pub export_mosaic_min_block: Option<u32>,
}

/// Whole configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub dpr: Option<f64>,
    pub max_blur_radius: Option<u32>,
    pub corner_radius: Option<f64>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Config {
    /// Load from the first config file found, or defaults when none exists.
    ///
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load() -> Result<Self> {
        match Self::search_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Candidate config files, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Display DPR from the file, or 1
    pub fn display_dpr(&self) -> f64 {
        sanitize_dpr(self.render.display_dpr, DEFAULT_DISPLAY_DPR)
    }

    /// Export DPR from the file, or 2
    pub fn export_dpr(&self) -> f64 {
        sanitize_dpr(self.render.export_dpr, DEFAULT_EXPORT_DPR)
    }

    /// Render target for display or export, with a DPR override
    pub fn target(&self, export: bool, dpr_override: Option<f64>) -> RenderTarget {
        if export {
            RenderTarget::Export {
                dpr: sanitize_dpr(dpr_override, self.export_dpr()),
            }
        } else {
            RenderTarget::Display {
                dpr: sanitize_dpr(dpr_override, self.display_dpr()),
            }
        }
    }

    /// Render options from file values, with CLI values taking precedence
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> RenderOptions {
        let render = &self.render;
        let mut builder = RenderOptions::builder();

        if let Some(radius) = cli.max_blur_radius.or(render.max_blur_radius) {
            builder = builder.max_blur_radius(radius);
        }
        if let Some(corner) = cli.corner_radius.or(render.corner_radius) {
            builder = builder.corner_radius(corner);
        }
        if let Some(block) = render.display_mosaic_min_block {
            builder = builder.display_mosaic_min_block(block);
        }
        if let Some(block) = render.export_mosaic_min_block {
            builder = builder.export_mosaic_min_block(block);
        }

        builder.build()
    }

    /// Every setting filled in with the value rendering would use
    pub fn resolved(&self) -> Config {
        let options = self.merge_with_cli(&CliOverrides::new());
        Config {
            render: RenderConfig {
                display_dpr: Some(self.display_dpr()),
                export_dpr: Some(self.export_dpr()),
                max_blur_radius: Some(options.max_blur_radius),
                corner_radius: Some(options.corner_radius),
                display_mosaic_min_block: Some(options.display_mosaic_min_block),
                export_mosaic_min_block: Some(options.export_mosaic_min_block),
            },
        }
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn sanitize_dpr(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.min(MAX_DPR),
        _ => fallback,
    }
}
