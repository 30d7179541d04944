//! Tunables for the annotator, optionally read from a JSON file.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::palette::{PaletteColor, default_palette};

pub const DEFAULT_CONFIG_FILE: &str = "easybox.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extensions matched exactly, so list every case variant you want.
    pub supported_img_exts: Vec<String>,
    pub default_win_width: f32,
    pub default_win_height: f32,
    pub default_canvas_width: f32,
    pub default_canvas_height: f32,
    /// Boxes must be strictly larger than this on both axes (image pixels).
    pub min_box_size: f32,
    pub box_width: f32,
    /// Stroke width of the box selected in the list.
    pub enhance_box_width: f32,
    /// Three `{}` slots: folder, total images, 1-based current index.
    pub status_format: String,
    pub sidecar_dir_name: String,
    pub box_colors: Vec<PaletteColor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supported_img_exts: [
                "jpg", "JPG", "png", "PNG", "jpeg", "JPEG", "bmp", "BMP", "jpe", "JPE",
            ]
            .iter()
            .map(|s| (*s).to_owned())
            .collect(),
            default_win_width: 1600.0,
            default_win_height: 760.0,
            default_canvas_width: 400.0,
            default_canvas_height: 400.0,
            min_box_size: 2.0,
            box_width: 2.0,
            enhance_box_width: 5.0,
            status_format: "Directory: {} | Total: {}, Current: {}".to_owned(),
            sidecar_dir_name: "easybox".to_owned(),
            box_colors: default_palette(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::Invalid(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file just means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.box_colors.is_empty() {
            return Err(ConfigError::Invalid("box_colors must not be empty".into()));
        }
        if self.supported_img_exts.iter().all(|e| e.is_empty()) {
            return Err(ConfigError::Invalid("supported_img_exts must not be empty".into()));
        }
        if self.sidecar_dir_name.trim().is_empty() {
            return Err(ConfigError::Invalid("sidecar_dir_name must not be empty".into()));
        }
        if self.min_box_size.is_nan() || self.min_box_size < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_box_size must be >= 0, got {}",
                self.min_box_size
            )));
        }
        Ok(())
    }
}
