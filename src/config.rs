//! Config module.
//! Manages I/O for tsumego.json (problem file, output directory, board geometry, caption font).
//! Uses serde for JSON serialization; every field is optional and falls back to its default.
//! A missing file means "all defaults"; an unreadable or malformed file is an error.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::render::{
    DEFAULT_CANVAS_SIZE, DEFAULT_FONT_PATH, DEFAULT_FONT_SIZE, DEFAULT_MARGIN, RenderOptions,
};

pub const DEFAULT_CONFIG_PATH: &str = "tsumego.json";
pub const DEFAULT_PROBLEMS_PATH: &str = "files/problems.sgf";
pub const DEFAULT_OUTPUT_DIR: &str = "out";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize config for {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Record file, one puzzle per line.
    pub problems_path: PathBuf,
    /// Directory rendered images are written to.
    pub output_dir: PathBuf,
    pub canvas_size: u32,
    pub margin: u32,
    pub font_path: PathBuf,
    pub font_size: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            problems_path: PathBuf::from(DEFAULT_PROBLEMS_PATH),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            canvas_size: DEFAULT_CANVAS_SIZE,
            margin: DEFAULT_MARGIN,
            font_path: PathBuf::from(DEFAULT_FONT_PATH),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl Config {
    /// Loads `path`, or the defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            canvas_size: self.canvas_size,
            margin: self.margin,
            font_path: self.font_path.clone(),
            font_size: self.font_size,
        }
    }
}
