use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::fs;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "trailmap.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Takeout folder containing `Semantic Location History`.
    pub base_path: Utf8PathBuf,
    /// Map document written at the end of a run.
    pub output: Utf8PathBuf,
    /// Rows shown in the console preview.
    pub preview_rows: usize,
    pub map: MapSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub zoom_start: u8,
    pub line_color: String,
    pub line_weight: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_path: Utf8PathBuf::from("data"),
            output: Utf8PathBuf::from("movement_visualization.html"),
            preview_rows: 5,
            map: MapSettings::default(),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        MapSettings {
            zoom_start: 10,
            line_color: "red".to_string(),
            line_weight: 2,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from [`DEFAULT_CONFIG_FILE`] when it
    /// exists, falling back to the built-in defaults.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Utf8Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Utf8Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Settings::default()),
        }
    }

    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse configuration: {path}"))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes as null
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
