//! Configuration management for the surface
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.

pub mod watcher;

use crate::mode::ModeId;
use crate::platform::Platform;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SurfaceConfig {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub settings: SurfaceSettings,
    /// Mode active right after startup
    #[serde(default)]
    pub initial_mode: ModeId,
    /// Refresh tick period for LEDs and display
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,
    /// Platform override; detected at startup when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

/// Hardware layout of the surface
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GridConfig {
    /// Physical knob count
    #[serde(default = "default_knobs")]
    pub knobs: usize,
    #[serde(default = "default_display_rows")]
    pub display_rows: usize,
    #[serde(default = "default_display_columns")]
    pub display_columns: usize,
    /// Characters per display cell
    #[serde(default = "default_cell_width")]
    pub cell_width: usize,
    /// Knobs send touch events; turns on untouched knobs are dropped
    #[serde(default = "default_true")]
    pub touch_sensitive: bool,
}

/// Runtime settings that may change while the surface is running
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SurfaceSettings {
    /// Index into the new clip length table (0-7)
    #[serde(default = "default_new_clip_length")]
    pub new_clip_length: usize,
    /// Use the drum pads to select modes instead of playing notes
    #[serde(default)]
    pub drumpads_as_mode_selection: bool,
    /// Repeat period of held tempo and wind buttons
    #[serde(default = "default_repeat_ms")]
    pub repeat_ms: u64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            settings: SurfaceSettings::default(),
            initial_mode: ModeId::default(),
            refresh_ms: default_refresh_ms(),
            platform: None,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            knobs: default_knobs(),
            display_rows: default_display_rows(),
            display_columns: default_display_columns(),
            cell_width: default_cell_width(),
            touch_sensitive: true,
        }
    }
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            new_clip_length: default_new_clip_length(),
            drumpads_as_mode_selection: false,
            repeat_ms: default_repeat_ms(),
        }
    }
}

impl SurfaceSettings {
    /// Length in beats of a newly created clip
    ///
    /// The first two entries are 1 and 2 beats, the remaining ones 1, 2, 4,
    /// 8, 16 and 32 measures.
    pub fn new_clip_length_in_beats(&self, quarters_per_measure: u32) -> u32 {
        let index = self.new_clip_length.min(7) as u32;
        if index < 2 {
            1 << index
        } else {
            (1 << (index - 2)) * quarters_per_measure
        }
    }
}

impl SurfaceConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        Ok(config)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: SurfaceConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if grid.knobs == 0 || grid.knobs > 16 {
            anyhow::bail!("Grid knob count {} is invalid (must be 1-16)", grid.knobs);
        }
        if grid.display_rows < 2 {
            anyhow::bail!("Display needs at least 2 rows (got {})", grid.display_rows);
        }
        if grid.display_columns < 8 {
            anyhow::bail!(
                "Display needs at least 8 columns (got {})",
                grid.display_columns
            );
        }
        if grid.cell_width == 0 {
            anyhow::bail!("Display cell width cannot be 0");
        }

        if self.settings.new_clip_length > 7 {
            anyhow::bail!(
                "new_clip_length {} is invalid (must be 0-7)",
                self.settings.new_clip_length
            );
        }
        if self.settings.repeat_ms == 0 {
            anyhow::bail!("repeat_ms cannot be 0");
        }
        if self.refresh_ms == 0 {
            anyhow::bail!("refresh_ms cannot be 0");
        }

        Ok(())
    }

    /// Platform from config, falling back to detection
    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::detect)
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_knobs() -> usize { 8 }
fn default_display_rows() -> usize { 2 }
fn default_display_columns() -> usize { 8 }
fn default_cell_width() -> usize { 8 }
fn default_new_clip_length() -> usize { 2 }
fn default_repeat_ms() -> u64 { 200 }
fn default_refresh_ms() -> u64 { 50 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = SurfaceConfig::from_yaml("{}").unwrap();

        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.settings.repeat_ms, 200);
        assert_eq!(config.initial_mode, ModeId::Volume);
        assert!(config.platform.is_none());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
grid:
  knobs: 8
  display_rows: 2
  display_columns: 8
  cell_width: 7
  touch_sensitive: false
settings:
  new_clip_length: 4
  drumpads_as_mode_selection: true
initial_mode: pan
platform: mac_arm
refresh_ms: 40
"#;
        let config = SurfaceConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.grid.cell_width, 7);
        assert!(!config.grid.touch_sensitive);
        assert_eq!(config.settings.new_clip_length, 4);
        assert!(config.settings.drumpads_as_mode_selection);
        assert_eq!(config.initial_mode, ModeId::Pan);
        assert_eq!(config.platform(), Platform::MacArm);
        assert_eq!(config.refresh_ms, 40);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(SurfaceConfig::from_yaml("grid: { knobs: 0 }").is_err());
        assert!(SurfaceConfig::from_yaml("grid: { display_rows: 1 }").is_err());
        assert!(SurfaceConfig::from_yaml("settings: { new_clip_length: 8 }").is_err());
        assert!(SurfaceConfig::from_yaml("settings: { repeat_ms: 0 }").is_err());
    }

    #[test]
    fn test_new_clip_length_table() {
        let mut settings = SurfaceSettings::default();
        let beats: Vec<u32> = (0..8)
            .map(|i| {
                settings.new_clip_length = i;
                settings.new_clip_length_in_beats(4)
            })
            .collect();

        assert_eq!(beats, vec![1, 2, 4, 8, 16, 32, 64, 128]);

        settings.new_clip_length = 3;
        assert_eq!(settings.new_clip_length_in_beats(3), 6);
    }

    #[tokio::test]
    async fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surface.yaml");
        let path = path.to_str().unwrap();

        let mut config = SurfaceConfig::default();
        config.refresh_ms = 25;
        config.settings.new_clip_length = 5;
        config.save(path).await.unwrap();

        let loaded = SurfaceConfig::load(path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let result = SurfaceConfig::load("/nonexistent/surface.yaml").await;
        assert!(result.is_err());
    }
}
