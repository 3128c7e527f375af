use crate::grid::{Edge, GridCell, GridState};
use crate::motion::{is_valid_pace, DisplayMode, DEFAULT_MS_PER_UNIT};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_size")]
    pub size: i32,
    #[serde(default = "default_start_x")]
    pub start_x: i32,
    #[serde(default = "default_start_y")]
    pub start_y: i32,
    #[serde(default = "default_end_x")]
    pub end_x: i32,
    #[serde(default = "default_end_y")]
    pub end_y: i32,
    /// Streets blocked at startup, as "x1,y1-x2,y2"
    #[serde(default)]
    pub blocked_streets: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_ms_per_unit")]
    pub ms_per_unit: f64,
    #[serde(default = "default_mode")]
    pub mode: DisplayMode,
}

#[derive(Debug, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    #[serde(default = "default_bg_r")]
    pub background_r: u8,
    #[serde(default = "default_bg_g")]
    pub background_g: u8,
    #[serde(default = "default_bg_b")]
    pub background_b: u8,
    #[serde(default = "default_show_grid")]
    pub show_grid: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter used when RUST_LOG is not set
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_enable_action_log")]
    pub enable_action_log: bool,
    #[serde(default = "default_action_log_path")]
    pub action_log_path: String,
}

// Default values
fn default_size() -> i32 { 15 }
fn default_start_x() -> i32 { 3 }
fn default_start_y() -> i32 { 3 }
fn default_end_x() -> i32 { 11 }
fn default_end_y() -> i32 { 11 }
fn default_ms_per_unit() -> f64 { DEFAULT_MS_PER_UNIT }
fn default_mode() -> DisplayMode { DisplayMode::Both }
fn default_window_title() -> String { "Taxicab Explorer - Flight vs Street".to_string() }
fn default_cell_size() -> f32 { 40.0 }
fn default_bg_r() -> u8 { 245 }
fn default_bg_g() -> u8 { 247 }
fn default_bg_b() -> u8 { 250 }
fn default_show_grid() -> bool { true }
fn default_level() -> String { "info".to_string() }
fn default_enable_action_log() -> bool { true }
fn default_action_log_path() -> String { "action_log.json".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            start_x: default_start_x(),
            start_y: default_start_y(),
            end_x: default_end_x(),
            end_y: default_end_y(),
            blocked_streets: Vec::new(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            ms_per_unit: default_ms_per_unit(),
            mode: default_mode(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            cell_size: default_cell_size(),
            background_r: default_bg_r(),
            background_g: default_bg_g(),
            background_b: default_bg_b(),
            show_grid: default_show_grid(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            enable_action_log: default_enable_action_log(),
            action_log_path: default_action_log_path(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            animation: AnimationConfig::default(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Where a loaded configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    /// The file exists but didn't parse; defaults are used
    Invalid(PathBuf, String),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => {
                info!("No {} found, using default configuration", path.display())
            }
            ConfigSource::Invalid(path, e) => {
                warn!("Failed to parse {}: {}", path.display(), e);
                warn!("Using default configuration");
            }
        }
    }
}

impl Config {
    /// Read configuration from a file, falling back to defaults when the file
    /// is missing or malformed. Nothing is logged here so this can run before
    /// the subscriber is installed; log the returned source once it is.
    pub fn read_from<P: AsRef<Path>>(path: P) -> (Self, ConfigSource) {
        let path = path.as_ref().to_path_buf();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_toml(&contents) {
                Ok(config) => (config, ConfigSource::File(path)),
                Err(e) => (Config::default(), ConfigSource::Invalid(path, e.to_string())),
            },
            Err(_) => (Config::default(), ConfigSource::Missing(path)),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Animation pace in milliseconds per unit. Values that would stall or
    /// skip the animation fall back to the default.
    pub fn ms_per_unit(&self) -> f64 {
        let pace = self.animation.ms_per_unit;
        if is_valid_pace(pace) {
            pace
        } else {
            warn!(
                "ms_per_unit = {} is not a positive number, using {}",
                pace, DEFAULT_MS_PER_UNIT
            );
            DEFAULT_MS_PER_UNIT
        }
    }

    /// Build the initial grid: points clamped into the grid, configured
    /// streets blocked. Unparseable or out-of-grid streets are skipped.
    pub fn initial_grid(&self) -> GridState {
        let mut grid = GridState::new(
            self.grid.size,
            GridCell::new(self.grid.start_x, self.grid.start_y),
            GridCell::new(self.grid.end_x, self.grid.end_y),
        );

        for text in &self.grid.blocked_streets {
            match text.parse::<Edge>() {
                Ok(edge) if edge.fits(grid.size) => grid.block_street(edge),
                Ok(edge) => warn!("Blocked street {} lies outside the grid, skipping", edge),
                Err(e) => warn!("Skipping blocked street '{}': {}", text, e),
            }
        }

        grid
    }
}
