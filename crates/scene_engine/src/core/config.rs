//! # Viewer Configuration
//!
//! Settings for the window, the starting camera, frame clearing, the
//! optional skybox and logging, loadable from TOML or RON through [`Config`].
//!
//! ```toml
//! [window]
//! width = 600
//! height = 450
//! title = "Basic example"
//!
//! [camera]
//! position = [0.0, 0.0, 3.0]
//! speed = 3.5
//! ```

use crate::foundation::math::Vec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use crate::config::{Config, ConfigError};

/// Window creation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Title bar text
    pub title: String,
    /// Whether the user may resize the window
    pub resizable: bool,
    /// Wait for vertical sync on swap
    pub vsync: bool,
    /// Hide and lock the cursor for mouse look
    pub capture_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Scene Engine".to_string(),
            resizable: true,
            vsync: true,
            capture_cursor: true,
        }
    }
}

/// Starting camera state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// World position
    pub position: Vec3,
    /// Units per second
    pub speed: f32,
    /// Degrees per pixel of cursor travel
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            speed: 0.5,
            sensitivity: 0.07,
        }
    }
}

/// Frame setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA clear color
    pub clear_color: [f32; 4],
    /// Render through an offscreen target and a screen quad
    pub post_processing: bool,
    /// Directory holding the six skybox faces
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skybox: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.1, 1.0],
            post_processing: false,
            skybox: None,
        }
    }
}

/// Logger setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset
    pub level: String,
}

impl LoggingConfig {
    /// Parsed level, `Info` when unrecognized
    pub fn level_filter(&self) -> log::LevelFilter {
        self.level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Camera settings
    pub camera: CameraConfig,
    /// Frame settings
    pub render: RenderConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl ViewerConfig {
    /// Set the window size
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the window title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    /// Set the starting camera position
    pub fn with_camera_position(mut self, position: Vec3) -> Self {
        self.camera.position = position;
        self
    }

    /// Set the camera speed
    pub fn with_camera_speed(mut self, speed: f32) -> Self {
        self.camera.speed = speed;
        self
    }

    /// Set the clear color
    pub fn with_clear_color(mut self, rgba: [f32; 4]) -> Self {
        self.render.clear_color = rgba;
        self
    }

    /// Enable or disable the post-processing pass
    pub fn with_post_processing(mut self, enabled: bool) -> Self {
        self.render.post_processing = enabled;
        self
    }

    /// Draw a skybox loaded from `dir`
    pub fn with_skybox(mut self, dir: impl Into<PathBuf>) -> Self {
        self.render.skybox = Some(dir.into());
        self
    }

    /// Set the default log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(format!(
                "Window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            ));
        }
        if self.window.title.is_empty() {
            return Err("Window title cannot be empty".to_string());
        }
        if !(self.camera.speed.is_finite() && self.camera.speed > 0.0) {
            return Err(format!("Camera speed must be positive, got {}", self.camera.speed));
        }
        if !(self.camera.sensitivity.is_finite() && self.camera.sensitivity > 0.0) {
            return Err(format!(
                "Camera sensitivity must be positive, got {}",
                self.camera.sensitivity
            ));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(format!("Unknown log level '{}'", self.logging.level));
        }
        Ok(())
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ViewerConfig {
        ViewerConfig::default()
            .with_window_size(600, 450)
            .with_title("Basic example")
            .with_camera_position(Vec3::new(1.0, 2.0, 3.0))
            .with_camera_speed(3.5)
            .with_clear_color([0.0, 0.25, 0.5, 1.0])
            .with_log_level("debug")
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.toml");
        let config = sample();
        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.ron");
        let config = sample().with_post_processing(true).with_skybox("skies/lake");
        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ViewerConfig = toml::from_str("[window]\nwidth = 1024\n").unwrap();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, WindowConfig::default().height);
        assert_eq!(config.camera, CameraConfig::default());
        assert_eq!(config.render.skybox, None);

        let config: ViewerConfig = toml::from_str("[render]\nskybox = \"skies/lake\"\n").unwrap();
        assert_eq!(config.render.skybox, Some(PathBuf::from("skies/lake")));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = ViewerConfig::default().save_to_file(dir.path().join("viewer.yaml"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_validate() {
        assert!(sample().validate().is_ok());
        assert!(sample().with_window_size(0, 450).validate().is_err());
        assert!(sample().with_camera_speed(-1.0).validate().is_err());
        assert!(sample().with_log_level("loud").validate().is_err());
        assert_eq!(sample().logging.level_filter(), log::LevelFilter::Debug);
    }
}
