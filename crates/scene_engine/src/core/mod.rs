//! # Core Engine Module
//!
//! Shared configuration types used by the engine and the viewer binary.

pub mod config;

pub use config::{
    CameraConfig, Config, ConfigError, LoggingConfig, RenderConfig, ViewerConfig, WindowConfig,
};
