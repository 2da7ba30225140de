//! Editor configuration
//!
//! Defaults match the behaviour of the web editor (500 ms save debounce,
//! 50 undo steps, zoom clamped at 0.5). A TOML file can override any subset
//! of the values.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::{BoundingBox, ElementShape, MIN_ZOOM, ZOOM_STEP};

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Rendered size of canvas elements, in document units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementMetrics {
    pub node_width: f64,
    pub node_height: f64,
    pub hub_size: f64,
    /// Radius of the connection handle drawn on nodes and hubs
    pub handle_radius: f64,
    /// Distance in screen pixels within which a click hits a connection
    pub connection_hit_tolerance: f64,
}

impl Default for ElementMetrics {
    fn default() -> Self {
        Self {
            node_width: 192.0,
            node_height: 72.0,
            hub_size: 24.0,
            handle_radius: 8.0,
            connection_hit_tolerance: 6.0,
        }
    }
}

impl ElementMetrics {
    /// Bounding box of an element whose top-left corner is at `(x, y)`
    pub fn bounds(&self, x: f64, y: f64, shape: ElementShape) -> BoundingBox {
        match shape {
            ElementShape::Node => BoundingBox::new(x, y, self.node_width, self.node_height),
            ElementShape::Hub => BoundingBox::new(x, y, self.hub_size, self.hub_size),
        }
    }
}

/// Configuration for an editor session
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Lower bound for the canvas zoom factor
    pub min_zoom: f64,
    /// Increment for discrete zoom in / zoom out actions
    pub zoom_step: f64,
    /// Maximum number of undo steps kept
    pub history_limit: usize,
    /// Quiet period after the last change before the document is saved
    pub save_debounce: Duration,
    /// Storage key of the single project this editor works on
    pub project_id: String,
    pub metrics: ElementMetrics,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            zoom_step: ZOOM_STEP,
            history_limit: 50,
            save_debounce: Duration::from_millis(500),
            project_id: "current_project".to_string(),
            metrics: ElementMetrics::default(),
        }
    }
}

/// TOML structure for deserializing configuration overrides
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    canvas: Option<TomlCanvas>,
    history: Option<TomlHistory>,
    persistence: Option<TomlPersistence>,
    metrics: Option<TomlMetrics>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlCanvas {
    min_zoom: Option<f64>,
    zoom_step: Option<f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlHistory {
    limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPersistence {
    debounce_ms: Option<u64>,
    project_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlMetrics {
    node_width: Option<f64>,
    node_height: Option<f64>,
    hub_size: Option<f64>,
    handle_radius: Option<f64>,
    connection_hit_tolerance: Option<f64>,
}

impl EditorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration overrides from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration overrides from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();

        if let Some(canvas) = parsed.canvas {
            if let Some(min_zoom) = canvas.min_zoom {
                config.min_zoom = min_zoom;
            }
            if let Some(step) = canvas.zoom_step {
                config.zoom_step = step;
            }
        }
        if let Some(limit) = parsed.history.and_then(|h| h.limit) {
            config.history_limit = limit;
        }
        if let Some(persistence) = parsed.persistence {
            if let Some(ms) = persistence.debounce_ms {
                config.save_debounce = Duration::from_millis(ms);
            }
            if let Some(id) = persistence.project_id {
                config.project_id = id;
            }
        }
        if let Some(metrics) = parsed.metrics {
            let m = &mut config.metrics;
            m.node_width = metrics.node_width.unwrap_or(m.node_width);
            m.node_height = metrics.node_height.unwrap_or(m.node_height);
            m.hub_size = metrics.hub_size.unwrap_or(m.hub_size);
            m.handle_radius = metrics.handle_radius.unwrap_or(m.handle_radius);
            m.connection_hit_tolerance = metrics
                .connection_hit_tolerance
                .unwrap_or(m.connection_hit_tolerance);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "canvas.min_zoom",
                reason: format!("must be a positive number, got {}", self.min_zoom),
            });
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "canvas.zoom_step",
                reason: format!("must be a positive number, got {}", self.zoom_step),
            });
        }
        if self.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "history.limit",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "persistence.project_id",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Set the minimum zoom factor
    pub fn with_min_zoom(mut self, min_zoom: f64) -> Self {
        self.min_zoom = min_zoom;
        self
    }

    /// Set the zoom increment
    pub fn with_zoom_step(mut self, step: f64) -> Self {
        self.zoom_step = step;
        self
    }

    /// Set the number of undo steps kept
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the save debounce delay
    pub fn with_save_debounce(mut self, delay: Duration) -> Self {
        self.save_debounce = delay;
        self
    }

    /// Set the storage key
    pub fn with_project_id(mut self, id: impl Into<String>) -> Self {
        self.project_id = id.into();
        self
    }

    /// Set the element metrics
    pub fn with_metrics(mut self, metrics: ElementMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}
