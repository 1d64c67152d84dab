//! Engine tunables, loadable from JSON.

use crate::collab::canvas::FitViewOptions;
use crate::error::ConfigError;
use crate::graph::Size;
use crate::layout::TidyTree;
use crate::placeholder::PlaceholderSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between neighbouring subtrees, in node widths.
    pub separation: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 200.0,
            node_height: 150.0,
            separation: 1.0,
        }
    }
}

impl LayoutConfig {
    pub fn tree(&self) -> TidyTree {
        TidyTree {
            node_width: self.node_width,
            node_height: self.node_height,
            separation: self.separation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    pub fit_duration_ms: u64,
    pub fit_padding: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            fit_duration_ms: 200,
            fit_padding: 0.2,
        }
    }
}

impl AnimationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn fit_view(&self) -> FitViewOptions {
        FitViewOptions {
            duration_ms: self.fit_duration_ms,
            padding: self.fit_padding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub enabled: bool,
    pub id: String,
    pub label: String,
    pub spacing: f64,
    pub debounce_ms: u64,
    pub drag_threshold: f64,
    /// Used when neither a reported nor a measured size is known.
    pub default_size: Size,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        let settings = PlaceholderSettings::default();
        Self {
            enabled: true,
            id: settings.id,
            label: settings.label,
            spacing: settings.spacing,
            debounce_ms: 200,
            drag_threshold: settings.drag_threshold,
            default_size: Size::new(400.0, 400.0),
        }
    }
}

impl PlaceholderConfig {
    pub fn settings(&self) -> PlaceholderSettings {
        PlaceholderSettings {
            id: self.id.clone(),
            label: self.label.clone(),
            spacing: self.spacing,
            drag_threshold: self.drag_threshold,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_size: usize,
    pub enable_shortcuts: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: crate::history::DEFAULT_MAX_HISTORY,
            enable_shortcuts: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub animation: AnimationConfig,
    pub placeholder: PlaceholderConfig,
    pub history: HistoryConfig,
    /// Board the session belongs to; created nodes are only persisted when set.
    pub board_id: Option<String>,
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("layout.node_width", self.layout.node_width),
            ("layout.node_height", self.layout.node_height),
            ("layout.separation", self.layout.separation),
            ("placeholder.spacing", self.placeholder.spacing),
            ("placeholder.default_size.width", self.placeholder.default_size.width),
            ("placeholder.default_size.height", self.placeholder.default_size.height),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| v.is_nan() || *v <= 0.0) {
            return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
        }
        if self.placeholder.drag_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "placeholder.drag_threshold must not be negative".to_string(),
            ));
        }
        if self.animation.duration_ms == 0 {
            return Err(ConfigError::Invalid("animation.duration_ms must be non-zero".to_string()));
        }
        if self.placeholder.debounce_ms == 0 {
            return Err(ConfigError::Invalid("placeholder.debounce_ms must be non-zero".to_string()));
        }
        if self.history.max_size == 0 {
            return Err(ConfigError::Invalid("history.max_size must be non-zero".to_string()));
        }
        if self.placeholder.id.is_empty() {
            return Err(ConfigError::Invalid("placeholder.id must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.config.layout.node_width = width;
        self.config.layout.node_height = height;
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.config.animation.duration_ms = duration.as_millis() as u64;
        self
    }

    pub fn with_placeholders(mut self, enabled: bool) -> Self {
        self.config.placeholder.enabled = enabled;
        self
    }

    pub fn with_placeholder_spacing(mut self, spacing: f64) -> Self {
        self.config.placeholder.spacing = spacing;
        self
    }

    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.config.placeholder.debounce_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.config.placeholder.drag_threshold = threshold;
        self
    }

    pub fn with_default_size(mut self, size: Size) -> Self {
        self.config.placeholder.default_size = size;
        self
    }

    pub fn with_max_history(mut self, max_size: usize) -> Self {
        self.config.history.max_size = max_size;
        self
    }

    pub fn with_shortcuts(mut self, enabled: bool) -> Self {
        self.config.history.enable_shortcuts = enabled;
        self
    }

    pub fn with_board_id(mut self, board_id: impl Into<String>) -> Self {
        self.config.board_id = Some(board_id.into());
        self
    }

    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
