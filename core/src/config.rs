//! Engine configuration.
//!
//! All knobs have defaults; a TOML file only needs the keys it changes:
//!
//! ```toml
//! [window]
//! size = 300
//! reuse_tightness = 0.6
//!
//! [edges]
//! chronological = true
//!
//! [layout]
//! level_step = 150.0
//! time_step = 100.0
//! time_shift = 40.0
//! ```

use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GraphConfig {
    pub window: WindowConfig,
    pub edges: EdgeConfig,
    pub layout: LayoutConfig,
}

/// Size of the materialized window and how eagerly it is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum number of events in a window (`N`).
    pub size: usize,
    /// Fraction of the half window that a selection may drift from the
    /// window center before a rebuild (`S`). Smaller means more rebuilds.
    pub reuse_tightness: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: 100,
            reuse_tightness: 0.6,
        }
    }
}

impl WindowConfig {
    /// Distance from the window center still accepted for reuse.
    pub fn reuse_delta(&self) -> f64 {
        self.size as f64 * 0.5 * self.reuse_tightness
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EdgeConfig {
    /// Reconnect nodes without a structural outgoing link to the next event.
    pub chronological: bool,
}

/// Pixel spacing of the layout grid. Larger values spread nodes further
/// apart on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal distance between levels.
    pub level_step: f64,
    /// Vertical distance between distinct timestamps.
    pub time_step: f64,
    /// Vertical distance between stacked nodes sharing a timestamp.
    pub time_shift: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            level_step: 150.0,
            time_step: 100.0,
            time_shift: 40.0,
        }
    }
}

impl GraphConfig {
    pub fn from_toml_str(text: &str) -> GraphResult<Self> {
        let config: GraphConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    pub fn with_window_size(mut self, size: usize) -> Self {
        self.window.size = size;
        self
    }

    pub fn with_chronological_edges(mut self, enabled: bool) -> Self {
        self.edges.chronological = enabled;
        self
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.window.size == 0 {
            return Err(GraphError::InvalidConfig(
                "window.size must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.window.reuse_tightness) {
            return Err(GraphError::InvalidConfig(format!(
                "window.reuse_tightness must be within [0, 1], got {}",
                self.window.reuse_tightness
            )));
        }
        let steps = [
            ("layout.level_step", self.layout.level_step),
            ("layout.time_step", self.layout.time_step),
            ("layout.time_shift", self.layout.time_shift),
        ];
        for (name, value) in steps {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
