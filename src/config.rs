//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>`, else `$XDG_CONFIG_HOME/cattree/cattree.toml`
//! 3. Environment variables: `CATTREE_*` prefix, `__` separates nested keys
//!    (e.g. `CATTREE_LAYOUT__HORIZONTAL_SPACING=400`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{LayoutMetrics, Point};

/// Raw reveal timing for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRevealTiming {
    pub node_base_ms: Option<u64>,
    pub node_step_ms: Option<u64>,
    pub connector_ms: Option<u64>,
}

/// Raw layout config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLayout {
    pub horizontal_spacing: Option<f64>,
    pub vertical_spacing: Option<f64>,
    pub root_origin: Option<Point>,
    pub connector_nudge: Option<f64>,
    pub connector_thickness: Option<f64>,
    pub connector_color: Option<String>,
    pub reveal: RawRevealTiming,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree_file: Option<PathBuf>,
    pub layout: RawLayout,
}

impl LayoutMetrics {
    /// Overlay wins where it specifies a value, otherwise keep self.
    pub fn merge(&self, overlay: &RawLayout) -> Self {
        let mut merged = self.clone();
        if let Some(v) = overlay.horizontal_spacing {
            merged.horizontal_spacing = v;
        }
        if let Some(v) = overlay.vertical_spacing {
            merged.vertical_spacing = v;
        }
        if let Some(v) = overlay.root_origin {
            merged.root_origin = v;
        }
        if let Some(v) = overlay.connector_nudge {
            merged.connector_nudge = v;
        }
        if let Some(v) = overlay.connector_thickness {
            merged.connector_thickness = v;
        }
        if let Some(v) = &overlay.connector_color {
            merged.connector_color = v.clone();
        }
        if let Some(v) = overlay.reveal.node_base_ms {
            merged.reveal.node_base_ms = v;
        }
        if let Some(v) = overlay.reveal.node_step_ms {
            merged.reveal.node_step_ms = v;
        }
        if let Some(v) = overlay.reveal.connector_ms {
            merged.reveal.connector_ms = v;
        }
        merged
    }
}

/// Unified configuration for cattree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// JSON tree file to render (default: built-in sample catalog)
    pub tree_file: Option<PathBuf>,
    /// Spacing and cosmetic layout parameters
    pub layout: LayoutMetrics,
}

/// Get the XDG config directory for cattree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "cattree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("cattree.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(tree_file) = &self.tree_file {
            let expanded = expand_env_vars(tree_file.to_string_lossy().as_ref());
            self.tree_file = Some(PathBuf::from(expanded));
        }
    }

    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree_file: overlay
                .tree_file
                .clone()
                .or_else(|| self.tree_file.clone()),
            layout: self.layout.merge(&overlay.layout),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given.
    ///   Without it the global XDG config is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        let path = match config_file {
            Some(explicit) if !explicit.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", explicit.display()),
                });
            }
            Some(explicit) => Some(explicit.to_path_buf()),
            None => global_config_path().filter(|p| p.exists()),
        };
        if let Some(path) = path {
            debug!("loading config from {}", path.display());
            let raw = load_raw_settings(&path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.layout.validate()?;

        Ok(current)
    }

    /// Apply CATTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CATTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("tree_file") {
            settings.tree_file = Some(PathBuf::from(val));
        }
        let layout = &mut settings.layout;
        if let Ok(val) = config.get_float("layout.horizontal_spacing") {
            layout.horizontal_spacing = val;
        }
        if let Ok(val) = config.get_float("layout.vertical_spacing") {
            layout.vertical_spacing = val;
        }
        if let Ok(val) = config.get_float("layout.root_origin.x") {
            layout.root_origin.x = val;
        }
        if let Ok(val) = config.get_float("layout.root_origin.y") {
            layout.root_origin.y = val;
        }
        if let Ok(val) = config.get_float("layout.connector_nudge") {
            layout.connector_nudge = val;
        }
        if let Ok(val) = config.get_float("layout.connector_thickness") {
            layout.connector_thickness = val;
        }
        if let Ok(val) = config.get_string("layout.connector_color") {
            layout.connector_color = val;
        }
        let millis = |key: &str| {
            config
                .get_int(key)
                .ok()
                .and_then(|v| u64::try_from(v).ok())
        };
        if let Some(val) = millis("layout.reveal.node_base_ms") {
            layout.reveal.node_base_ms = val;
        }
        if let Some(val) = millis("layout.reveal.node_step_ms") {
            layout.reveal.node_step_ms = val;
        }
        if let Some(val) = millis("layout.reveal.connector_ms") {
            layout.reveal.connector_ms = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r##"# cattree configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/cattree/cattree.toml (or --config <file>)
#   Env:  CATTREE_* environment variables, "__" for nesting
#         e.g. CATTREE_LAYOUT__HORIZONTAL_SPACING=400

# JSON tree to render ({"root": {"key": ..., "leftChild": ..., "rightChild": ...}})
# tree_file = "~/catalog/tree.json"

[layout]
# Horizontal distance from a parent to each child (px)
# horizontal_spacing = 350.0

# Vertical distance between levels (px)
# vertical_spacing = 250.0

# Connector anchor shift below the parent's center (px)
# connector_nudge = 80.0
# connector_thickness = 2.0
# connector_color = "#CCCCCC"

# Where the root is drawn, relative to the center
# [layout.root_origin]
# x = 0.0
# y = -150.0

# Delays before elements become visible
# [layout.reveal]
# node_base_ms = 50
# node_step_ms = 100
# connector_ms = 200
"##
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_then_uses_sample_tree_and_default_spacing() {
        let settings = Settings::default();
        assert!(settings.tree_file.is_none());
        assert_eq!(settings.layout.horizontal_spacing, 350.0);
        assert_eq!(settings.layout.vertical_spacing, 250.0);
        assert_eq!(settings.layout.root_origin, Point::new(0.0, -150.0));
    }

    #[test]
    fn given_partial_overlay_when_merging_layout_then_keeps_unspecified_values() {
        let base = LayoutMetrics::default();
        let overlay = RawLayout {
            horizontal_spacing: Some(200.0),
            reveal: RawRevealTiming {
                connector_ms: Some(0),
                ..RawRevealTiming::default()
            },
            ..RawLayout::default()
        };

        let merged = base.merge(&overlay);

        assert_eq!(merged.horizontal_spacing, 200.0);
        assert_eq!(merged.vertical_spacing, 250.0);
        assert_eq!(merged.reveal.connector_ms, 0);
        assert_eq!(merged.reveal.node_base_ms, 50);
        assert_eq!(merged.connector_color, "#CCCCCC");
    }

    #[test]
    fn given_tilde_in_tree_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            tree_file: Some(PathBuf::from("~/tree.json")),
            layout: LayoutMetrics::default(),
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let path = settings.tree_file.unwrap();
        assert!(path.to_string_lossy().starts_with(&home));
        assert!(!path.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_settings_when_serializing_then_template_and_toml_parse_back() {
        let toml_text = Settings::default().to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&toml_text).unwrap();
        assert_eq!(raw.layout.horizontal_spacing, Some(350.0));

        let template: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(template.tree_file.is_none());
    }
}
