use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::viewer::layout::LayoutPolicy;
use crate::viewer::renderer::DEFAULT_FULLSCREEN_BOOST;
use crate::viewer::types::PageStep;
use crate::viewer::zoom::Zoom;

const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "folio";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerSettings {
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,

    #[serde(default = "default_max_scale")]
    pub max_scale: f32,

    #[serde(default = "default_zoom_in_factor")]
    pub zoom_in_factor: f32,

    #[serde(default = "default_zoom_out_factor")]
    pub zoom_out_factor: f32,

    #[serde(default)]
    pub page_step: PageStep,

    /// Extra scale applied to every page while fullscreen
    #[serde(default = "default_fullscreen_boost")]
    pub fullscreen_boost: f32,

    #[serde(default)]
    pub layout: LayoutPolicy,
}

fn default_min_scale() -> f32 {
    Zoom::MIN_SCALE
}

fn default_max_scale() -> f32 {
    Zoom::MAX_SCALE
}

fn default_zoom_in_factor() -> f32 {
    Zoom::ZOOM_IN_RATE
}

fn default_zoom_out_factor() -> f32 {
    Zoom::ZOOM_OUT_RATE
}

fn default_fullscreen_boost() -> f32 {
    DEFAULT_FULLSCREEN_BOOST
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            zoom_in_factor: default_zoom_in_factor(),
            zoom_out_factor: default_zoom_out_factor(),
            page_step: PageStep::default(),
            fullscreen_boost: default_fullscreen_boost(),
            layout: LayoutPolicy::default(),
        }
    }
}

impl ViewerSettings {
    /// Parse YAML and repair out-of-range values
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        let mut settings: Self = serde_yaml::from_str(content)?;
        settings.normalize();
        Ok(settings)
    }

    /// Replace values that would break the viewer with defaults
    pub fn normalize(&mut self) {
        if !is_positive(self.min_scale) {
            warn!("Invalid min_scale {}, using default", self.min_scale);
            self.min_scale = default_min_scale();
        }
        if !is_positive(self.max_scale) {
            warn!("Invalid max_scale {}, using default", self.max_scale);
            self.max_scale = default_max_scale();
        }
        if self.min_scale > self.max_scale {
            warn!(
                "min_scale {} above max_scale {}, swapping",
                self.min_scale, self.max_scale
            );
            std::mem::swap(&mut self.min_scale, &mut self.max_scale);
        }
        if !is_positive(self.zoom_in_factor) || self.zoom_in_factor <= 1.0 {
            warn!("Invalid zoom_in_factor {}, using default", self.zoom_in_factor);
            self.zoom_in_factor = default_zoom_in_factor();
        }
        if !is_positive(self.zoom_out_factor) || self.zoom_out_factor >= 1.0 {
            warn!("Invalid zoom_out_factor {}, using default", self.zoom_out_factor);
            self.zoom_out_factor = default_zoom_out_factor();
        }
        if !is_positive(self.fullscreen_boost) {
            warn!("Invalid fullscreen_boost {}, using default", self.fullscreen_boost);
            self.fullscreen_boost = default_fullscreen_boost();
        }
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

/// Load settings from `explicit` or the per-user config file.
///
/// A missing per-user file is created with the defaults. Unreadable or
/// invalid files are logged and the defaults are used.
pub fn load_settings(explicit: Option<&Path>) -> ViewerSettings {
    if let Some(path) = explicit {
        return load_settings_from_path(path);
    }

    let Some(path) = preferred_config_path() else {
        warn!("Could not determine config directory, using default settings");
        return ViewerSettings::default();
    };
    if path.exists() {
        load_settings_from_path(&path)
    } else {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = ViewerSettings::default();
        save_settings_to_file(&settings, &path);
        settings
    }
}

pub fn load_settings_from_path(path: &Path) -> ViewerSettings {
    match fs::read_to_string(path) {
        Ok(content) => match ViewerSettings::from_yaml(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {path:?}");
                settings
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                ViewerSettings::default()
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
            ViewerSettings::default()
        }
    }
}

pub fn save_settings_to_file(settings: &ViewerSettings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let content = match serde_yaml::to_string(settings) {
        Ok(content) => content,
        Err(e) => {
            error!("Failed to serialize settings: {e}");
            return;
        }
    };

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}
