//! Settings for the `ribbon` binary, stored as TOML.
//!
//! Lookup order: an explicit path, then `<config dir>/ribbon-board/config.toml` when it
//! exists, then built-in defaults. `RIBBON_SERVICE_URL` overrides the service URL.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    export::request::{EXPORT_DURATION_SECS, EXPORT_FILENAME, ExportSettings},
    foundation::{
        core::Fps,
        error::{RibbonError, RibbonResult},
    },
    params::model::{Direction, DisplayWidth, Params, ScrollDuration},
};

const APP_DIR: &str = "ribbon-board";
const CONFIG_FILE: &str = "config.toml";
pub const SERVICE_URL_ENV: &str = "RIBBON_SERVICE_URL";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RibbonConfig {
    pub service: ServiceConfig,
    pub export: ExportConfig,
    pub preview: PreviewConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000/api/render".to_string(),
            timeout_secs: 120,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub duration_secs: u32,
    pub filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            duration_secs: EXPORT_DURATION_SECS,
            filename: EXPORT_FILENAME.to_string(),
        }
    }
}

impl ExportConfig {
    pub fn settings(&self) -> ExportSettings {
        ExportSettings {
            duration_secs: self.duration_secs,
            filename: self.filename.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub duration_secs: u32,
    pub direction: Direction,
    pub width: DisplayWidth,
    pub fps: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            duration_secs: ScrollDuration::default().secs(),
            direction: Direction::default(),
            width: DisplayWidth::default(),
            fps: 30,
        }
    }
}

impl PreviewConfig {
    pub fn params(&self) -> Params {
        Params {
            duration: ScrollDuration::clamped(self.duration_secs),
            direction: self.direction,
            width: self.width,
        }
    }

    pub fn fps(&self) -> RibbonResult<Fps> {
        Fps::new(self.fps, 1)
    }
}

impl RibbonConfig {
    pub fn validate(&self) -> RibbonResult<()> {
        if self.service.url.trim().is_empty() {
            return Err(RibbonError::validation("service.url must not be empty"));
        }
        if self.service.timeout_secs == 0 {
            return Err(RibbonError::validation("service.timeout_secs must be > 0"));
        }
        if self.export.duration_secs == 0 {
            return Err(RibbonError::validation("export.duration_secs must be > 0"));
        }
        if self.export.filename.trim().is_empty() {
            return Err(RibbonError::validation("export.filename must not be empty"));
        }
        self.preview.fps()?;
        Ok(())
    }

    /// Apply environment overrides on top of whatever was loaded.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = std::env::var(SERVICE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            self.service.url = url;
        }
        self
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_DIR);
        path.push(CONFIG_FILE);
        path
    })
}

/// Resolve configuration for a run. A missing explicit file is an error; a missing
/// default file is not.
pub fn load(explicit: Option<&Path>) -> RibbonResult<RibbonConfig> {
    let cfg = match explicit {
        Some(path) => load_from_path(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_from_path(&path)?,
            None => RibbonConfig::default(),
        },
    };
    let cfg = cfg.with_env_overrides();
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> RibbonResult<RibbonConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    toml::from_str(&text)
        .map_err(|e| RibbonError::serde(format!("parse config '{}': {e}", path.display())))
}

pub fn save_to_path(config: &RibbonConfig, path: &Path) -> RibbonResult<()> {
    let text = toml::to_string_pretty(config)
        .map_err(|e| RibbonError::serde(format!("encode config: {e}")))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config directory '{}'", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("write config '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
