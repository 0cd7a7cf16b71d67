//! TOML-based reveal tuning configuration.
//!
//! The dwell duration, animation timings, and smoothing profiles are
//! presentation tuning, not product semantics, so they live in
//! configuration rather than constants.
//!
//! Configuration is stored at `~/.config/capsule/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::motion::SmoothingProfile;
use crate::reveal::AnimationClip;

/// Opening animation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    /// Fraction of the clip at which the held pose is reached.
    #[serde(default = "default_midpoint_fraction")]
    pub midpoint_fraction: f64,
    /// How long the pose is held before completion.
    #[serde(default = "default_hold_duration_ms")]
    pub hold_duration_ms: u64,
    #[serde(default = "default_open_speed")]
    pub open_speed: f64,
}

impl AnimationConfig {
    pub fn clip(&self) -> AnimationClip {
        AnimationClip {
            duration_ms: self.duration_ms,
            midpoint_fraction: self.midpoint_fraction,
            hold_duration_ms: self.hold_duration_ms,
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            midpoint_fraction: default_midpoint_fraction(),
            hold_duration_ms: default_hold_duration_ms(),
            open_speed: default_open_speed(),
        }
    }
}

/// Camera smoothing profiles per orchestrator phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Looser tracking while searching / idle.
    #[serde(default = "default_search_profile")]
    pub search: SmoothingProfile,
    /// Tighter, slower tracking once opening, to settle the camera.
    #[serde(default = "default_settle_profile")]
    pub settle: SmoothingProfile,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            search: default_search_profile(),
            settle: default_settle_profile(),
        }
    }
}

/// Reveal session configuration.
///
/// Serialized to/from TOML at `~/.config/capsule/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Minimum duration of the searching phase, independent of asset
    /// readiness. Pure pacing.
    #[serde(default = "default_min_dwell_ms")]
    pub min_dwell_ms: u64,
    /// Countdown refresh cadence for the host's tick loop.
    #[serde(default = "default_countdown_tick_ms")]
    pub countdown_tick_ms: u64,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            min_dwell_ms: default_min_dwell_ms(),
            countdown_tick_ms: default_countdown_tick_ms(),
            animation: AnimationConfig::default(),
            smoothing: SmoothingConfig::default(),
        }
    }
}

// Default functions
fn default_min_dwell_ms() -> u64 {
    2000
}
fn default_countdown_tick_ms() -> u64 {
    1000
}
fn default_duration_ms() -> u64 {
    1000
}
fn default_midpoint_fraction() -> f64 {
    0.45
}
fn default_hold_duration_ms() -> u64 {
    600
}
fn default_open_speed() -> f64 {
    1.0
}
fn default_search_profile() -> SmoothingProfile {
    SmoothingProfile {
        alpha: 0.35,
        damping: 0.9,
    }
}
fn default_settle_profile() -> SmoothingProfile {
    SmoothingProfile {
        alpha: 0.12,
        damping: 0.35,
    }
}

/// Returns `~/.config/capsule[-dev]/` based on CAPSULE_ENV.
///
/// Set CAPSULE_ENV=dev to use the development data directory.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CAPSULE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("capsule-dev")
    } else {
        base_dir.join("capsule")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

impl RevealConfig {
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/capsule"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk; a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Read one value by dotted key, for `capsule config get`.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "min_dwell_ms" => self.min_dwell_ms.to_string(),
            "countdown_tick_ms" => self.countdown_tick_ms.to_string(),
            "animation.duration_ms" => self.animation.duration_ms.to_string(),
            "animation.midpoint_fraction" => self.animation.midpoint_fraction.to_string(),
            "animation.hold_duration_ms" => self.animation.hold_duration_ms.to_string(),
            "animation.open_speed" => self.animation.open_speed.to_string(),
            "smoothing.search.alpha" => self.smoothing.search.alpha.to_string(),
            "smoothing.search.damping" => self.smoothing.search.damping.to_string(),
            "smoothing.settle.alpha" => self.smoothing.settle.alpha.to_string(),
            "smoothing.settle.damping" => self.smoothing.settle.damping.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Write one value by dotted key, for `capsule config set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
        where
            T::Err: std::fmt::Display,
        {
            value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        }

        match key {
            "min_dwell_ms" => self.min_dwell_ms = parse(key, value)?,
            "countdown_tick_ms" => self.countdown_tick_ms = parse(key, value)?,
            "animation.duration_ms" => self.animation.duration_ms = parse(key, value)?,
            "animation.midpoint_fraction" => self.animation.midpoint_fraction = parse(key, value)?,
            "animation.hold_duration_ms" => self.animation.hold_duration_ms = parse(key, value)?,
            "animation.open_speed" => self.animation.open_speed = parse(key, value)?,
            "smoothing.search.alpha" => self.smoothing.search.alpha = parse(key, value)?,
            "smoothing.search.damping" => self.smoothing.search.damping = parse(key, value)?,
            "smoothing.settle.alpha" => self.smoothing.settle.alpha = parse(key, value)?,
            "smoothing.settle.damping" => self.smoothing.settle.damping = parse(key, value)?,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = RevealConfig::default();
        assert_eq!(config.min_dwell_ms, 2000);
        assert_eq!(config.animation.duration_ms, 1000);
        assert_eq!(config.animation.midpoint_fraction, 0.45);
        assert_eq!(config.animation.hold_duration_ms, 600);
    }

    #[test]
    fn toml_roundtrip_with_missing_fields() {
        // A partial file picks up defaults for everything absent.
        let config: RevealConfig = toml::from_str("min_dwell_ms = 3500").unwrap();
        assert_eq!(config.min_dwell_ms, 3500);
        assert_eq!(config.countdown_tick_ms, 1000);
        assert_eq!(config.animation.open_speed, 1.0);

        let raw = toml::to_string_pretty(&config).unwrap();
        let back: RevealConfig = toml::from_str(&raw).unwrap();
        assert_eq!(back.min_dwell_ms, 3500);
    }

    #[test]
    fn get_set_by_dotted_key() {
        let mut config = RevealConfig::default();
        config.set("animation.open_speed", "2.5").unwrap();
        assert_eq!(config.get("animation.open_speed").unwrap(), "2.5");

        assert!(matches!(
            config.set("animation.open_speed", "fast"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.get("no.such.key"),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
