// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effect configuration.
//!
//! Loaded from a RON file next to the plugin. Every section and field has a
//! default, so a partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "SecondSight.ron";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Could not read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid RON for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Values parse but make no sense together
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    /// Everything, including per-frame clamping
    Trace,
    /// Build details and rejected targets
    Debug,
    /// State changes
    #[default]
    Info,
    /// Recoverable failures
    Warn,
    /// Failures only
    Error,
    /// Same as `Error`
    Critical,
    /// Nothing
    Off,
}

impl LogLevel {
    /// Matching tracing filter
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Trace => LevelFilter::TRACE,
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
            Self::Off => LevelFilter::OFF,
        }
    }
}

/// Target selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Candidates further than this from the player are rejected
    pub max_target_distance: f32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            max_target_distance: 8000.0,
        }
    }
}

/// Anchor point settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Distance pushed along the target's forward axis to clear the head
    pub forward_bias: f32,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self { forward_bias: 20.0 }
    }
}

/// Distance-to-duration mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Distances at or below this take `min_time`
    pub min_distance: f32,
    /// Distances at or above this take `max_time`
    pub max_distance: f32,
    /// Shortest transition in seconds
    pub min_time: f32,
    /// Longest transition in seconds
    pub max_time: f32,
    /// Duration used when there is nothing to measure against
    pub fallback_time: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            min_distance: 2000.0,
            max_distance: 10000.0,
            min_time: 0.5,
            max_time: 2.0,
            fallback_time: 1.0,
        }
    }
}

/// Where the intermediate rotation keyframes sit, as fractions of the duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Camera has turned to face along the target's heading
    pub face_heading_at: f32,
    /// Camera looks straight at the target
    pub face_target_at: f32,
    /// On the way back, camera still looks at the target
    pub return_face_target_at: f32,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            face_heading_at: 0.2,
            face_target_at: 0.5,
            return_face_target_at: 0.5,
        }
    }
}

/// Playback request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Playback speed multiplier
    pub speed: f32,
    /// Keep the camera above the ground while moving
    pub follow_ground: bool,
    /// Minimum camera height above ground
    pub min_height_above_ground: f32,
    /// Keep HUD menus visible
    pub show_menus: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            follow_ground: true,
            min_height_above_ground: 100.0,
            show_menus: true,
        }
    }
}

/// Free-look limits while held at the target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClampConfig {
    /// Lowest pitch (looking up)
    pub min_pitch: f32,
    /// Highest pitch (looking down)
    pub max_pitch: f32,
    /// Largest yaw away from the target's heading, either side
    pub max_relative_yaw: f32,
}

impl Default for ClampConfig {
    fn default() -> Self {
        Self {
            min_pitch: -0.45 * PI,
            max_pitch: 0.4 * PI,
            max_relative_yaw: 0.5 * PI,
        }
    }
}

/// Complete effect configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondSightConfig {
    /// Log verbosity
    pub log_level: LogLevel,
    /// Target selection
    pub targeting: TargetingConfig,
    /// Anchor point
    pub anchor: AnchorConfig,
    /// Transition durations
    pub timing: TimingConfig,
    /// Keyframe placement
    pub path: PathConfig,
    /// Playback requests
    pub playback: PlaybackConfig,
    /// Free-look limits
    pub clamp: ClampConfig,
}

impl SecondSightConfig {
    /// Parse and validate RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Load a configuration file, falling back to defaults on any problem
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring {}: {e}. Using defaults.", path.display());
                Self::default()
            }
        }
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Check that values are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.targeting.max_target_distance,
            self.anchor.forward_bias,
            self.timing.min_distance,
            self.timing.max_distance,
            self.timing.min_time,
            self.timing.max_time,
            self.timing.fallback_time,
            self.path.face_heading_at,
            self.path.face_target_at,
            self.path.return_face_target_at,
            self.playback.speed,
            self.playback.min_height_above_ground,
            self.clamp.min_pitch,
            self.clamp.max_pitch,
            self.clamp.max_relative_yaw,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(invalid("all values must be finite"));
        }

        let timing = &self.timing;
        if timing.max_distance <= timing.min_distance {
            return Err(invalid("timing.max_distance must exceed timing.min_distance"));
        }
        if timing.min_time <= 0.0 || timing.fallback_time <= 0.0 {
            return Err(invalid("transition times must be positive"));
        }
        if timing.max_time < timing.min_time {
            return Err(invalid("timing.max_time must not be below timing.min_time"));
        }

        let path = &self.path;
        let fractions = [path.face_heading_at, path.face_target_at, path.return_face_target_at];
        if fractions.iter().any(|f| *f <= 0.0 || *f >= 1.0) {
            return Err(invalid("path fractions must lie strictly between 0 and 1"));
        }
        if path.face_heading_at > path.face_target_at {
            return Err(invalid("path.face_heading_at must not come after path.face_target_at"));
        }

        if self.targeting.max_target_distance <= 0.0 {
            return Err(invalid("targeting.max_target_distance must be positive"));
        }
        if self.playback.speed <= 0.0 {
            return Err(invalid("playback.speed must be positive"));
        }
        if self.clamp.min_pitch >= self.clamp.max_pitch {
            return Err(invalid("clamp.min_pitch must be below clamp.max_pitch"));
        }
        if self.clamp.max_relative_yaw <= 0.0 || self.clamp.max_relative_yaw > PI {
            return Err(invalid("clamp.max_relative_yaw must lie in (0, pi]"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
