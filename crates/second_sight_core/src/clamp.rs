// SPDX-License-Identifier: MIT OR Apache-2.0
//! Free-look limits while the camera is held at the target.

use crate::config::ClampConfig;
use crate::geometry::normalize_angle;
use second_sight_timeline::Rotation;

/// Keeps pitch inside fixed bounds and yaw inside a cone around the target's heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationClamp {
    min_pitch: f32,
    max_pitch: f32,
    max_relative_yaw: f32,
}

impl RotationClamp {
    /// Create from configuration
    pub fn new(config: &ClampConfig) -> Self {
        Self {
            min_pitch: config.min_pitch,
            max_pitch: config.max_pitch,
            max_relative_yaw: config.max_relative_yaw,
        }
    }

    /// Pitch normalised then clamped to the absolute bounds
    pub fn clamp_pitch(&self, pitch: f32) -> f32 {
        normalize_angle(pitch).clamp(self.min_pitch, self.max_pitch)
    }

    /// Yaw pulled back into the cone centred on `heading`
    pub fn clamp_yaw(&self, yaw: f32, heading: f32) -> f32 {
        let relative = normalize_angle(yaw - heading).clamp(-self.max_relative_yaw, self.max_relative_yaw);
        normalize_angle(heading + relative)
    }

    /// Clamp a full rotation against the target's current heading
    pub fn apply(&self, rotation: Rotation, heading: f32) -> Rotation {
        Rotation {
            pitch: self.clamp_pitch(rotation.pitch),
            yaw: self.clamp_yaw(rotation.yaw, heading),
        }
    }
}

impl Default for RotationClamp {
    fn default() -> Self {
        Self::new(&ClampConfig::default())
    }
}
