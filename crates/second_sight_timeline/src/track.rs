// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tracks and timelines.

use crate::binding::ActorHandle;
use crate::engine::PlaybackMode;
use crate::keyframe::{Keyframe, KeyframePayload, RotationTarget, TranslationTarget};
use serde::{Deserialize, Serialize};

/// Track errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackError {
    /// Keyframe would go before the last one
    #[error("Keyframe at {time}s is before the last keyframe at {last}s")]
    OutOfOrder {
        /// Time of the rejected keyframe
        time: f32,
        /// Time of the current last keyframe
        last: f32,
    },

    /// Keyframe time is negative or not a number
    #[error("Invalid keyframe time: {0}")]
    InvalidTime(f32),
}

/// Ordered keyframes of a single kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> Default for Track<T> {
    fn default() -> Self {
        Self {
            keyframes: Vec::new(),
        }
    }
}

impl<T: KeyframePayload> Track<T> {
    /// Create an empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a keyframe, returning its index.
    ///
    /// Times must be non-negative and non-decreasing.
    pub fn push(&mut self, keyframe: Keyframe<T>) -> Result<usize, TrackError> {
        if !keyframe.time.is_finite() || keyframe.time < 0.0 {
            return Err(TrackError::InvalidTime(keyframe.time));
        }
        if let Some(last) = self.keyframes.last() {
            if keyframe.time < last.time {
                return Err(TrackError::OutOfOrder {
                    time: keyframe.time,
                    last: last.time,
                });
            }
        }
        self.keyframes.push(keyframe);
        Ok(self.keyframes.len() - 1)
    }

    /// Remove all keyframes
    pub fn clear(&mut self) {
        self.keyframes.clear();
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// Get keyframe count
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the track has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Get the duration (time of last keyframe)
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Get the last keyframe
    pub fn last(&self) -> Option<&Keyframe<T>> {
        self.keyframes.last()
    }

    fn references(&self) -> impl Iterator<Item = ActorHandle> + '_ {
        self.keyframes.iter().filter_map(|k| k.value.reference())
    }
}

/// Translation and rotation tracks played together, plus the completion policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Camera position keyframes
    pub translation: Track<TranslationTarget>,
    /// Camera rotation keyframes
    pub rotation: Track<RotationTarget>,
    /// What happens when playback reaches the last keyframe
    pub playback_mode: PlaybackMode,
    /// Whether the player may rotate the camera during playback
    pub allow_user_rotation: bool,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to an empty timeline with default settings
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether neither track has keyframes
    pub fn is_empty(&self) -> bool {
        self.translation.is_empty() && self.rotation.is_empty()
    }

    /// Time of the last keyframe across both tracks
    pub fn duration(&self) -> f32 {
        self.translation.duration().max(self.rotation.duration())
    }

    /// Whether any keyframe follows the given actor
    pub fn references_actor(&self, actor: ActorHandle) -> bool {
        self.translation
            .references()
            .chain(self.rotation.references())
            .any(|a| a == actor)
    }

    /// Serialize to pretty RON for inspection
    pub fn to_ron_string(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ReferenceBinding;
    use crate::keyframe::{Rotation, RotationKeyframe, TranslationKeyframe};
    use glam::Vec3;

    #[test]
    fn test_push_keeps_order() {
        let mut track = Track::new();
        assert_eq!(track.push(TranslationKeyframe::at_camera(0.0)), Ok(0));
        assert_eq!(track.push(TranslationKeyframe::at_position(0.5, Vec3::ZERO)), Ok(1));
        assert_eq!(track.push(TranslationKeyframe::at_position(0.5, Vec3::X)), Ok(2));

        let err = track.push(TranslationKeyframe::at_camera(0.25)).unwrap_err();
        assert_eq!(err, TrackError::OutOfOrder { time: 0.25, last: 0.5 });
        assert_eq!(track.len(), 3);
        assert_eq!(track.duration(), 0.5);
    }

    #[test]
    fn test_rejects_invalid_time() {
        let mut track: Track<RotationTarget> = Track::new();
        assert!(matches!(
            track.push(RotationKeyframe::at_camera(-1.0)),
            Err(TrackError::InvalidTime(_))
        ));
        assert!(track.push(RotationKeyframe::at_camera(f32::NAN)).is_err());
        assert!(track.is_empty());
    }

    #[test]
    fn test_timeline_duration_and_clear() {
        let actor = ActorHandle(3);
        let mut timeline = Timeline::new();
        timeline.translation.push(TranslationKeyframe::at_camera(0.0)).unwrap();
        timeline
            .rotation
            .push(RotationKeyframe::at_reference(1.5, ReferenceBinding::world(actor, Rotation::ZERO)))
            .unwrap();
        timeline.playback_mode = PlaybackMode::Wait;

        assert_eq!(timeline.duration(), 1.5);
        assert!(timeline.references_actor(actor));
        assert!(!timeline.references_actor(ActorHandle(4)));
        assert_eq!(timeline.rotation.len(), 1);

        timeline.clear();
        assert!(timeline.is_empty());
        assert_eq!(timeline.playback_mode, PlaybackMode::End);
    }

    #[test]
    fn test_ron_export() {
        let mut timeline = Timeline::new();
        timeline
            .translation
            .push(TranslationKeyframe::at_position(2.0, Vec3::new(1.0, 2.0, 3.0)))
            .unwrap();
        let ron_str = timeline.to_ron_string().unwrap();
        let loaded: Timeline = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, timeline);
    }
}
