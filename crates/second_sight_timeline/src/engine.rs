// SPDX-License-Identifier: MIT OR Apache-2.0
//! Contract of the camera timeline engine.
//!
//! The engine owns timelines by id, accepts keyframes one at a time and
//! drives the game camera while a timeline plays. Only one timeline plays at
//! a time. Progress is reported back through [`PlaybackEvent`]s that the host
//! delivers to whoever registered the timeline.

use crate::keyframe::{RotationKeyframe, TranslationKeyframe};
use crate::track::TrackError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-issued timeline identifier (never zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimelineId(pub u64);

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timeline {}", self.0)
    }
}

/// Completion policy of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PlaybackMode {
    /// Stop playback after the last keyframe
    #[default]
    End,
    /// Jump back to `time_offset` after the last keyframe
    Loop {
        /// Time the loop restarts from
        time_offset: f32,
    },
    /// Hold the last keyframe until told to switch or stop
    Wait,
}

/// How fast a timeline plays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlaybackPace {
    /// Multiplier on keyframe time
    Speed(f32),
    /// Stretch the whole timeline to this many seconds
    Duration(f32),
}

impl Default for PlaybackPace {
    fn default() -> Self {
        Self::Speed(1.0)
    }
}

/// Options for starting playback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackOptions {
    /// Playback speed or total duration
    pub pace: PlaybackPace,
    /// Ease in at the start of the whole timeline
    pub global_ease_in: bool,
    /// Ease out at the end of the whole timeline
    pub global_ease_out: bool,
    /// Keep the camera above the ground
    pub follow_ground: bool,
    /// Minimum height above ground when following it
    pub min_height_above_ground: f32,
    /// Keep HUD menus visible during playback
    pub show_menus: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            pace: PlaybackPace::default(),
            global_ease_in: false,
            global_ease_out: false,
            follow_ground: true,
            min_height_above_ground: 0.0,
            show_menus: false,
        }
    }
}

/// Notification emitted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackEvent {
    /// Playback of a timeline started
    PlaybackStarted(TimelineId),
    /// Playback of a timeline stopped
    PlaybackStopped(TimelineId),
    /// A wait-mode timeline reached its last keyframe and is holding
    PlaybackWaiting(TimelineId),
}

impl PlaybackEvent {
    /// Timeline the event is about
    pub fn timeline(&self) -> TimelineId {
        match *self {
            Self::PlaybackStarted(id) | Self::PlaybackStopped(id) | Self::PlaybackWaiting(id) => id,
        }
    }
}

/// Engine errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The caller never registered with the engine
    #[error("Plugin is not registered with the timeline engine")]
    NotRegistered,

    /// The engine refused to register something
    #[error("Registration refused: {0}")]
    RegistrationRefused(String),

    /// Id does not name a timeline owned by the caller
    #[error("Unknown {0}")]
    UnknownTimeline(TimelineId),

    /// Keyframe could not be inserted
    #[error("Keyframe rejected by {timeline}: {source}")]
    KeyframeRejected {
        /// Target timeline
        timeline: TimelineId,
        /// Why the track refused it
        #[source]
        source: TrackError,
    },

    /// Engine declined the insertion without a reason
    #[error("Insertion into {0} failed")]
    InsertionFailed(TimelineId),

    /// Playback cannot start on a timeline without keyframes
    #[error("{0} has no keyframes")]
    EmptyTimeline(TimelineId),

    /// Another timeline is already playing
    #[error("{0} is already playing")]
    AlreadyPlaying(TimelineId),

    /// The timeline is not the one playing
    #[error("{0} is not playing")]
    NotPlaying(TimelineId),

    /// Nothing is playing
    #[error("No timeline is playing")]
    Idle,
}

/// Camera timeline engine
pub trait TimelineEngine {
    /// Register the caller with the engine
    fn register_plugin(&mut self) -> Result<(), EngineError>;

    /// Allocate a new, empty timeline
    fn register_timeline(&mut self) -> Result<TimelineId, EngineError>;

    /// Remove every keyframe from a timeline and reset its settings
    fn clear_timeline(&mut self, id: TimelineId) -> Result<(), EngineError>;

    /// Append a translation keyframe, returning its index
    fn add_translation_point(
        &mut self,
        id: TimelineId,
        keyframe: &TranslationKeyframe,
    ) -> Result<usize, EngineError>;

    /// Append a rotation keyframe, returning its index
    fn add_rotation_point(
        &mut self,
        id: TimelineId,
        keyframe: &RotationKeyframe,
    ) -> Result<usize, EngineError>;

    /// Set what happens when playback reaches the end
    fn set_playback_mode(&mut self, id: TimelineId, mode: PlaybackMode) -> Result<(), EngineError>;

    /// Allow or forbid user camera rotation while the timeline plays
    fn allow_user_rotation(&mut self, id: TimelineId, allow: bool) -> Result<(), EngineError>;

    /// Start playing a timeline from its beginning
    fn start_playback(&mut self, id: TimelineId, options: &PlaybackOptions) -> Result<(), EngineError>;

    /// Hand the camera from the playing timeline over to another one.
    ///
    /// `from` of `None` means whichever timeline is playing. Switching a
    /// timeline to itself restarts it.
    fn switch_playback(&mut self, from: Option<TimelineId>, to: TimelineId) -> Result<(), EngineError>;

    /// Stop playing a timeline
    fn stop_playback(&mut self, id: TimelineId) -> Result<(), EngineError>;

    /// Whether the given timeline is playing
    fn is_playback_running(&self, id: TimelineId) -> bool;

    /// The timeline currently playing, from any plugin
    fn active_timeline(&self) -> Option<TimelineId>;
}
