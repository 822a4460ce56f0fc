// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effect errors.

use crate::state::Segment;
use second_sight_timeline::{ActorHandle, EngineError, TimelineId};

/// Why a requested transition did not happen.
///
/// None of these are fatal. The camera is left exactly as it was and the
/// next trigger is the retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    /// No provider offered a valid target
    #[error("No valid target available")]
    NoTargetAvailable,

    /// Target exists but no camera anchor could be derived from its skeleton
    #[error("No camera anchor on {0}")]
    AnchorUnresolvable(ActorHandle),

    /// The timeline engine never initialised; the effect is off for the session
    #[error("Timeline engine unavailable")]
    EngineUnavailable,

    /// A keyframe insertion failed while rebuilding a timeline
    #[error("Could not build the {segment} timeline: {source}")]
    TimelineBuildFailure {
        /// Timeline being built
        segment: Segment,
        /// Engine failure
        #[source]
        source: EngineError,
    },

    /// Effect is already running towards or at this target
    #[error("Effect is already active")]
    AlreadyActive,

    /// Effect is not running (or already returning)
    #[error("Effect is already inactive")]
    AlreadyInactive,

    /// Triggers are ignored while the game is paused
    #[error("Game is paused")]
    GamePaused,

    /// The engine is playing a timeline that is not ours
    #[error("Timeline engine is busy with {0}")]
    EngineBusy(TimelineId),

    /// Engine refused a start, switch or stop request
    #[error("Playback request failed: {0}")]
    Playback(#[source] EngineError),
}

/// Result type for effect operations
pub type Result<T> = std::result::Result<T, EffectError>;
