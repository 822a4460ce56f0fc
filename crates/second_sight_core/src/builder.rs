// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe layout of the three effect timelines.
//!
//! Building is split in two. [`TimelineBuilder`] lays out keyframes into a
//! plain [`Timeline`] value with no engine involved, and [`write_timeline`]
//! replaces the content of an engine timeline with it. A timeline id is never
//! released, only cleared and rewritten.

use crate::anchor::AnchorPoint;
use crate::config::PathConfig;
use crate::error::{EffectError, Result};
use crate::state::Segment;
use crate::timing::TransitionTiming;
use glam::Vec3;
use second_sight_timeline::{
    ActorHandle, EngineError, Easing, InterpolationMode, Keyframe, PlaybackMode, ReferenceBinding,
    Rotation, RotationKeyframe, Timeline, TimelineEngine, TimelineId, TrackError, TranslationKeyframe,
};

/// Camera position and rotation snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// World position
    pub position: Vec3,
    /// Pitch and yaw
    pub rotation: Rotation,
}

/// Lays out the to-target, at-target and to-previous timelines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineBuilder {
    timing: TransitionTiming,
    face_heading_at: f32,
    face_target_at: f32,
    return_face_target_at: f32,
}

impl TimelineBuilder {
    /// Create a builder
    pub fn new(timing: TransitionTiming, path: &PathConfig) -> Self {
        Self {
            timing,
            face_heading_at: path.face_heading_at,
            face_target_at: path.face_target_at,
            return_face_target_at: path.return_face_target_at,
        }
    }

    /// Travel from the live camera to the anchor on `target`.
    ///
    /// `target_position` drives the duration; without it the fallback
    /// duration is used.
    pub fn to_target(
        &self,
        target: ActorHandle,
        anchor: &AnchorPoint,
        camera_position: Vec3,
        target_position: Option<Vec3>,
    ) -> std::result::Result<Timeline, TrackError> {
        let duration = self.timing.duration(camera_position, target_position);
        let mut timeline = Timeline::new();

        timeline.translation.push(smooth(TranslationKeyframe::at_camera(0.0)))?;
        timeline.translation.push(smooth(TranslationKeyframe::at_reference(
            duration,
            ReferenceBinding::local(target, anchor.offset),
        )))?;

        timeline.rotation.push(smooth(RotationKeyframe::at_camera(0.0)))?;
        timeline.rotation.push(smooth(RotationKeyframe::at_reference(
            self.face_heading_at * duration,
            ReferenceBinding::world(target, Rotation::ZERO),
        )))?;
        timeline.rotation.push(smooth(RotationKeyframe::at_reference(
            self.face_target_at * duration,
            ReferenceBinding::world(target, Rotation::ZERO),
        )))?;
        timeline.rotation.push(smooth(RotationKeyframe::at_reference(
            duration,
            ReferenceBinding::local(target, Rotation::ZERO),
        )))?;

        timeline.playback_mode = PlaybackMode::Wait;
        tracing::debug!("Laid out to-target for {target} over {duration:.2}s");
        Ok(timeline)
    }

    /// Hold at the anchor on `target` with free look enabled
    pub fn at_target(
        &self,
        target: ActorHandle,
        anchor: &AnchorPoint,
    ) -> std::result::Result<Timeline, TrackError> {
        let mut timeline = Timeline::new();
        timeline.translation.push(smooth(TranslationKeyframe::at_reference(
            0.0,
            ReferenceBinding::local(target, anchor.offset),
        )))?;
        timeline.rotation.push(smooth(RotationKeyframe::at_reference(
            0.0,
            ReferenceBinding::local(target, Rotation::ZERO),
        )))?;
        timeline.playback_mode = PlaybackMode::Wait;
        timeline.allow_user_rotation = true;
        Ok(timeline)
    }

    /// Travel from the live camera back to `previous`
    pub fn to_previous(
        &self,
        target: ActorHandle,
        camera_position: Vec3,
        previous: &CameraPose,
    ) -> std::result::Result<Timeline, TrackError> {
        let duration = self.timing.duration(camera_position, Some(previous.position));
        let mut timeline = Timeline::new();

        timeline.translation.push(smooth(TranslationKeyframe::at_camera(0.0)))?;
        timeline
            .translation
            .push(smooth(TranslationKeyframe::at_position(duration, previous.position)))?;

        timeline.rotation.push(smooth(RotationKeyframe::at_camera(0.0)))?;
        timeline.rotation.push(smooth(RotationKeyframe::at_reference(
            self.return_face_target_at * duration,
            ReferenceBinding::world(target, Rotation::ZERO),
        )))?;
        timeline
            .rotation
            .push(smooth(RotationKeyframe::at_angles(duration, previous.rotation)))?;

        timeline.playback_mode = PlaybackMode::End;
        tracing::debug!("Laid out to-previous over {duration:.2}s");
        Ok(timeline)
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new(TransitionTiming::default(), &PathConfig::default())
    }
}

fn smooth<T>(keyframe: Keyframe<T>) -> Keyframe<T> {
    keyframe
        .with_easing(Easing::BOTH)
        .with_interpolation(InterpolationMode::Cubic)
}

/// Replace the content of engine timeline `id` with `timeline`.
///
/// Stops at the first failed insertion. Points already inserted stay until
/// the next rebuild clears them.
pub fn write_timeline<E: TimelineEngine + ?Sized>(
    engine: &mut E,
    id: TimelineId,
    segment: Segment,
    timeline: &Timeline,
) -> Result<()> {
    let failed = |source: EngineError| {
        tracing::warn!("Building the {segment} timeline failed: {source}");
        EffectError::TimelineBuildFailure { segment, source }
    };

    engine.clear_timeline(id).map_err(failed)?;
    for keyframe in timeline.translation.keyframes() {
        engine.add_translation_point(id, keyframe).map_err(failed)?;
    }
    for keyframe in timeline.rotation.keyframes() {
        engine.add_rotation_point(id, keyframe).map_err(failed)?;
    }
    engine
        .set_playback_mode(id, timeline.playback_mode)
        .map_err(failed)?;
    engine
        .allow_user_rotation(id, timeline.allow_user_rotation)
        .map_err(failed)?;
    Ok(())
}

/// Map a layout error to the build failure of `segment`
pub(crate) fn layout_failed(segment: Segment, id: TimelineId) -> impl Fn(TrackError) -> EffectError {
    move |source| {
        tracing::warn!("Laying out the {segment} timeline failed: {source}");
        EffectError::TimelineBuildFailure {
            segment,
            source: EngineError::KeyframeRejected { timeline: id, source },
        }
    }
}
