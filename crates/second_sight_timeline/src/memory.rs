// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deterministic in-process timeline engine.
//!
//! Stores timelines, advances playback time on [`InMemoryEngine::advance`]
//! and queues the same events a real engine would send. It does not move a
//! camera. Every trait call is counted so callers can assert on exactly what
//! was requested.

use crate::engine::{
    EngineError, PlaybackEvent, PlaybackMode, PlaybackOptions, PlaybackPace, TimelineEngine,
    TimelineId,
};
use crate::keyframe::{RotationKeyframe, TranslationKeyframe};
use crate::track::Timeline;
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Number of calls made to each engine operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `register_timeline`
    pub register_timeline: usize,
    /// `clear_timeline`
    pub clear_timeline: usize,
    /// `add_translation_point`
    pub add_translation_point: usize,
    /// `add_rotation_point`
    pub add_rotation_point: usize,
    /// `set_playback_mode`
    pub set_playback_mode: usize,
    /// `allow_user_rotation`
    pub allow_user_rotation: usize,
    /// `start_playback`
    pub start_playback: usize,
    /// `switch_playback`
    pub switch_playback: usize,
    /// `stop_playback`
    pub stop_playback: usize,
}

impl CallCounts {
    /// Calls that changed timeline content
    pub fn mutations(&self) -> usize {
        self.clear_timeline
            + self.add_translation_point
            + self.add_rotation_point
            + self.set_playback_mode
            + self.allow_user_rotation
    }
}

#[derive(Debug, Clone, Copy)]
struct ActivePlayback {
    id: TimelineId,
    time: f32,
    options: PlaybackOptions,
    waiting: bool,
}

/// Timeline engine that lives entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    registered: bool,
    timelines: IndexMap<TimelineId, Timeline>,
    next_id: u64,
    playback: Option<ActivePlayback>,
    events: VecDeque<PlaybackEvent>,
    calls: CallCounts,
    refuse_registration: bool,
    insertion_budget: Option<usize>,
    failing_insertions: usize,
}

impl InMemoryEngine {
    /// Create an engine with no timelines
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every registration call fail
    pub fn refusing_registration() -> Self {
        Self {
            refuse_registration: true,
            ..Self::default()
        }
    }

    /// Accept this many more keyframe insertions, then fail the rest.
    /// `None` removes the limit.
    pub fn set_insertion_budget(&mut self, budget: Option<usize>) {
        self.insertion_budget = budget;
    }

    /// Fail the next `count` keyframe insertions, then accept again
    pub fn fail_next_insertions(&mut self, count: usize) {
        self.failing_insertions = count;
    }

    /// Get call counts
    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    /// Get a timeline
    pub fn timeline(&self, id: TimelineId) -> Option<&Timeline> {
        self.timelines.get(&id)
    }

    /// Number of registered timelines
    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    /// Current playback time of the playing timeline
    pub fn playback_time(&self) -> Option<f32> {
        self.playback.map(|p| p.time)
    }

    /// Options the playing timeline was started with
    pub fn playback_options(&self) -> Option<PlaybackOptions> {
        self.playback.map(|p| p.options)
    }

    /// Pending events, oldest first
    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        self.events.drain(..).collect()
    }

    /// Export a timeline as RON
    pub fn export_timeline(&self, id: TimelineId) -> Option<String> {
        let timeline = self.timelines.get(&id)?;
        match timeline.to_ron_string() {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Could not export {id}: {e}");
                None
            }
        }
    }

    /// Stop playback from outside, as if the player cancelled it
    pub fn interrupt(&mut self) {
        if let Some(playback) = self.playback.take() {
            self.events.push_back(PlaybackEvent::PlaybackStopped(playback.id));
        }
    }

    /// Advance playback by `delta_time` seconds of game time
    pub fn advance(&mut self, delta_time: f32) {
        let Some(mut playback) = self.playback else {
            return;
        };
        let duration = self
            .timelines
            .get(&playback.id)
            .map_or(0.0, Timeline::duration);
        let mode = self
            .timelines
            .get(&playback.id)
            .map_or(PlaybackMode::End, |t| t.playback_mode);

        let rate = match playback.options.pace {
            PlaybackPace::Speed(speed) => speed,
            PlaybackPace::Duration(total) if total > 0.0 => duration / total,
            PlaybackPace::Duration(_) => 1.0,
        };
        playback.time += delta_time * rate;

        if playback.time >= duration {
            match mode {
                PlaybackMode::End => {
                    self.playback = None;
                    self.events.push_back(PlaybackEvent::PlaybackStopped(playback.id));
                    return;
                }
                PlaybackMode::Loop { time_offset } => {
                    let span = (duration - time_offset).max(f32::EPSILON);
                    playback.time = time_offset + (playback.time - duration) % span;
                }
                PlaybackMode::Wait => {
                    playback.time = duration;
                    if !playback.waiting {
                        playback.waiting = true;
                        self.events.push_back(PlaybackEvent::PlaybackWaiting(playback.id));
                    }
                }
            }
        }

        self.playback = Some(playback);
    }

    fn ensure_registered(&self) -> Result<(), EngineError> {
        if self.registered {
            Ok(())
        } else {
            Err(EngineError::NotRegistered)
        }
    }

    fn timeline_mut(&mut self, id: TimelineId) -> Result<&mut Timeline, EngineError> {
        self.timelines
            .get_mut(&id)
            .ok_or(EngineError::UnknownTimeline(id))
    }

    fn consume_insertion(&mut self, id: TimelineId) -> Result<(), EngineError> {
        if self.failing_insertions > 0 {
            self.failing_insertions -= 1;
            return Err(EngineError::InsertionFailed(id));
        }
        match self.insertion_budget {
            Some(0) => Err(EngineError::InsertionFailed(id)),
            Some(ref mut remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl TimelineEngine for InMemoryEngine {
    fn register_plugin(&mut self) -> Result<(), EngineError> {
        if self.refuse_registration {
            return Err(EngineError::RegistrationRefused("plugin".into()));
        }
        self.registered = true;
        Ok(())
    }

    fn register_timeline(&mut self) -> Result<TimelineId, EngineError> {
        self.calls.register_timeline += 1;
        self.ensure_registered()?;
        if self.refuse_registration {
            return Err(EngineError::RegistrationRefused("timeline".into()));
        }
        self.next_id += 1;
        let id = TimelineId(self.next_id);
        self.timelines.insert(id, Timeline::new());
        Ok(id)
    }

    fn clear_timeline(&mut self, id: TimelineId) -> Result<(), EngineError> {
        self.calls.clear_timeline += 1;
        self.timeline_mut(id)?.clear();
        Ok(())
    }

    fn add_translation_point(
        &mut self,
        id: TimelineId,
        keyframe: &TranslationKeyframe,
    ) -> Result<usize, EngineError> {
        self.calls.add_translation_point += 1;
        self.timeline_mut(id)?;
        self.consume_insertion(id)?;
        self.timeline_mut(id)?
            .translation
            .push(*keyframe)
            .map_err(|source| EngineError::KeyframeRejected { timeline: id, source })
    }

    fn add_rotation_point(
        &mut self,
        id: TimelineId,
        keyframe: &RotationKeyframe,
    ) -> Result<usize, EngineError> {
        self.calls.add_rotation_point += 1;
        self.timeline_mut(id)?;
        self.consume_insertion(id)?;
        self.timeline_mut(id)?
            .rotation
            .push(*keyframe)
            .map_err(|source| EngineError::KeyframeRejected { timeline: id, source })
    }

    fn set_playback_mode(&mut self, id: TimelineId, mode: PlaybackMode) -> Result<(), EngineError> {
        self.calls.set_playback_mode += 1;
        self.timeline_mut(id)?.playback_mode = mode;
        Ok(())
    }

    fn allow_user_rotation(&mut self, id: TimelineId, allow: bool) -> Result<(), EngineError> {
        self.calls.allow_user_rotation += 1;
        self.timeline_mut(id)?.allow_user_rotation = allow;
        Ok(())
    }

    fn start_playback(&mut self, id: TimelineId, options: &PlaybackOptions) -> Result<(), EngineError> {
        self.calls.start_playback += 1;
        if self.timeline_mut(id)?.is_empty() {
            return Err(EngineError::EmptyTimeline(id));
        }
        if let Some(active) = self.playback {
            return Err(EngineError::AlreadyPlaying(active.id));
        }
        self.playback = Some(ActivePlayback {
            id,
            time: 0.0,
            options: *options,
            waiting: false,
        });
        self.events.push_back(PlaybackEvent::PlaybackStarted(id));
        Ok(())
    }

    fn switch_playback(&mut self, from: Option<TimelineId>, to: TimelineId) -> Result<(), EngineError> {
        self.calls.switch_playback += 1;
        if self.timeline_mut(to)?.is_empty() {
            return Err(EngineError::EmptyTimeline(to));
        }
        let Some(active) = self.playback else {
            return Err(EngineError::Idle);
        };
        if let Some(from) = from {
            if from != active.id {
                return Err(EngineError::NotPlaying(from));
            }
        }
        self.playback = Some(ActivePlayback {
            id: to,
            time: 0.0,
            options: active.options,
            waiting: false,
        });
        Ok(())
    }

    fn stop_playback(&mut self, id: TimelineId) -> Result<(), EngineError> {
        self.calls.stop_playback += 1;
        match self.playback {
            Some(active) if active.id == id => {
                self.playback = None;
                self.events.push_back(PlaybackEvent::PlaybackStopped(id));
                Ok(())
            }
            _ => Err(EngineError::NotPlaying(id)),
        }
    }

    fn is_playback_running(&self, id: TimelineId) -> bool {
        self.playback.is_some_and(|p| p.id == id)
    }

    fn active_timeline(&self) -> Option<TimelineId> {
        self.playback.map(|p| p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn engine_with_timeline(duration: f32, mode: PlaybackMode) -> (InMemoryEngine, TimelineId) {
        let mut engine = InMemoryEngine::new();
        engine.register_plugin().unwrap();
        let id = engine.register_timeline().unwrap();
        engine
            .add_translation_point(id, &TranslationKeyframe::at_camera(0.0))
            .unwrap();
        engine
            .add_translation_point(id, &TranslationKeyframe::at_position(duration, Vec3::Z))
            .unwrap();
        engine.set_playback_mode(id, mode).unwrap();
        (engine, id)
    }

    #[test]
    fn test_register_requires_plugin() {
        let mut engine = InMemoryEngine::new();
        assert_eq!(engine.register_timeline(), Err(EngineError::NotRegistered));
        engine.register_plugin().unwrap();
        assert_eq!(engine.register_timeline(), Ok(TimelineId(1)));
        assert_eq!(engine.register_timeline(), Ok(TimelineId(2)));
        assert_eq!(engine.timeline_count(), 2);
    }

    #[test]
    fn test_refusing_engine() {
        let mut engine = InMemoryEngine::refusing_registration();
        assert!(engine.register_plugin().is_err());
        assert!(engine.register_timeline().is_err());
    }

    #[test]
    fn test_end_mode_stops() {
        let (mut engine, id) = engine_with_timeline(1.0, PlaybackMode::End);
        engine.start_playback(id, &PlaybackOptions::default()).unwrap();
        assert_eq!(engine.take_events(), vec![PlaybackEvent::PlaybackStarted(id)]);

        engine.advance(0.6);
        assert!(engine.is_playback_running(id));
        engine.advance(0.6);
        assert!(!engine.is_playback_running(id));
        assert_eq!(engine.take_events(), vec![PlaybackEvent::PlaybackStopped(id)]);
    }

    #[test]
    fn test_wait_mode_holds_and_notifies_once() {
        let (mut engine, id) = engine_with_timeline(0.5, PlaybackMode::Wait);
        engine.start_playback(id, &PlaybackOptions::default()).unwrap();
        engine.take_events();

        engine.advance(1.0);
        engine.advance(1.0);
        assert!(engine.is_playback_running(id));
        assert_eq!(engine.playback_time(), Some(0.5));
        assert_eq!(engine.take_events(), vec![PlaybackEvent::PlaybackWaiting(id)]);
    }

    #[test]
    fn test_loop_mode_wraps() {
        let (mut engine, id) = engine_with_timeline(1.0, PlaybackMode::Loop { time_offset: 0.0 });
        engine.start_playback(id, &PlaybackOptions::default()).unwrap();
        engine.advance(1.25);
        let time = engine.playback_time().unwrap();
        assert!((time - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_duration_pace() {
        let (mut engine, id) = engine_with_timeline(2.0, PlaybackMode::End);
        let options = PlaybackOptions {
            pace: PlaybackPace::Duration(1.0),
            ..PlaybackOptions::default()
        };
        engine.start_playback(id, &options).unwrap();
        engine.advance(0.5);
        assert_eq!(engine.playback_time(), Some(1.0));
    }

    #[test]
    fn test_switch_and_stop() {
        let (mut engine, first) = engine_with_timeline(1.0, PlaybackMode::Wait);
        let second = engine.register_timeline().unwrap();
        assert_eq!(
            engine.switch_playback(None, second),
            Err(EngineError::EmptyTimeline(second))
        );
        engine
            .add_rotation_point(second, &RotationKeyframe::at_camera(0.0))
            .unwrap();
        assert_eq!(engine.switch_playback(None, second), Err(EngineError::Idle));

        engine.start_playback(first, &PlaybackOptions::default()).unwrap();
        engine.advance(0.5);
        assert_eq!(
            engine.switch_playback(Some(second), first),
            Err(EngineError::NotPlaying(second))
        );
        engine.switch_playback(Some(first), second).unwrap();
        assert_eq!(engine.active_timeline(), Some(second));
        assert_eq!(engine.playback_time(), Some(0.0));

        assert!(engine.stop_playback(first).is_err());
        engine.stop_playback(second).unwrap();
        assert_eq!(engine.active_timeline(), None);
        let calls = engine.calls();
        assert_eq!((calls.start_playback, calls.switch_playback, calls.stop_playback), (1, 4, 2));
    }

    #[test]
    fn test_insertion_budget() {
        let (mut engine, id) = engine_with_timeline(1.0, PlaybackMode::End);
        engine.set_insertion_budget(Some(1));
        assert!(engine
            .add_rotation_point(id, &RotationKeyframe::at_camera(0.0))
            .is_ok());
        assert_eq!(
            engine.add_rotation_point(id, &RotationKeyframe::at_camera(0.5)),
            Err(EngineError::InsertionFailed(id))
        );
        engine.set_insertion_budget(None);
        assert!(engine
            .add_rotation_point(id, &RotationKeyframe::at_camera(0.5))
            .is_ok());
    }

    #[test]
    fn test_failed_insertions_recover() {
        let (mut engine, id) = engine_with_timeline(1.0, PlaybackMode::End);
        engine.fail_next_insertions(1);
        assert_eq!(
            engine.add_rotation_point(id, &RotationKeyframe::at_camera(0.0)),
            Err(EngineError::InsertionFailed(id))
        );
        assert!(engine
            .add_rotation_point(id, &RotationKeyframe::at_camera(0.0))
            .is_ok());
    }

    #[test]
    fn test_out_of_order_rejected() {
        let (mut engine, id) = engine_with_timeline(1.0, PlaybackMode::End);
        let result = engine.add_translation_point(id, &TranslationKeyframe::at_camera(0.5));
        assert!(matches!(result, Err(EngineError::KeyframeRejected { .. })));
    }

    #[test]
    fn test_interrupt_emits_stop() {
        let (mut engine, id) = engine_with_timeline(1.0, PlaybackMode::Wait);
        engine.start_playback(id, &PlaybackOptions::default()).unwrap();
        engine.take_events();
        engine.interrupt();
        assert_eq!(engine.take_events(), vec![PlaybackEvent::PlaybackStopped(id)]);
        assert!(engine.export_timeline(id).is_some());
    }
}
