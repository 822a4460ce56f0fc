// SPDX-License-Identifier: MIT OR Apache-2.0
//! The effect context object.
//!
//! [`SecondSight`] owns the three timeline ids, the effect state and the
//! session captured at activation. Hosts construct one at startup, call
//! [`SecondSight::initialize`] once, route the hotkey to
//! [`SecondSight::toggle`] (or the script entry points to
//! [`SecondSight::activate`] / [`SecondSight::deactivate`]), forward engine
//! events to [`SecondSight::handle_event`] and call [`SecondSight::update`]
//! every frame.
//!
//! Every request either completes or leaves state, session and camera as
//! they were. The one exception is a redirect whose failure comes after the
//! playing timeline already carries the new target: the effect then stops
//! and the session ends.

use crate::anchor::{AnchorLocator, AnchorPoint};
use crate::builder::{layout_failed, write_timeline, CameraPose, TimelineBuilder};
use crate::clamp::RotationClamp;
use crate::config::SecondSightConfig;
use crate::error::{EffectError, Result};
use crate::state::{transition, Action, EffectState, Refusal, Segment, Trigger};
use crate::target::{CrosshairProvider, ResolvedTarget, TargetProvider, TargetResolver, TargetSource};
use crate::timing::TransitionTiming;
use crate::world::{CameraMode, GameWorld};
use second_sight_timeline::{
    ActorHandle, EngineError, PlaybackEvent, PlaybackOptions, PlaybackPace, Rotation, Timeline,
    TimelineEngine, TimelineId,
};

/// Ids of the three timelines, registered once and reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectTimelines {
    /// Camera to target
    pub to_target: TimelineId,
    /// Held at target
    pub at_target: TimelineId,
    /// Back to the captured camera pose
    pub to_previous: TimelineId,
}

impl EffectTimelines {
    /// Id of a segment's timeline
    pub fn id(&self, segment: Segment) -> TimelineId {
        match segment {
            Segment::ToTarget => self.to_target,
            Segment::AtTarget => self.at_target,
            Segment::ToPrevious => self.to_previous,
        }
    }

    /// Segment an id belongs to, if it is one of ours
    pub fn segment_of(&self, id: TimelineId) -> Option<Segment> {
        Segment::ALL.into_iter().find(|segment| self.id(*segment) == id)
    }
}

/// Camera state captured when the effect starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviousCamera {
    /// Pose the return timeline ends at
    pub pose: CameraPose,
    /// Camera mode at activation
    pub mode: Option<CameraMode>,
    /// Orbit offset of a third-person-like mode, written back at the end
    pub free_rotation: Option<Rotation>,
}

impl PreviousCamera {
    /// Snapshot the live camera
    pub fn capture(world: &dyn GameWorld) -> Self {
        let mode = world.camera_mode();
        let free_rotation = if mode.is_some_and(CameraMode::has_free_rotation) {
            world.third_person_free_rotation()
        } else {
            None
        };
        Self {
            pose: CameraPose {
                position: world.camera_position(),
                rotation: world.camera_rotation(),
            },
            mode,
            free_rotation,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Session {
    target: ActorHandle,
    anchor: AnchorPoint,
    source: TargetSource,
    previous: PreviousCamera,
}

/// Look-at-target camera effect
#[derive(Debug)]
pub struct SecondSight<E> {
    engine: E,
    config: SecondSightConfig,
    resolver: TargetResolver,
    builder: TimelineBuilder,
    clamp: RotationClamp,
    timelines: Option<EffectTimelines>,
    init_attempted: bool,
    state: EffectState,
    session: Option<Session>,
}

impl<E: TimelineEngine> SecondSight<E> {
    /// Create the effect around an engine. Nothing is registered until
    /// [`initialize`](Self::initialize).
    pub fn new(engine: E, config: SecondSightConfig) -> Self {
        let locator = AnchorLocator::new(config.anchor.forward_bias);
        let mut resolver = TargetResolver::new(locator, config.targeting.max_target_distance);
        resolver.add_provider(Box::new(CrosshairProvider));

        Self {
            engine,
            builder: TimelineBuilder::new(TransitionTiming::new(&config.timing), &config.path),
            clamp: RotationClamp::new(&config.clamp),
            config,
            resolver,
            timelines: None,
            init_attempted: false,
            state: EffectState::Inactive,
            session: None,
        }
    }

    /// Add a target provider ahead of or behind the crosshair, by its source
    pub fn add_provider(&mut self, provider: Box<dyn TargetProvider>) {
        self.resolver.add_provider(provider);
    }

    /// Register with the engine and claim the three timelines.
    ///
    /// Runs once. If it fails the effect stays off and every later request
    /// reports [`EffectError::EngineUnavailable`].
    pub fn initialize(&mut self) -> Result<()> {
        if self.init_attempted {
            return self.timelines.map(|_| ()).ok_or(EffectError::EngineUnavailable);
        }
        self.init_attempted = true;

        match register(&mut self.engine) {
            Ok(timelines) => {
                tracing::info!(
                    "Registered timelines: to-target {}, at-target {}, to-previous {}",
                    timelines.to_target,
                    timelines.at_target,
                    timelines.to_previous
                );
                self.timelines = Some(timelines);
                self.resolver.set_indicators_visible(true);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Timeline engine unavailable, effect disabled: {e}");
                Err(EffectError::EngineUnavailable)
            }
        }
    }

    /// Start the effect on `target`, or on whatever the providers offer.
    ///
    /// While already engaged a different target redirects the camera to it;
    /// the same target is refused. While returning, the same target resumes
    /// the approach.
    pub fn activate(&mut self, world: &mut dyn GameWorld, target: Option<ActorHandle>) -> Result<()> {
        let timelines = self.ready(world)?;
        if !self.state.is_active() {
            self.ensure_engine_free()?;
        }

        let resolved = self
            .resolver
            .resolve_or(world, target)
            .inspect_err(|e| tracing::warn!("Activation failed: {e}"))?;

        let new_target = self
            .session
            .as_ref()
            .is_some_and(|session| session.target != resolved.actor);
        let (next, action) = transition(self.state, Trigger::Activate { new_target });
        self.run(world, timelines, next, action, Some(resolved))
    }

    /// Send the camera back to where it was before activation
    pub fn deactivate(&mut self, world: &mut dyn GameWorld) -> Result<()> {
        let timelines = self.ready(world)?;
        let (next, action) = transition(self.state, Trigger::Deactivate);
        self.run(world, timelines, next, action, None)
    }

    /// Hotkey entry point
    pub fn toggle(&mut self, world: &mut dyn GameWorld) -> Result<()> {
        let timelines = self.ready(world)?;
        if !self.state.is_active() {
            return self.activate(world, None);
        }
        let (next, action) = transition(self.state, Trigger::Toggle);
        self.run(world, timelines, next, action, None)
    }

    /// React to a notification from the engine
    pub fn handle_event(&mut self, event: PlaybackEvent, world: &mut dyn GameWorld) -> Result<()> {
        let Some(timelines) = self.timelines else {
            return Ok(());
        };
        let Some(segment) = timelines.segment_of(event.timeline()) else {
            return Ok(());
        };

        let trigger = match event {
            PlaybackEvent::PlaybackStarted(_) => {
                self.resolver.set_indicators_visible(false);
                return Ok(());
            }
            PlaybackEvent::PlaybackWaiting(_) => Trigger::Waiting(segment),
            PlaybackEvent::PlaybackStopped(_) => Trigger::Stopped(segment),
        };
        let (next, action) = transition(self.state, trigger);
        self.run(world, timelines, next, action, None)
    }

    /// Per-frame tick: clamp free look and stop if the target is gone
    pub fn update(&mut self, world: &mut dyn GameWorld) -> Result<()> {
        let Some(timelines) = self.timelines else {
            return Ok(());
        };
        if world.is_game_paused() || !self.state.is_active() {
            return Ok(());
        }
        let Some(target) = self.session.as_ref().map(|session| session.target) else {
            return Ok(());
        };

        self.clamp_free_rotation(world, target);

        if !world.is_renderable(target) {
            tracing::warn!("Lost {target}, stopping the effect");
            let (next, action) = transition(self.state, Trigger::TargetLost);
            return self.run(world, timelines, next, action, None);
        }
        Ok(())
    }

    /// Get the current state
    pub fn state(&self) -> EffectState {
        self.state
    }

    /// Target of the running effect
    pub fn target(&self) -> Option<ActorHandle> {
        self.session.as_ref().map(|session| session.target)
    }

    /// Anchor of the running effect
    pub fn anchor(&self) -> Option<&AnchorPoint> {
        self.session.as_ref().map(|session| &session.anchor)
    }

    /// Camera captured at activation
    pub fn previous_camera(&self) -> Option<&PreviousCamera> {
        self.session.as_ref().map(|session| &session.previous)
    }

    /// Registered timeline ids
    pub fn timelines(&self) -> Option<EffectTimelines> {
        self.timelines
    }

    /// Whether [`initialize`](Self::initialize) succeeded
    pub fn is_initialized(&self) -> bool {
        self.timelines.is_some()
    }

    /// Get the engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Get the engine mutably
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Get the configuration
    pub fn config(&self) -> &SecondSightConfig {
        &self.config
    }

    fn ready(&self, world: &dyn GameWorld) -> Result<EffectTimelines> {
        let timelines = self.timelines.ok_or(EffectError::EngineUnavailable)?;
        if world.is_game_paused() {
            tracing::debug!("Ignoring request while the game is paused");
            return Err(EffectError::GamePaused);
        }
        Ok(timelines)
    }

    fn ensure_engine_free(&self) -> Result<()> {
        let Some(active) = self.engine.active_timeline() else {
            return Ok(());
        };
        match self.timelines.and_then(|t| t.segment_of(active)) {
            Some(_) => Ok(()),
            None => {
                tracing::warn!("Engine is already playing {active}");
                Err(EffectError::EngineBusy(active))
            }
        }
    }

    fn playback_options(&self) -> PlaybackOptions {
        let playback = &self.config.playback;
        PlaybackOptions {
            pace: PlaybackPace::Speed(playback.speed),
            global_ease_in: false,
            global_ease_out: false,
            follow_ground: playback.follow_ground,
            min_height_above_ground: playback.min_height_above_ground,
            show_menus: playback.show_menus,
        }
    }

    fn run(
        &mut self,
        world: &mut dyn GameWorld,
        timelines: EffectTimelines,
        next: EffectState,
        action: Action,
        resolved: Option<ResolvedTarget>,
    ) -> Result<()> {
        match action {
            Action::Ignore => return Ok(()),
            Action::Refuse(refusal) => {
                let err = match refusal {
                    Refusal::AlreadyActive => EffectError::AlreadyActive,
                    Refusal::AlreadyInactive => EffectError::AlreadyInactive,
                };
                tracing::debug!("{err}");
                return Err(err);
            }
            Action::Enter => {
                let target = resolved.ok_or(EffectError::NoTargetAvailable)?;
                self.enter(world, timelines, target)?;
            }
            Action::Retarget { from } => {
                let target = resolved.ok_or(EffectError::NoTargetAvailable)?;
                self.retarget(world, timelines, from, target)?;
            }
            Action::Return { from } => self.return_to_previous(world, timelines, from)?,
            Action::Resume => self.switch(timelines, Segment::ToPrevious, Segment::ToTarget)?,
            Action::Hold => self.switch(timelines, Segment::ToTarget, Segment::AtTarget)?,
            Action::Stop { segment } => {
                if let Err(e) = self.engine.stop_playback(timelines.id(segment)) {
                    tracing::warn!("Stopping the {segment} timeline failed: {e}");
                }
                self.end_session(world);
            }
            Action::Finish => self.end_session(world),
        }

        if next != self.state {
            tracing::info!("{} -> {}", self.state.status_text(), next.status_text());
        }
        self.state = next;
        Ok(())
    }

    fn enter(
        &mut self,
        world: &dyn GameWorld,
        timelines: EffectTimelines,
        target: ResolvedTarget,
    ) -> Result<()> {
        let previous = PreviousCamera::capture(world);
        let [to_target, at_target] = self.lay_out_approach(world, timelines, target.actor, &target.anchor)?;
        self.write(timelines, Segment::ToTarget, &to_target)?;
        self.write(timelines, Segment::AtTarget, &at_target)?;
        self.engine
            .start_playback(timelines.to_target, &self.playback_options())
            .map_err(playback_failed)?;

        tracing::info!("Moving to {} from {}", target.actor, target.source);
        self.session = Some(Session {
            target: target.actor,
            anchor: target.anchor,
            source: target.source,
            previous,
        });
        Ok(())
    }

    fn retarget(
        &mut self,
        world: &mut dyn GameWorld,
        timelines: EffectTimelines,
        from: Segment,
        target: ResolvedTarget,
    ) -> Result<()> {
        let [to_target, at_target] = self.lay_out_approach(world, timelines, target.actor, &target.anchor)?;

        match self.redirect(timelines, from, &to_target, &at_target) {
            Ok(()) => {
                tracing::info!("Redirecting to {} from {}", target.actor, target.source);
                if let Some(session) = &mut self.session {
                    session.target = target.actor;
                    session.anchor = target.anchor;
                    session.source = target.source;
                }
                Ok(())
            }
            Err(Redirect::Untouched(e)) => {
                self.restore_approach(world, timelines, from);
                Err(e)
            }
            Err(Redirect::Committed(e)) => {
                tracing::warn!("Redirect to {} failed after playback moved, stopping", target.actor);
                self.abandon(world, timelines);
                Err(e)
            }
        }
    }

    /// Rewrite the approach and play it. Idle timelines are written first so
    /// that a failure before the playing one is touched leaves playback as it
    /// was.
    fn redirect(
        &mut self,
        timelines: EffectTimelines,
        from: Segment,
        to_target: &Timeline,
        at_target: &Timeline,
    ) -> std::result::Result<(), Redirect> {
        match from {
            Segment::AtTarget => {
                self.write(timelines, Segment::ToTarget, to_target)
                    .map_err(Redirect::Untouched)?;
                self.switch(timelines, from, Segment::ToTarget)
                    .map_err(Redirect::Untouched)?;
                self.write(timelines, Segment::AtTarget, at_target)
                    .map_err(Redirect::Committed)
            }
            Segment::ToTarget | Segment::ToPrevious => {
                let playing_rewritten = |e| match from {
                    Segment::ToTarget => Redirect::Committed(e),
                    _ => Redirect::Untouched(e),
                };
                self.write(timelines, Segment::AtTarget, at_target)
                    .map_err(Redirect::Untouched)?;
                self.write(timelines, Segment::ToTarget, to_target)
                    .map_err(playing_rewritten)?;
                self.switch(timelines, from, Segment::ToTarget)
                    .map_err(playing_rewritten)
            }
        }
    }

    /// Put the approach timelines that are not playing back on the session
    /// target. Stops the effect if that fails too.
    fn restore_approach(&mut self, world: &mut dyn GameWorld, timelines: EffectTimelines, playing: Segment) {
        let Some((actor, anchor)) = self
            .session
            .as_ref()
            .map(|session| (session.target, session.anchor.clone()))
        else {
            return;
        };

        let restored = self
            .lay_out_approach(world, timelines, actor, &anchor)
            .and_then(|[to_target, at_target]| {
                for (segment, timeline) in [(Segment::ToTarget, &to_target), (Segment::AtTarget, &at_target)] {
                    if segment != playing {
                        self.write(timelines, segment, timeline)?;
                    }
                }
                Ok(())
            });
        if let Err(e) = restored {
            tracing::warn!("Restoring the approach to {actor} failed: {e}");
            self.abandon(world, timelines);
        }
    }

    /// Stop whatever effect timeline plays and end the session
    fn abandon(&mut self, world: &mut dyn GameWorld, timelines: EffectTimelines) {
        if let Some(active) = self.engine.active_timeline() {
            if timelines.segment_of(active).is_some() {
                if let Err(e) = self.engine.stop_playback(active) {
                    tracing::warn!("Stopping {active} failed: {e}");
                }
            }
        }
        self.end_session(world);
        tracing::info!("{} -> {}", self.state.status_text(), EffectState::Inactive.status_text());
        self.state = EffectState::Inactive;
    }

    fn lay_out_approach(
        &self,
        world: &dyn GameWorld,
        timelines: EffectTimelines,
        actor: ActorHandle,
        anchor: &AnchorPoint,
    ) -> Result<[Timeline; 2]> {
        let to_target = self
            .builder
            .to_target(actor, anchor, world.camera_position(), world.actor_position(actor))
            .map_err(layout_failed(Segment::ToTarget, timelines.to_target))?;
        let at_target = self
            .builder
            .at_target(actor, anchor)
            .map_err(layout_failed(Segment::AtTarget, timelines.at_target))?;
        Ok([to_target, at_target])
    }

    fn write(&mut self, timelines: EffectTimelines, segment: Segment, timeline: &Timeline) -> Result<()> {
        write_timeline(&mut self.engine, timelines.id(segment), segment, timeline)
    }

    fn return_to_previous(
        &mut self,
        world: &dyn GameWorld,
        timelines: EffectTimelines,
        from: Segment,
    ) -> Result<()> {
        let Some(session) = &self.session else {
            return Err(EffectError::AlreadyInactive);
        };
        let to_previous = self
            .builder
            .to_previous(session.target, world.camera_position(), &session.previous.pose)
            .map_err(layout_failed(Segment::ToPrevious, timelines.to_previous))?;

        self.write(timelines, Segment::ToPrevious, &to_previous)?;
        self.switch(timelines, from, Segment::ToPrevious)
    }

    fn switch(&mut self, timelines: EffectTimelines, from: Segment, to: Segment) -> Result<()> {
        self.engine
            .switch_playback(Some(timelines.id(from)), timelines.id(to))
            .map_err(|e| {
                tracing::warn!("Switching from {from} to {to} failed: {e}");
                EffectError::Playback(e)
            })
    }

    fn end_session(&mut self, world: &mut dyn GameWorld) {
        if let Some(session) = self.session.take() {
            if let Some(rotation) = session.previous.free_rotation {
                world.set_third_person_free_rotation(rotation);
            }
            tracing::info!("Effect on {} ended", session.target);
        }
        self.resolver.set_indicators_visible(true);
    }

    fn clamp_free_rotation(&self, world: &mut dyn GameWorld, target: ActorHandle) {
        if world.camera_mode() != Some(CameraMode::Free) {
            return;
        }
        let (Some(rotation), Some(heading)) =
            (world.free_camera_rotation(), world.actor_heading(target))
        else {
            return;
        };
        let clamped = self.clamp.apply(rotation, heading);
        if clamped != rotation {
            tracing::trace!("Clamped free look {rotation:?} -> {clamped:?}");
            world.set_free_camera_rotation(clamped);
        }
    }
}

/// Failed redirect, by whether the playing timeline already carries the
/// new target
#[derive(Debug)]
enum Redirect {
    Untouched(EffectError),
    Committed(EffectError),
}

fn register<E: TimelineEngine>(engine: &mut E) -> std::result::Result<EffectTimelines, EngineError> {
    engine.register_plugin()?;
    Ok(EffectTimelines {
        to_target: engine.register_timeline()?,
        at_target: engine.register_timeline()?,
        to_previous: engine.register_timeline()?,
    })
}

fn playback_failed(e: EngineError) -> EffectError {
    tracing::warn!("Starting playback failed: {e}");
    EffectError::Playback(e)
}
