// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory world and providers for unit tests.

use crate::target::{TargetProvider, TargetSource};
use crate::world::{BodyPartData, CameraMode, GameWorld};
use glam::Vec3;
use second_sight_timeline::{ActorHandle, Rotation};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

pub const HEAD: &str = "NPC Head [Head]";
pub const ROOT: &str = "NPC Root [Root]";

#[derive(Debug, Clone)]
pub struct FakeActor {
    pub position: Vec3,
    pub heading: f32,
    pub dead: bool,
    pub renderable: bool,
    pub body_parts: Option<BodyPartData>,
    pub joints: HashMap<String, Vec3>,
}

impl FakeActor {
    /// Upright actor facing +y with its head 120 units above `position`
    pub fn at(position: Vec3) -> Self {
        let joints = HashMap::from([
            (HEAD.to_string(), position + Vec3::new(0.0, 0.0, 120.0)),
            (ROOT.to_string(), position),
        ]);
        Self {
            position,
            heading: 0.0,
            dead: false,
            renderable: true,
            body_parts: Some(BodyPartData {
                head: Some(HEAD.into()),
                full_body: Some(ROOT.into()),
            }),
            joints,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeWorld {
    pub paused: bool,
    pub player_position: Vec3,
    pub camera_position: Vec3,
    pub camera_rotation: Rotation,
    pub camera_mode: Option<CameraMode>,
    pub third_person_free: Option<Rotation>,
    pub free_camera: Option<Rotation>,
    pub crosshair: Option<ActorHandle>,
    pub actors: HashMap<ActorHandle, FakeActor>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self {
            paused: false,
            player_position: Vec3::ZERO,
            camera_position: Vec3::ZERO,
            camera_rotation: Rotation::ZERO,
            camera_mode: Some(CameraMode::ThirdPerson),
            third_person_free: Some(Rotation::ZERO),
            free_camera: None,
            crosshair: None,
            actors: HashMap::new(),
        }
    }

    pub fn add_actor(&mut self, handle: ActorHandle, actor: FakeActor) {
        self.actors.insert(handle, actor);
    }

    pub fn actor_mut(&mut self, handle: ActorHandle) -> &mut FakeActor {
        self.actors
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("no actor {handle}"))
    }

    fn actor(&self, handle: ActorHandle) -> Option<&FakeActor> {
        self.actors.get(&handle)
    }
}

impl GameWorld for FakeWorld {
    fn is_game_paused(&self) -> bool {
        self.paused
    }

    fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    fn camera_rotation(&self) -> Rotation {
        self.camera_rotation
    }

    fn camera_mode(&self) -> Option<CameraMode> {
        self.camera_mode
    }

    fn third_person_free_rotation(&self) -> Option<Rotation> {
        self.third_person_free
    }

    fn set_third_person_free_rotation(&mut self, rotation: Rotation) {
        self.third_person_free = Some(rotation);
    }

    fn free_camera_rotation(&self) -> Option<Rotation> {
        match self.camera_mode {
            Some(CameraMode::Free) => self.free_camera,
            _ => None,
        }
    }

    fn set_free_camera_rotation(&mut self, rotation: Rotation) {
        self.free_camera = Some(rotation);
    }

    fn crosshair_target(&self) -> Option<ActorHandle> {
        self.crosshair
    }

    fn actor_position(&self, actor: ActorHandle) -> Option<Vec3> {
        self.actor(actor).map(|a| a.position)
    }

    fn actor_heading(&self, actor: ActorHandle) -> Option<f32> {
        self.actor(actor).map(|a| a.heading)
    }

    fn distance_to_player(&self, actor: ActorHandle) -> Option<f32> {
        self.actor(actor).map(|a| a.position.distance(self.player_position))
    }

    fn is_dead(&self, actor: ActorHandle) -> bool {
        self.actor(actor).is_some_and(|a| a.dead)
    }

    fn is_renderable(&self, actor: ActorHandle) -> bool {
        self.actor(actor).is_some_and(|a| a.renderable)
    }

    fn body_part_data(&self, actor: ActorHandle) -> Option<BodyPartData> {
        self.actor(actor)?.body_parts.clone()
    }

    fn joint_world_position(&self, actor: ActorHandle, joint: &str) -> Option<Vec3> {
        self.actor(actor)?.joints.get(joint).copied()
    }
}

/// Provider returning a fixed candidate and recording indicator visibility
#[derive(Debug, Clone)]
pub struct FixedProvider {
    source: TargetSource,
    target: Option<ActorHandle>,
    indicator: Rc<Cell<bool>>,
}

impl FixedProvider {
    pub fn new(source: TargetSource, target: Option<ActorHandle>) -> Self {
        Self {
            source,
            target,
            indicator: Rc::new(Cell::new(true)),
        }
    }

    /// Shared view of the indicator flag, readable after the provider is boxed
    pub fn indicator(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.indicator)
    }
}

impl TargetProvider for FixedProvider {
    fn source(&self) -> TargetSource {
        self.source
    }

    fn is_target_locked(&self, _world: &dyn GameWorld) -> bool {
        self.target.is_some()
    }

    fn current_target(&self, _world: &dyn GameWorld) -> Option<ActorHandle> {
        self.target
    }

    fn set_indicator_visible(&self, visible: bool) {
        self.indicator.set(visible);
    }
}
