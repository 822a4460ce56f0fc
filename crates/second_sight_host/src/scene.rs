// SPDX-License-Identifier: MIT OR Apache-2.0
//! A small scripted scene standing in for the game.

use glam::Vec3;
use second_sight_core::geometry::local_to_world;
use second_sight_core::{BodyPartData, CameraMode, GameWorld};
use second_sight_timeline::{ActorHandle, Rotation};

const HEAD_JOINT: &str = "NPC Head [Head]";
const ROOT_JOINT: &str = "NPC Root [Root]";

/// Bandit walking across the road
pub const BANDIT: ActorHandle = ActorHandle(0x0001_A2B3);
/// Guard standing by the gate
pub const GUARD: ActorHandle = ActorHandle(0x0001_C4D5);

#[derive(Debug, Clone)]
struct SceneActor {
    handle: ActorHandle,
    position: Vec3,
    velocity: Vec3,
    heading: f32,
    visible: bool,
}

impl SceneActor {
    fn new(handle: ActorHandle, position: Vec3, velocity: Vec3, heading: f32) -> Self {
        Self {
            handle,
            position,
            velocity,
            heading,
            visible: true,
        }
    }

    fn head(&self) -> Vec3 {
        self.position + local_to_world(Vec3::new(0.0, 6.0, 120.0), self.heading)
    }
}

/// World whose actors move on fixed paths
#[derive(Debug, Clone)]
pub struct ScriptedWorld {
    player: Vec3,
    camera_position: Vec3,
    camera_rotation: Rotation,
    camera_mode: CameraMode,
    orbit: Rotation,
    free_look: Rotation,
    crosshair: Option<ActorHandle>,
    actors: Vec<SceneActor>,
}

impl ScriptedWorld {
    /// Player on the road with the bandit under the crosshair
    pub fn new() -> Self {
        let player = Vec3::new(0.0, 0.0, 0.0);
        Self {
            player,
            camera_position: player + Vec3::new(0.0, -250.0, 150.0),
            camera_rotation: Rotation::new(-0.1, 0.0),
            camera_mode: CameraMode::ThirdPerson,
            orbit: Rotation::new(0.0, 0.35),
            free_look: Rotation::ZERO,
            crosshair: Some(BANDIT),
            actors: vec![
                SceneActor::new(BANDIT, Vec3::new(-1500.0, 3000.0, 0.0), Vec3::new(180.0, 0.0, 0.0), 0.0),
                SceneActor::new(GUARD, Vec3::new(900.0, 6500.0, 40.0), Vec3::ZERO, std::f32::consts::PI),
            ],
        }
    }

    /// Advance the scene by `delta_time` seconds.
    ///
    /// `effect_playing` puts the camera into free mode the way the engine
    /// does during playback; the player keeps turning the mouse meanwhile.
    pub fn step(&mut self, delta_time: f32, effect_playing: bool) {
        for actor in &mut self.actors {
            actor.position += actor.velocity * delta_time;
            if actor.velocity.length_squared() > 0.0 {
                actor.heading = actor.velocity.x.atan2(actor.velocity.y);
            }
        }

        self.camera_mode = if effect_playing {
            CameraMode::Free
        } else {
            CameraMode::ThirdPerson
        };
        if effect_playing {
            // Leaving third person drops the orbit offset
            self.orbit = Rotation::ZERO;
            self.free_look.yaw += 0.9 * delta_time;
            self.free_look.pitch -= 0.3 * delta_time;
        } else {
            self.free_look = self.camera_rotation;
        }
    }

    /// Make an actor lose its 3D
    pub fn unload(&mut self, handle: ActorHandle) {
        if let Some(actor) = self.actors.iter_mut().find(|a| a.handle == handle) {
            actor.visible = false;
        }
    }

    /// Current orbit offset of the third-person camera
    pub fn orbit(&self) -> Rotation {
        self.orbit
    }

    fn actor(&self, handle: ActorHandle) -> Option<&SceneActor> {
        self.actors.iter().find(|a| a.handle == handle)
    }
}

impl Default for ScriptedWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl GameWorld for ScriptedWorld {
    fn is_game_paused(&self) -> bool {
        false
    }

    fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    fn camera_rotation(&self) -> Rotation {
        self.camera_rotation
    }

    fn camera_mode(&self) -> Option<CameraMode> {
        Some(self.camera_mode)
    }

    fn third_person_free_rotation(&self) -> Option<Rotation> {
        self.camera_mode.has_free_rotation().then_some(self.orbit)
    }

    fn set_third_person_free_rotation(&mut self, rotation: Rotation) {
        self.orbit = rotation;
    }

    fn free_camera_rotation(&self) -> Option<Rotation> {
        (self.camera_mode == CameraMode::Free).then_some(self.free_look)
    }

    fn set_free_camera_rotation(&mut self, rotation: Rotation) {
        self.free_look = rotation;
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
        self.actor(actor).map(|a| a.position.distance(self.player))
    }

    fn is_dead(&self, _actor: ActorHandle) -> bool {
        false
    }

    fn is_renderable(&self, actor: ActorHandle) -> bool {
        self.actor(actor).is_some_and(|a| a.visible)
    }

    fn body_part_data(&self, actor: ActorHandle) -> Option<BodyPartData> {
        self.actor(actor)?;
        Some(BodyPartData {
            head: Some(HEAD_JOINT.into()),
            full_body: Some(ROOT_JOINT.into()),
        })
    }

    fn joint_world_position(&self, actor: ActorHandle, joint: &str) -> Option<Vec3> {
        let actor = self.actor(actor).filter(|a| a.visible)?;
        match joint {
            HEAD_JOINT => Some(actor.head()),
            ROOT_JOINT => Some(actor.position),
            _ => None,
        }
    }
}
