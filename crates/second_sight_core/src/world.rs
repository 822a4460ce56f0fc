// SPDX-License-Identifier: MIT OR Apache-2.0
//! Read access to the game world and the few camera writes the effect needs.

use glam::Vec3;
use second_sight_timeline::{ActorHandle, Rotation};

/// Camera state the player camera is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// First person
    FirstPerson,
    /// Third person on foot
    ThirdPerson,
    /// Third person on a mount
    Mount,
    /// Third person on a dragon
    Dragon,
    /// Free camera (used while a timeline plays)
    Free,
    /// Anything else (furniture, kill moves, ...)
    Other,
}

impl CameraMode {
    /// Modes with a free-rotation offset the player can orbit with
    pub fn has_free_rotation(self) -> bool {
        matches!(self, Self::ThirdPerson | Self::Mount | Self::Dragon)
    }
}

/// Joint names from an actor's body-part definitions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyPartData {
    /// Joint of the head part, if the race defines one
    pub head: Option<String>,
    /// Joint of the whole-body part, if the race defines one
    pub full_body: Option<String>,
}

/// Queries against the running game.
///
/// Actor queries return `None` when the handle no longer names a loaded
/// actor, so callers never hold on to stale state.
pub trait GameWorld {
    /// Whether the game is paused (menus open)
    fn is_game_paused(&self) -> bool;

    /// Camera position in world space
    fn camera_position(&self) -> Vec3;

    /// Camera pitch and yaw
    fn camera_rotation(&self) -> Rotation;

    /// Current camera state, if the camera has one
    fn camera_mode(&self) -> Option<CameraMode>;

    /// Free-rotation offset of a third-person-like camera state
    fn third_person_free_rotation(&self) -> Option<Rotation>;

    /// Write the free-rotation offset of a third-person-like camera state
    fn set_third_person_free_rotation(&mut self, rotation: Rotation);

    /// Rotation of the free camera, only while in [`CameraMode::Free`]
    fn free_camera_rotation(&self) -> Option<Rotation>;

    /// Write the rotation of the free camera
    fn set_free_camera_rotation(&mut self, rotation: Rotation);

    /// Actor under the crosshair
    fn crosshair_target(&self) -> Option<ActorHandle>;

    /// Logical position of an actor
    fn actor_position(&self, actor: ActorHandle) -> Option<Vec3>;

    /// Heading of an actor in radians
    fn actor_heading(&self, actor: ActorHandle) -> Option<f32>;

    /// Distance between an actor and the player
    fn distance_to_player(&self, actor: ActorHandle) -> Option<f32>;

    /// Whether an actor is dead or dying
    fn is_dead(&self, actor: ActorHandle) -> bool;

    /// Whether an actor has loaded 3D that can be rendered
    fn is_renderable(&self, actor: ActorHandle) -> bool;

    /// Body-part definitions of the actor's race
    fn body_part_data(&self, actor: ActorHandle) -> Option<BodyPartData>;

    /// World position of a named skeleton joint
    fn joint_world_position(&self, actor: ActorHandle, joint: &str) -> Option<Vec3>;
}
