// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera anchor on a target's skeleton.

use crate::geometry::world_to_local;
use crate::world::GameWorld;
use glam::Vec3;
use second_sight_timeline::ActorHandle;

/// Point on the target the held camera sits at
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPoint {
    /// Joint the anchor was taken from
    pub joint: String,
    /// Joint position in world space when located
    pub world_position: Vec3,
    /// Offset from the target's position, in the target's local frame,
    /// including the forward bias
    pub offset: Vec3,
}

/// Finds the anchor joint and turns it into an actor-relative offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorLocator {
    forward_bias: f32,
}

impl AnchorLocator {
    /// Create a locator pushing the anchor `forward_bias` units ahead of the joint
    pub fn new(forward_bias: f32) -> Self {
        Self { forward_bias }
    }

    /// Locate the anchor on `actor`.
    ///
    /// Prefers the head joint and falls back to the full-body joint. Returns
    /// `None` when the actor has no body-part data, no 3D, or neither joint
    /// can be found.
    pub fn locate(&self, world: &dyn GameWorld, actor: ActorHandle) -> Option<AnchorPoint> {
        let parts = world.body_part_data(actor)?;
        if !world.is_renderable(actor) {
            return None;
        }

        let (joint, world_position) = [parts.head, parts.full_body]
            .into_iter()
            .flatten()
            .find_map(|joint| {
                let position = world.joint_world_position(actor, &joint)?;
                Some((joint, position))
            })?;

        let origin = world.actor_position(actor)?;
        let heading = world.actor_heading(actor)?;
        let offset = world_to_local(world_position - origin, heading) + Vec3::Y * self.forward_bias;

        if !offset.is_finite() {
            tracing::debug!("Anchor offset on {actor} is not finite");
            return None;
        }

        Some(AnchorPoint {
            joint,
            world_position,
            offset,
        })
    }
}
