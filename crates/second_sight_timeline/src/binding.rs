// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding of keyframes to world actors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to an actor in the game world.
///
/// Handles are never trusted across frames: every consumer re-queries the
/// world with the handle and treats a failed lookup as "actor gone".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorHandle(pub u32);

impl fmt::Display for ActorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor#{:08X}", self.0)
    }
}

/// Coordinate space an offset is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OffsetSpace {
    /// World axes, independent of the actor's heading
    #[default]
    World,
    /// The actor's local frame (x = right, y = forward, z = up)
    Local,
}

/// Binding of a keyframe value to an actor plus an offset from it.
///
/// The engine resolves the actor every frame, so the keyframe follows the
/// actor while the timeline plays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBinding<O> {
    /// Actor the keyframe follows
    pub actor: ActorHandle,
    /// Offset from the actor
    pub offset: O,
    /// Space the offset is expressed in
    pub space: OffsetSpace,
}

impl<O> ReferenceBinding<O> {
    /// Bind to an actor with a world-space offset
    pub fn world(actor: ActorHandle, offset: O) -> Self {
        Self {
            actor,
            offset,
            space: OffsetSpace::World,
        }
    }

    /// Bind to an actor with an offset in the actor's local frame
    pub fn local(actor: ActorHandle, offset: O) -> Self {
        Self {
            actor,
            offset,
            space: OffsetSpace::Local,
        }
    }

    /// Whether the offset turns with the actor
    pub fn is_offset_relative(&self) -> bool {
        self.space == OffsetSpace::Local
    }
}
