// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for camera timelines.

use crate::binding::{ActorHandle, ReferenceBinding};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera orientation as pitch and yaw, in radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation about the right axis (positive looks down)
    pub pitch: f32,
    /// Rotation about the up axis
    pub yaw: f32,
}

impl Rotation {
    /// No rotation
    pub const ZERO: Self = Self { pitch: 0.0, yaw: 0.0 };

    /// Create a rotation from pitch and yaw
    pub const fn new(pitch: f32, yaw: f32) -> Self {
        Self { pitch, yaw }
    }

    /// Both angles are finite
    pub fn is_finite(&self) -> bool {
        self.pitch.is_finite() && self.yaw.is_finite()
    }
}

/// Interpolation mode used on the segment arriving at a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterpolationMode {
    /// Jump to the keyframe value
    None,
    /// Linear interpolation
    Linear,
    /// Cubic spline through neighbouring keyframes
    #[default]
    Cubic,
}

/// Ease flags of a keyframe.
///
/// Both flags shape the incoming segment: `ease_in` slows the start of the
/// segment that arrives here, `ease_out` slows its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Easing {
    /// Ease into the incoming segment
    pub ease_in: bool,
    /// Ease out of the incoming segment
    pub ease_out: bool,
}

impl Easing {
    /// No easing
    pub const NONE: Self = Self {
        ease_in: false,
        ease_out: false,
    };
    /// Ease both ends
    pub const BOTH: Self = Self {
        ease_in: true,
        ease_out: true,
    };
}

/// Where a translation keyframe puts the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TranslationTarget {
    /// Absolute world position
    Position(Vec3),
    /// Offset from an actor, re-evaluated while playing
    Reference(ReferenceBinding<Vec3>),
    /// Camera position captured when playback reaches the keyframe
    Camera,
}

/// Where a rotation keyframe points the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RotationTarget {
    /// Absolute pitch and yaw
    Angles(Rotation),
    /// Rotation relative to an actor, re-evaluated while playing
    Reference(ReferenceBinding<Rotation>),
    /// Camera rotation captured when playback reaches the keyframe
    Camera,
}

/// Payloads that can be bound to an actor
pub trait KeyframePayload: Copy {
    /// Actor the payload follows, if any
    fn reference(&self) -> Option<ActorHandle>;
}

impl KeyframePayload for TranslationTarget {
    fn reference(&self) -> Option<ActorHandle> {
        match self {
            Self::Reference(binding) => Some(binding.actor),
            Self::Position(_) | Self::Camera => None,
        }
    }
}

impl KeyframePayload for RotationTarget {
    fn reference(&self) -> Option<ActorHandle> {
        match self {
            Self::Reference(binding) => Some(binding.actor),
            Self::Angles(_) | Self::Camera => None,
        }
    }
}

/// A keyframe in a track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Time in seconds from the start of the timeline
    pub time: f32,
    /// Value at this keyframe
    pub value: T,
    /// Ease flags for the incoming segment
    pub easing: Easing,
    /// Interpolation mode for the incoming segment
    pub interpolation: InterpolationMode,
}

/// Keyframe moving the camera
pub type TranslationKeyframe = Keyframe<TranslationTarget>;

/// Keyframe turning the camera
pub type RotationKeyframe = Keyframe<RotationTarget>;

impl<T> Keyframe<T> {
    /// Create a keyframe with cubic interpolation and no easing
    pub fn new(time: f32, value: T) -> Self {
        Self {
            time,
            value,
            easing: Easing::NONE,
            interpolation: InterpolationMode::Cubic,
        }
    }

    /// Set ease flags
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set interpolation mode
    pub fn with_interpolation(mut self, mode: InterpolationMode) -> Self {
        self.interpolation = mode;
        self
    }
}

impl TranslationKeyframe {
    /// Keyframe capturing the live camera position
    pub fn at_camera(time: f32) -> Self {
        Self::new(time, TranslationTarget::Camera)
    }

    /// Keyframe at an absolute position
    pub fn at_position(time: f32, position: Vec3) -> Self {
        Self::new(time, TranslationTarget::Position(position))
    }

    /// Keyframe following an actor
    pub fn at_reference(time: f32, binding: ReferenceBinding<Vec3>) -> Self {
        Self::new(time, TranslationTarget::Reference(binding))
    }
}

impl RotationKeyframe {
    /// Keyframe capturing the live camera rotation
    pub fn at_camera(time: f32) -> Self {
        Self::new(time, RotationTarget::Camera)
    }

    /// Keyframe at absolute angles
    pub fn at_angles(time: f32, rotation: Rotation) -> Self {
        Self::new(time, RotationTarget::Angles(rotation))
    }

    /// Keyframe oriented relative to an actor
    pub fn at_reference(time: f32, binding: ReferenceBinding<Rotation>) -> Self {
        Self::new(time, RotationTarget::Reference(binding))
    }
}
