// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera timelines for SecondSight.
//!
//! This crate describes what a camera timeline engine is asked to play:
//! - Translation and rotation keyframes with easing hints
//! - Reference bindings that keep a keyframe attached to a moving actor
//! - Ordered tracks grouped into a timeline with a completion policy
//! - The [`TimelineEngine`] contract and the events it emits
//!
//! ## Architecture
//!
//! The real engine lives outside this workspace and drives the game camera.
//! [`InMemoryEngine`] implements the same contract deterministically so the
//! orchestration logic can be exercised without a game running.

pub mod binding;
pub mod engine;
pub mod keyframe;
pub mod memory;
pub mod track;

pub use binding::{ActorHandle, OffsetSpace, ReferenceBinding};
pub use engine::{
    EngineError, PlaybackEvent, PlaybackMode, PlaybackOptions, PlaybackPace, TimelineEngine,
    TimelineId,
};
pub use keyframe::{
    Easing, InterpolationMode, Keyframe, KeyframePayload, Rotation, RotationKeyframe, RotationTarget,
    TranslationKeyframe, TranslationTarget,
};
pub use memory::{CallCounts, InMemoryEngine};
pub use track::{Timeline, Track, TrackError};
