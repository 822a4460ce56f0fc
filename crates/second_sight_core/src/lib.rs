// SPDX-License-Identifier: MIT OR Apache-2.0
//! SecondSight: a temporary look-at-target camera effect.
//!
//! On a trigger the camera travels from wherever the player has it to an
//! anchor near the target's head, holds there with bounded free look, and on
//! the next trigger travels back to the pose it started from.
//!
//! ## Architecture
//!
//! - [`target`] picks a target from a priority-ordered provider chain
//! - [`anchor`] derives the camera anchor from the target's skeleton
//! - [`timing`] turns travel distance into a transition duration
//! - [`builder`] lays out the three timelines and writes them to the engine
//! - [`state`] is the pure state machine
//! - [`orchestrator`] ties it together in the [`SecondSight`] context object
//! - [`clamp`] limits free look while held at the target
//!
//! The game is reached only through [`GameWorld`] and the camera timeline
//! engine only through [`second_sight_timeline::TimelineEngine`].

pub mod anchor;
pub mod builder;
pub mod clamp;
pub mod config;
pub mod error;
pub mod geometry;
pub mod orchestrator;
pub mod state;
pub mod target;
pub mod timing;
pub mod world;

#[cfg(test)]
mod testing;

pub use anchor::{AnchorLocator, AnchorPoint};
pub use builder::{write_timeline, CameraPose, TimelineBuilder};
pub use clamp::RotationClamp;
pub use config::{ConfigError, LogLevel, SecondSightConfig, CONFIG_FILE_NAME};
pub use error::{EffectError, Result};
pub use orchestrator::{EffectTimelines, PreviousCamera, SecondSight};
pub use state::{transition, Action, EffectState, Refusal, Segment, Trigger};
pub use target::{CrosshairProvider, Rejection, ResolvedTarget, TargetProvider, TargetResolver, TargetSource};
pub use timing::TransitionTiming;
pub use world::{BodyPartData, CameraMode, GameWorld};
