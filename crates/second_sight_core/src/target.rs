// SPDX-License-Identifier: MIT OR Apache-2.0
//! Target selection.
//!
//! Providers are asked in a fixed priority order and the first candidate
//! that passes validation wins. Nothing is cached: every activation attempt
//! resolves again.

use crate::anchor::{AnchorLocator, AnchorPoint};
use crate::error::{EffectError, Result};
use crate::world::GameWorld;
use second_sight_timeline::ActorHandle;
use std::fmt;

/// Kind of provider, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetSource {
    /// Target reticle lock
    ReticleLock,
    /// Soft target lock from a movement plugin
    SoftLock,
    /// Whatever is under the crosshair
    Crosshair,
    /// Passed in explicitly by the caller
    Explicit,
}

impl TargetSource {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReticleLock => "reticle lock",
            Self::SoftLock => "soft lock",
            Self::Crosshair => "crosshair",
            Self::Explicit => "explicit",
        }
    }
}

impl fmt::Display for TargetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something that can nominate a target
pub trait TargetProvider {
    /// Which kind of provider this is
    fn source(&self) -> TargetSource;

    /// Whether a target is currently locked or selected
    fn is_target_locked(&self, world: &dyn GameWorld) -> bool;

    /// The locked or selected target
    fn current_target(&self, world: &dyn GameWorld) -> Option<ActorHandle>;

    /// Candidate from this provider, if it has one
    fn try_get_target(&self, world: &dyn GameWorld) -> Option<ActorHandle> {
        if self.is_target_locked(world) {
            self.current_target(world)
        } else {
            None
        }
    }

    /// Show or hide the provider's on-screen indicator
    fn set_indicator_visible(&self, _visible: bool) {}
}

/// Provider reading the crosshair target from the world
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosshairProvider;

impl TargetProvider for CrosshairProvider {
    fn source(&self) -> TargetSource {
        TargetSource::Crosshair
    }

    fn is_target_locked(&self, world: &dyn GameWorld) -> bool {
        world.crosshair_target().is_some()
    }

    fn current_target(&self, world: &dyn GameWorld) -> Option<ActorHandle> {
        world.crosshair_target()
    }
}

/// Why a candidate was turned down
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// No camera anchor on the skeleton
    NoAnchor,
    /// Too far from the player (or distance unknown)
    TooFar(Option<f32>),
    /// Dead or dying
    Dead,
}

/// A validated target together with its anchor
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// The target actor
    pub actor: ActorHandle,
    /// Anchor computed during validation
    pub anchor: AnchorPoint,
    /// Provider that nominated it
    pub source: TargetSource,
}

/// Priority-ordered provider chain with validation
pub struct TargetResolver {
    providers: Vec<Box<dyn TargetProvider>>,
    locator: AnchorLocator,
    max_distance: f32,
}

impl TargetResolver {
    /// Create a resolver with no providers
    pub fn new(locator: AnchorLocator, max_distance: f32) -> Self {
        Self {
            providers: Vec::new(),
            locator,
            max_distance,
        }
    }

    /// Add a provider; the chain stays sorted by priority
    pub fn add_provider(&mut self, provider: Box<dyn TargetProvider>) {
        tracing::debug!("Registered {} target provider", provider.source());
        self.providers.push(provider);
        self.providers.sort_by_key(|p| p.source());
    }

    /// Providers in query order
    pub fn providers(&self) -> impl Iterator<Item = &dyn TargetProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    /// Show or hide every provider's indicator
    pub fn set_indicators_visible(&self, visible: bool) {
        for provider in &self.providers {
            provider.set_indicator_visible(visible);
        }
    }

    /// Check a candidate, returning its anchor if it is usable
    pub fn validate(
        &self,
        world: &dyn GameWorld,
        actor: ActorHandle,
    ) -> std::result::Result<AnchorPoint, Rejection> {
        let anchor = self.locator.locate(world, actor).ok_or(Rejection::NoAnchor)?;
        match world.distance_to_player(actor) {
            Some(distance) if distance <= self.max_distance => {}
            other => return Err(Rejection::TooFar(other)),
        }
        if world.is_dead(actor) {
            return Err(Rejection::Dead);
        }
        Ok(anchor)
    }

    /// First valid candidate from the provider chain
    pub fn resolve(&self, world: &dyn GameWorld) -> Result<ResolvedTarget> {
        for provider in &self.providers {
            let source = provider.source();
            let Some(actor) = provider.try_get_target(world) else {
                continue;
            };
            match self.validate(world, actor) {
                Ok(anchor) => {
                    tracing::debug!("Selected {actor} from {source}");
                    return Ok(ResolvedTarget {
                        actor,
                        anchor,
                        source,
                    });
                }
                Err(rejection) => {
                    tracing::debug!("Rejected {actor} from {source}: {rejection:?}");
                }
            }
        }
        Err(EffectError::NoTargetAvailable)
    }

    /// Validate a caller-supplied target, or run the chain when there is none
    pub fn resolve_or(&self, world: &dyn GameWorld, actor: Option<ActorHandle>) -> Result<ResolvedTarget> {
        let Some(actor) = actor else {
            return self.resolve(world);
        };
        match self.validate(world, actor) {
            Ok(anchor) => Ok(ResolvedTarget {
                actor,
                anchor,
                source: TargetSource::Explicit,
            }),
            Err(Rejection::NoAnchor) => Err(EffectError::AnchorUnresolvable(actor)),
            Err(rejection) => {
                tracing::debug!("Rejected explicit target {actor}: {rejection:?}");
                Err(EffectError::NoTargetAvailable)
            }
        }
    }
}

impl fmt::Debug for TargetResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetResolver")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.source()).collect::<Vec<_>>(),
            )
            .field("locator", &self.locator)
            .field("max_distance", &self.max_distance)
            .finish()
    }
}
