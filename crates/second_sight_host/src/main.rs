// SPDX-License-Identifier: MIT OR Apache-2.0
//! SecondSight host - drives the camera effect through a scripted scene
//!
//! Stands in for the game: loads `SecondSight.ron` (or the path given as the
//! first argument), wires the effect to the in-memory timeline engine and
//! plays a short script of hotkey presses at a fixed frame rate.

mod scene;

use scene::{ScriptedWorld, BANDIT, GUARD};
use second_sight_core::{LogLevel, SecondSight, SecondSightConfig, CONFIG_FILE_NAME};
use second_sight_timeline::{ActorHandle, InMemoryEngine, TimelineEngine};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Registry};

const FRAME_TIME: f32 = 1.0 / 30.0;
const FRAME_COUNT: u32 = 360;

/// Something the script does on a given frame
#[derive(Debug, Clone, Copy)]
enum Cue {
    /// Hotkey press
    Toggle,
    /// Script call with an explicit target
    Activate(ActorHandle),
    /// Target's 3D gets unloaded
    Unload(ActorHandle),
}

const SCRIPT: &[(u32, Cue)] = &[
    (10, Cue::Toggle),
    (25, Cue::Toggle),
    (35, Cue::Toggle),
    (90, Cue::Activate(GUARD)),
    (180, Cue::Toggle),
    (260, Cue::Activate(BANDIT)),
    (300, Cue::Unload(BANDIT)),
];

fn main() -> ExitCode {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), PathBuf::from);

    let filter = init_logging();
    let config = SecondSightConfig::load_or_default(&path);
    if let Err(e) = filter.reload(env_filter(config.log_level)) {
        tracing::warn!("Could not apply log level {:?}: {e}", config.log_level);
    }
    tracing::info!("Starting SecondSight host v{}", env!("CARGO_PKG_VERSION"));

    let mut world = ScriptedWorld::new();
    let mut effect = SecondSight::new(InMemoryEngine::new(), config);
    if let Err(e) = effect.initialize() {
        tracing::error!("Could not start the effect: {e}");
        return ExitCode::FAILURE;
    }

    run_script(&mut effect, &mut world, SCRIPT, FRAME_COUNT);

    tracing::info!(
        "Script finished: {}, orbit {:?}",
        effect.state().status_text(),
        world.orbit()
    );
    if let Some(timelines) = effect.timelines() {
        if let Some(text) = effect.engine().export_timeline(timelines.to_target) {
            tracing::debug!("Last to-target timeline:\n{text}");
        }
    }
    ExitCode::SUCCESS
}

/// Start logging at the default level; the config's level is applied
/// through the returned handle once it is loaded
fn init_logging() -> reload::Handle<EnvFilter, Registry> {
    let (filter, handle) = reload::Layer::new(env_filter(LogLevel::default()));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    handle
}

fn env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.level_filter().into())
        .from_env_lossy()
}

/// Play `script` for `frames` frames: world first, then cues, then the
/// engine, its events, and the per-frame tick
fn run_script(
    effect: &mut SecondSight<InMemoryEngine>,
    world: &mut ScriptedWorld,
    script: &[(u32, Cue)],
    frames: u32,
) {
    for frame in 0..frames {
        let playing = effect.engine().active_timeline().is_some();
        world.step(FRAME_TIME, playing);

        for (_, cue) in script.iter().filter(|(at, _)| *at == frame) {
            let result = match *cue {
                Cue::Toggle => effect.toggle(world),
                Cue::Activate(actor) => effect.activate(world, Some(actor)),
                Cue::Unload(actor) => {
                    world.unload(actor);
                    Ok(())
                }
            };
            match result {
                Ok(()) => tracing::info!("Frame {frame}: {cue:?} -> {}", effect.state().status_text()),
                Err(e) => tracing::warn!("Frame {frame}: {cue:?} failed: {e}"),
            }
        }

        effect.engine_mut().advance(FRAME_TIME);
        for event in effect.engine_mut().take_events() {
            if let Err(e) = effect.handle_event(event, world) {
                tracing::warn!("Frame {frame}: handling {event:?} failed: {e}");
            }
        }
        if let Err(e) = effect.update(world) {
            tracing::warn!("Frame {frame}: update failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use second_sight_core::EffectState;
    use second_sight_timeline::Rotation;

    fn effect() -> SecondSight<InMemoryEngine> {
        let mut effect = SecondSight::new(InMemoryEngine::new(), SecondSightConfig::default());
        effect.initialize().unwrap();
        effect
    }

    #[test]
    fn test_round_trip_restores_orbit() {
        let mut effect = effect();
        let mut world = ScriptedWorld::new();
        let orbit = world.orbit();

        run_script(&mut effect, &mut world, &[(1, Cue::Toggle), (60, Cue::Toggle)], 150);

        assert_eq!(effect.state(), EffectState::Inactive);
        assert_eq!(world.orbit(), orbit);
        assert_eq!(effect.engine().calls().start_playback, 1);
    }

    #[test]
    fn test_unloaded_target_ends_effect() {
        let mut effect = effect();
        let mut world = ScriptedWorld::new();

        run_script(&mut effect, &mut world, &[(1, Cue::Toggle), (40, Cue::Unload(BANDIT))], 50);

        assert_eq!(effect.state(), EffectState::Inactive);
        assert_eq!(effect.engine().calls().stop_playback, 1);
        assert_ne!(world.orbit(), Rotation::ZERO);
    }

    #[test]
    fn test_full_script_runs() {
        let mut effect = effect();
        let mut world = ScriptedWorld::new();
        run_script(&mut effect, &mut world, SCRIPT, FRAME_COUNT);
        assert_eq!(effect.state(), EffectState::Inactive);
        assert_eq!(effect.target(), None);
    }
}
