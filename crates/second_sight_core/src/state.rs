// SPDX-License-Identifier: MIT OR Apache-2.0
//! Effect state machine.
//!
//! [`transition`] is a pure function from the current state and a trigger to
//! the next state and the side effect needed to get there. The orchestrator
//! performs the action and only commits the new state when the action
//! succeeded.

use std::fmt;

/// One of the three timelines the effect owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Camera travels from its pose to the target
    ToTarget,
    /// Camera holds at the target; free look allowed
    AtTarget,
    /// Camera travels back to the pose captured at activation
    ToPrevious,
}

impl Segment {
    /// All segments
    pub const ALL: [Segment; 3] = [Segment::ToTarget, Segment::AtTarget, Segment::ToPrevious];

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToTarget => "to-target",
            Self::AtTarget => "at-target",
            Self::ToPrevious => "to-previous",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Effect state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EffectState {
    /// Camera is the player's own
    #[default]
    Inactive,
    /// Playing the to-target timeline
    TransitioningToTarget,
    /// Playing the at-target timeline
    HoldingAtTarget,
    /// Playing the to-previous timeline
    TransitioningToPrevious,
}

impl EffectState {
    /// Timeline playing in this state
    pub fn segment(&self) -> Option<Segment> {
        match self {
            Self::Inactive => None,
            Self::TransitioningToTarget => Some(Segment::ToTarget),
            Self::HoldingAtTarget => Some(Segment::AtTarget),
            Self::TransitioningToPrevious => Some(Segment::ToPrevious),
        }
    }

    /// Check if any timeline of the effect is playing
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Check if the camera is heading to or held at the target
    pub fn is_engaged(&self) -> bool {
        matches!(self, Self::TransitioningToTarget | Self::HoldingAtTarget)
    }

    /// Get a status string for display
    pub fn status_text(&self) -> &'static str {
        match self {
            Self::Inactive => "Inactive",
            Self::TransitioningToTarget => "Moving to target",
            Self::HoldingAtTarget => "Holding at target",
            Self::TransitioningToPrevious => "Returning",
        }
    }
}

/// Input to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Start (or redirect) the effect; `new_target` is true when the resolved
    /// target differs from the current one
    Activate {
        /// Resolved target differs from the one in use
        new_target: bool,
    },
    /// Return to the previous camera
    Deactivate,
    /// Hotkey: go to the target or come back, whichever is the other way
    Toggle,
    /// Engine is holding a wait-mode timeline at its end
    Waiting(Segment),
    /// Engine stopped playing a timeline
    Stopped(Segment),
    /// Target can no longer be rendered
    TargetLost,
}

/// Request refused without side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// Already going to or at the target
    AlreadyActive,
    /// Already inactive or returning
    AlreadyInactive,
}

/// Side effect required by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do
    Ignore,
    /// Nothing to do, and the caller asked for something
    Refuse(Refusal),
    /// Capture the camera, build to-target and at-target, start to-target
    Enter,
    /// Rebuild to-target and at-target for a new target, switch to to-target
    Retarget {
        /// Timeline playing now
        from: Segment,
    },
    /// Build to-previous, switch to it
    Return {
        /// Timeline playing now
        from: Segment,
    },
    /// Switch from to-previous back to to-target without rebuilding
    Resume,
    /// Switch from to-target to at-target
    Hold,
    /// Stop the timeline and drop the session
    Stop {
        /// Timeline playing now
        segment: Segment,
    },
    /// Playback already ended; drop the session
    Finish,
}

/// Next state and action for a trigger
pub fn transition(state: EffectState, trigger: Trigger) -> (EffectState, Action) {
    use EffectState::*;

    match (state, trigger) {
        (Inactive, Trigger::Activate { .. } | Trigger::Toggle) => (TransitioningToTarget, Action::Enter),
        (Inactive, Trigger::Deactivate) => (Inactive, Action::Refuse(Refusal::AlreadyInactive)),

        (TransitioningToTarget | HoldingAtTarget, Trigger::Activate { new_target: true }) => (
            TransitioningToTarget,
            Action::Retarget {
                from: segment_of(state),
            },
        ),
        (TransitioningToTarget | HoldingAtTarget, Trigger::Activate { new_target: false }) => {
            (state, Action::Refuse(Refusal::AlreadyActive))
        }
        (TransitioningToTarget | HoldingAtTarget, Trigger::Deactivate | Trigger::Toggle) => (
            TransitioningToPrevious,
            Action::Return {
                from: segment_of(state),
            },
        ),

        (TransitioningToPrevious, Trigger::Activate { new_target: true }) => (
            TransitioningToTarget,
            Action::Retarget {
                from: Segment::ToPrevious,
            },
        ),
        (TransitioningToPrevious, Trigger::Activate { new_target: false } | Trigger::Toggle) => {
            (TransitioningToTarget, Action::Resume)
        }
        (TransitioningToPrevious, Trigger::Deactivate) => (state, Action::Refuse(Refusal::AlreadyInactive)),

        (TransitioningToTarget, Trigger::Waiting(Segment::ToTarget)) => (HoldingAtTarget, Action::Hold),

        (_, Trigger::Stopped(segment)) if state.segment() == Some(segment) => (Inactive, Action::Finish),

        (TransitioningToTarget | HoldingAtTarget | TransitioningToPrevious, Trigger::TargetLost) => (
            Inactive,
            Action::Stop {
                segment: segment_of(state),
            },
        ),

        (_, Trigger::Waiting(_) | Trigger::Stopped(_) | Trigger::TargetLost) => (state, Action::Ignore),
    }
}

// Only reached from active states
fn segment_of(state: EffectState) -> Segment {
    state.segment().unwrap_or(Segment::ToTarget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use EffectState::*;

    const ALL_STATES: [EffectState; 4] = [
        Inactive,
        TransitioningToTarget,
        HoldingAtTarget,
        TransitioningToPrevious,
    ];

    #[test]
    fn test_toggle_cycle() {
        assert_eq!(transition(Inactive, Trigger::Toggle), (TransitioningToTarget, Action::Enter));
        assert_eq!(
            transition(TransitioningToTarget, Trigger::Toggle),
            (TransitioningToPrevious, Action::Return { from: Segment::ToTarget })
        );
        assert_eq!(
            transition(HoldingAtTarget, Trigger::Toggle),
            (TransitioningToPrevious, Action::Return { from: Segment::AtTarget })
        );
        assert_eq!(
            transition(TransitioningToPrevious, Trigger::Toggle),
            (TransitioningToTarget, Action::Resume)
        );
    }

    #[test]
    fn test_activate() {
        let same = Trigger::Activate { new_target: false };
        let other = Trigger::Activate { new_target: true };

        assert_eq!(transition(Inactive, same), (TransitioningToTarget, Action::Enter));
        assert_eq!(
            transition(TransitioningToTarget, same),
            (TransitioningToTarget, Action::Refuse(Refusal::AlreadyActive))
        );
        assert_eq!(
            transition(HoldingAtTarget, same),
            (HoldingAtTarget, Action::Refuse(Refusal::AlreadyActive))
        );
        assert_eq!(
            transition(TransitioningToTarget, other),
            (TransitioningToTarget, Action::Retarget { from: Segment::ToTarget })
        );
        assert_eq!(
            transition(HoldingAtTarget, other),
            (TransitioningToTarget, Action::Retarget { from: Segment::AtTarget })
        );
        assert_eq!(transition(TransitioningToPrevious, same), (TransitioningToTarget, Action::Resume));
        assert_eq!(
            transition(TransitioningToPrevious, other),
            (TransitioningToTarget, Action::Retarget { from: Segment::ToPrevious })
        );
    }

    #[test]
    fn test_deactivate() {
        assert_eq!(
            transition(Inactive, Trigger::Deactivate),
            (Inactive, Action::Refuse(Refusal::AlreadyInactive))
        );
        assert_eq!(
            transition(TransitioningToPrevious, Trigger::Deactivate),
            (TransitioningToPrevious, Action::Refuse(Refusal::AlreadyInactive))
        );
        assert_eq!(
            transition(TransitioningToTarget, Trigger::Deactivate),
            (TransitioningToPrevious, Action::Return { from: Segment::ToTarget })
        );
    }

    #[test]
    fn test_engine_events() {
        assert_eq!(
            transition(TransitioningToTarget, Trigger::Waiting(Segment::ToTarget)),
            (HoldingAtTarget, Action::Hold)
        );
        // Waiting on any other timeline changes nothing
        for state in ALL_STATES {
            for segment in [Segment::AtTarget, Segment::ToPrevious] {
                assert_eq!(transition(state, Trigger::Waiting(segment)), (state, Action::Ignore));
            }
        }
        assert_eq!(
            transition(HoldingAtTarget, Trigger::Waiting(Segment::ToTarget)),
            (HoldingAtTarget, Action::Ignore)
        );

        assert_eq!(
            transition(TransitioningToPrevious, Trigger::Stopped(Segment::ToPrevious)),
            (Inactive, Action::Finish)
        );
        // Stale stop for a timeline we already switched away from
        assert_eq!(
            transition(TransitioningToPrevious, Trigger::Stopped(Segment::ToTarget)),
            (TransitioningToPrevious, Action::Ignore)
        );
        assert_eq!(transition(Inactive, Trigger::Stopped(Segment::ToPrevious)), (Inactive, Action::Ignore));
    }

    #[test]
    fn test_target_lost_stops_active_segment() {
        for state in ALL_STATES {
            let (next, action) = transition(state, Trigger::TargetLost);
            assert_eq!(next, Inactive);
            match state.segment() {
                Some(segment) => assert_eq!(action, Action::Stop { segment }),
                None => assert_eq!(action, Action::Ignore),
            }
        }
    }

    #[test]
    fn test_target_states_need_an_enter_or_retarget() {
        // Every way into the target-facing states goes through an action that
        // resolves a target, or resumes a session that already has one.
        let triggers = [
            Trigger::Activate { new_target: false },
            Trigger::Activate { new_target: true },
            Trigger::Deactivate,
            Trigger::Toggle,
            Trigger::Waiting(Segment::ToTarget),
            Trigger::Stopped(Segment::ToTarget),
            Trigger::TargetLost,
        ];
        for state in ALL_STATES {
            for trigger in triggers {
                let (next, action) = transition(state, trigger);
                if next.is_engaged() && !state.is_engaged() {
                    assert!(
                        matches!(action, Action::Enter | Action::Retarget { .. } | Action::Resume),
                        "{state:?} --{trigger:?}--> {next:?} via {action:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_segments() {
        assert_eq!(Inactive.segment(), None);
        assert_eq!(HoldingAtTarget.segment(), Some(Segment::AtTarget));
        assert!(TransitioningToPrevious.is_active());
        assert!(!TransitioningToPrevious.is_engaged());
        assert_eq!(Segment::ToPrevious.to_string(), "to-previous");
    }
}
