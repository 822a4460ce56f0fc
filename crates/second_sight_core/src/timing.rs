// SPDX-License-Identifier: MIT OR Apache-2.0
//! Transition duration from travel distance.

use crate::config::TimingConfig;
use glam::Vec3;

/// Linear distance-to-duration ramp, clamped at both ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    min_distance: f32,
    max_distance: f32,
    min_time: f32,
    max_time: f32,
    fallback_time: f32,
}

impl TransitionTiming {
    /// Create from configuration
    pub fn new(config: &TimingConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_time: config.min_time,
            max_time: config.max_time,
            fallback_time: config.fallback_time,
        }
    }

    /// Duration for travelling `distance` units
    pub fn duration_for_distance(&self, distance: f32) -> f32 {
        let span = self.max_distance - self.min_distance;
        let relative = if span > 0.0 {
            ((distance - self.min_distance) / span).clamp(0.0, 1.0)
        } else if distance >= self.max_distance {
            1.0
        } else {
            0.0
        };
        self.min_time + (self.max_time - self.min_time) * relative
    }

    /// Duration for moving from `from` to `to`, or the fallback without a destination
    pub fn duration(&self, from: Vec3, to: Option<Vec3>) -> f32 {
        match to {
            Some(to) => self.duration_for_distance(from.distance(to)),
            None => self.fallback_time,
        }
    }
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self::new(&TimingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let timing = TransitionTiming::default();
        assert_eq!(timing.duration_for_distance(0.0), 0.5);
        assert_eq!(timing.duration_for_distance(2000.0), 0.5);
        assert_eq!(timing.duration_for_distance(10000.0), 2.0);
        assert_eq!(timing.duration_for_distance(50000.0), 2.0);
        assert!((timing.duration_for_distance(6000.0) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn test_monotonic() {
        let timing = TransitionTiming::default();
        let mut previous = timing.duration_for_distance(0.0);
        for step in 1..=120 {
            let d = timing.duration_for_distance(step as f32 * 100.0);
            assert!(d >= previous);
            assert!((0.5..=2.0).contains(&d));
            previous = d;
        }
    }

    #[test]
    fn test_positions_and_fallback() {
        let timing = TransitionTiming::default();
        let far = Vec3::new(0.0, 10000.0, 0.0);
        assert_eq!(timing.duration(Vec3::ZERO, Some(far)), 2.0);
        assert_eq!(timing.duration(Vec3::ZERO, None), 1.0);
    }

    #[test]
    fn test_degenerate_span() {
        let config = TimingConfig {
            min_distance: 100.0,
            max_distance: 100.0,
            ..TimingConfig::default()
        };
        let timing = TransitionTiming::new(&config);
        assert_eq!(timing.duration_for_distance(50.0), 0.5);
        assert_eq!(timing.duration_for_distance(100.0), 2.0);
    }
}
