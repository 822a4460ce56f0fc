// SPDX-License-Identifier: MIT OR Apache-2.0
//! Angle and frame helpers.
//!
//! Headings are rotations about +z. A heading of zero faces +y and positive
//! headings turn towards +x, so forward is `(sin h, cos h, 0)`.

use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// Wrap an angle into (-π, π]
pub fn normalize_angle(angle: f32) -> f32 {
    let wrapped = PI - (PI - angle).rem_euclid(TAU);
    // rem_euclid can round up to TAU
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Unit forward vector for a heading
pub fn forward(heading: f32) -> Vec3 {
    Vec3::new(heading.sin(), heading.cos(), 0.0)
}

/// Unit right vector for a heading
pub fn right(heading: f32) -> Vec3 {
    Vec3::new(heading.cos(), -heading.sin(), 0.0)
}

/// Express a world-space vector in the frame of something facing `heading`
pub fn world_to_local(v: Vec3, heading: f32) -> Vec3 {
    Vec3::new(v.dot(right(heading)), v.dot(forward(heading)), v.z)
}

/// Inverse of [`world_to_local`]
pub fn local_to_world(v: Vec3, heading: f32) -> Vec3 {
    right(heading) * v.x + forward(heading) * v.y + Vec3::Z * v.z
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_normalize_range() {
        assert!((normalize_angle(PI) - PI).abs() < EPS);
        assert!((normalize_angle(-PI) - PI).abs() < EPS);
        assert!(normalize_angle(0.0).abs() < EPS);
        assert!((normalize_angle(2.5 * PI) - FRAC_PI_2).abs() < 1e-4);
        assert!((normalize_angle(-FRAC_PI_2 - TAU) + FRAC_PI_2).abs() < 1e-4);

        for i in -100..100 {
            let a = normalize_angle(i as f32 * 0.37);
            assert!(a > -PI && a <= PI, "{a} out of range");
        }
    }

    #[test]
    fn test_frames() {
        assert!((forward(0.0) - Vec3::Y).length() < EPS);
        assert!((forward(FRAC_PI_2) - Vec3::X).length() < EPS);
        assert!((right(0.0) - Vec3::X).length() < EPS);

        let heading = 0.8;
        let v = Vec3::new(3.0, -2.0, 5.0);
        let back = local_to_world(world_to_local(v, heading), heading);
        assert!((back - v).length() < 1e-4);

        let ahead = world_to_local(forward(heading) * 10.0, heading);
        assert!((ahead - Vec3::new(0.0, 10.0, 0.0)).length() < 1e-4);
    }
}
