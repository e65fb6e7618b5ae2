//! Orientation helpers derived from path directions.
use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const HORIZONTAL_EPSILON: f64 = 1e-6;

/// Euler rotation in degrees (pitch about the right axis, yaw about world up, roll about forward).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
}

impl Rotation {
    pub const IDENTITY: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn new(pitch: f64, yaw: f64, roll: f64) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Interprets `(x, y, z)` as `(pitch, yaw, roll)`.
    pub fn from_vec3(v: DVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    pub fn to_vec3(self) -> DVec3 {
        DVec3::new(self.pitch, self.yaw, self.roll)
    }
}

/// Rotation whose forward axis follows `direction`, with zero roll.
///
/// A (near) vertical direction has no defined yaw; it maps to yaw 0 and pitch ±90
/// by the sign of `direction.z`.
pub fn rotation_aligned_to(direction: DVec3) -> Rotation {
    let horizontal = direction.x.hypot(direction.y);
    if horizontal < HORIZONTAL_EPSILON {
        let pitch = if direction.z > 0.0 { 90.0 } else { -90.0 };
        return Rotation::new(pitch, 0.0, 0.0);
    }
    Rotation::new(
        direction.z.atan2(horizontal).to_degrees(),
        direction.y.atan2(direction.x).to_degrees(),
        0.0,
    )
}

/// Lateral axis to the right of `direction`: `normalize(cross(up, direction))`.
///
/// Falls back to world X when `direction` is vertical.
pub fn right_axis(direction: DVec3) -> DVec3 {
    let right = DVec3::Z.cross(direction);
    if right.length() < HORIZONTAL_EPSILON {
        DVec3::X
    } else {
        right.normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rot(r: Rotation, pitch: f64, yaw: f64) {
        assert!((r.pitch - pitch).abs() < 1e-9, "pitch {} != {pitch}", r.pitch);
        assert!((r.yaw - yaw).abs() < 1e-9, "yaw {} != {yaw}", r.yaw);
        assert_eq!(r.roll, 0.0);
    }

    #[test]
    fn horizontal_directions_map_to_yaw() {
        assert_rot(rotation_aligned_to(DVec3::X), 0.0, 0.0);
        assert_rot(rotation_aligned_to(DVec3::Y), 0.0, 90.0);
        assert_rot(rotation_aligned_to(DVec3::NEG_X), 0.0, 180.0);
    }

    #[test]
    fn climbing_direction_has_positive_pitch() {
        let r = rotation_aligned_to(DVec3::new(1.0, 0.0, 1.0).normalize());
        assert_rot(r, 45.0, 0.0);
    }

    #[test]
    fn vertical_direction_uses_sign_of_z() {
        assert_rot(rotation_aligned_to(DVec3::Z), 90.0, 0.0);
        assert_rot(rotation_aligned_to(DVec3::NEG_Z), -90.0, 0.0);
    }

    #[test]
    fn right_axis_is_perpendicular_in_ground_plane() {
        assert!(right_axis(DVec3::X).abs_diff_eq(DVec3::Y, 1e-12));
        assert!(right_axis(DVec3::Y).abs_diff_eq(DVec3::NEG_X, 1e-12));
        let r = right_axis(DVec3::new(1.0, 1.0, 0.5));
        assert!(r.z.abs() < 1e-12);
        assert!((r.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn right_axis_falls_back_to_world_x_when_vertical() {
        assert_eq!(right_axis(DVec3::Z), DVec3::X);
    }

    #[test]
    fn from_vec3_reads_pitch_yaw_roll() {
        let r = Rotation::from_vec3(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(r, Rotation::new(1.0, 2.0, 3.0));
    }
}
