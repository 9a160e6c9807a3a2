use std::f32::consts::TAU;

use glam::{EulerRot, Mat4, Vec3};

/// Where the ring group is anchored in the world.
const ANCHOR: Vec3 = Vec3::new(2.8, 0.8, 0.0);
/// Idle tilt of the anchor, degrees about X and Z.
const IDLE_TILT_X_DEG: f32 = 10.0;
const IDLE_TILT_Z_DEG: f32 = -20.0;
/// Idle offset of the spinning group inside the anchor.
const IDLE_OFFSET: Vec3 = Vec3::new(-0.5, -0.5, 0.0);
/// Idle spin rate about Y (radians/second).
pub const SPIN_RATE: f32 = 0.5;

/// The group the ring tiles hang from: a tilted anchor with a spinning
/// child. Posed and spinning only while idle-collapsed; otherwise it holds
/// a neutral pose so tweens alone move the ring tiles.
#[derive(Debug, Clone, Copy)]
pub struct Rig {
    idle: bool,
    spin: f32,
}

impl Rig {
    pub fn new() -> Self {
        Self {
            idle: true,
            spin: 0.0,
        }
    }

    /// Switch idle motion on or off. The spin restarts from 0 on every
    /// change.
    pub fn set_idle(&mut self, idle: bool) {
        if self.idle != idle {
            self.idle = idle;
            self.spin = 0.0;
        }
    }

    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn advance(&mut self, dt: f32) {
        if self.idle {
            self.spin = (self.spin + dt * SPIN_RATE) % TAU;
        }
    }

    /// Current spin angle about Y.
    #[cfg(test)]
    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// Ring-local to world transform for the current pose.
    pub fn matrix(&self) -> Mat4 {
        if !self.idle {
            return Mat4::from_translation(ANCHOR);
        }
        let anchor = Mat4::from_translation(ANCHOR)
            * Mat4::from_euler(
                EulerRot::XYZ,
                IDLE_TILT_X_DEG.to_radians(),
                0.0,
                IDLE_TILT_Z_DEG.to_radians(),
            );
        let child = Mat4::from_translation(IDLE_OFFSET) * Mat4::from_rotation_y(self.spin);
        anchor * child
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spins_only_while_idle() {
        let mut rig = Rig::new();
        rig.advance(1.0);
        assert!((rig.spin() - 0.5).abs() < 1e-6);

        rig.set_idle(false);
        assert_eq!(rig.spin(), 0.0);
        rig.advance(1.0);
        assert_eq!(rig.spin(), 0.0);
    }

    #[test]
    fn spin_restarts_from_zero() {
        let mut rig = Rig::new();
        rig.advance(3.0);
        rig.set_idle(false);
        rig.set_idle(true);
        assert_eq!(rig.spin(), 0.0);
    }

    #[test]
    fn neutral_pose_is_a_translation() {
        let mut rig = Rig::new();
        rig.set_idle(false);
        let p = rig.matrix().transform_point3(Vec3::ZERO);
        assert_eq!(p, ANCHOR);
    }

    #[test]
    fn idle_pose_keeps_ring_radius_in_child_frame() {
        let rig = Rig::new();
        let center = rig.matrix().transform_point3(Vec3::ZERO);
        let edge = rig.matrix().transform_point3(Vec3::new(0.0, 0.0, 1.4));
        assert!(((edge - center).length() - 1.4).abs() < 1e-5);
    }
}
