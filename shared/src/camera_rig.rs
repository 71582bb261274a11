use crate::collision::{Point3, Quat};
use crate::motion;

/// Camera placement handed to the renderer every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Point3,
    pub pitch: f32,
    pub yaw: f32,
    /// Always 0; kept so renderers can consume the pose as plain Euler angles.
    pub roll: f32,
}

impl CameraPose {
    pub fn new(position: Point3, pitch: f32, yaw: f32) -> Self {
        Self {
            position,
            pitch,
            yaw,
            roll: 0.0,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.pitch.is_finite()
            && self.yaw.is_finite()
            && self.roll.is_finite()
    }

    /// Rotation applied yaw first, then pitch.
    #[inline]
    pub fn rotation(&self) -> Quat {
        motion::look_rotation(self.yaw, self.pitch)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::new(Point3::origin(), 0.0, 0.0)
    }
}

/// Holds the last valid camera pose.
#[derive(Clone, Debug, Default)]
pub struct CameraRig {
    pose: CameraPose,
    rejected: u64,
}

impl CameraRig {
    pub fn new(initial: CameraPose) -> Self {
        Self {
            pose: initial,
            rejected: 0,
        }
    }

    /// Commit a new pose. Non-finite poses are dropped and the previous one is kept.
    ///
    /// Returns whether the pose was accepted.
    pub fn commit(&mut self, position: Point3, pitch: f32, yaw: f32) -> bool {
        let candidate = CameraPose::new(position, pitch, yaw);
        if !candidate.is_finite() {
            self.rejected += 1;
            log::warn!("camera rig: rejected non-finite pose {candidate:?}");
            return false;
        }
        self.pose = candidate;
        true
    }

    #[inline]
    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// How many poses were rejected so far.
    #[inline]
    pub fn rejected_count(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_replaces_pose() {
        let mut rig = CameraRig::default();
        assert!(rig.commit(Point3::new(1.0, 2.0, 3.0), 0.2, -0.4));
        let pose = rig.pose();
        assert_eq!(pose.position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.pitch, 0.2);
        assert_eq!(pose.yaw, -0.4);
        assert_eq!(pose.roll, 0.0);
    }

    #[test]
    fn non_finite_pose_is_rejected() {
        let mut rig = CameraRig::new(CameraPose::new(Point3::new(0.0, 4.0, 0.0), 0.0, 0.0));
        assert!(!rig.commit(Point3::new(f32::NAN, 0.0, 0.0), 0.0, 0.0));
        assert!(!rig.commit(Point3::new(0.0, 0.0, 0.0), f32::INFINITY, 0.0));
        assert_eq!(rig.pose().position, Point3::new(0.0, 4.0, 0.0));
        assert_eq!(rig.rejected_count(), 2);
    }
}
