use crate::{
    collision::Vec3,
    constants::{
        MAX_PITCH_DEG, MOUSE_SENSITIVITY, ROTATION_SMOOTHING, SMOOTHING_REFERENCE_HZ,
    },
    motion,
};

/// How the displayed rotation chases the target rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmoothingMode {
    /// Fixed lerp factor per frame. Convergence speed depends on the frame rate.
    PerFrame,
    /// Factor rescaled by `dt` so convergence takes the same wall-clock time at any frame rate.
    #[default]
    TimeNormalized,
}

/// Pitch/yaw pair in radians. Roll is always zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Angles {
    pub pitch: f32,
    pub yaw: f32,
}

/// Turns mouse deltas into a smoothed camera rotation.
#[derive(Clone, Debug)]
pub struct OrientationController {
    displayed: Angles,
    target: Angles,
    sensitivity: f32,
    smoothing: f32,
    mode: SmoothingMode,
    pitch_limit: f32,
    enabled: bool,
}

impl OrientationController {
    pub fn new(sensitivity: f32, smoothing: f32, mode: SmoothingMode, pitch_limit: f32) -> Self {
        Self {
            displayed: Angles::default(),
            target: Angles::default(),
            sensitivity,
            smoothing,
            mode,
            pitch_limit: pitch_limit.abs(),
            enabled: true,
        }
    }

    /// Apply a mouse delta to the target rotation. Ignored while disabled.
    pub fn update_rotation(&mut self, dx: f32, dy: f32) {
        if !self.enabled || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.target.pitch = (self.target.pitch - dy / self.sensitivity)
            .clamp(-self.pitch_limit, self.pitch_limit);
        self.target.yaw -= dx / self.sensitivity;
    }

    /// Lerp factor used for a frame of length `dt`.
    pub fn smoothing_factor(&self, dt: f32) -> f32 {
        match self.mode {
            SmoothingMode::PerFrame => self.smoothing,
            SmoothingMode::TimeNormalized => {
                let frames = motion::sanitize_dt(dt) * SMOOTHING_REFERENCE_HZ;
                1.0 - (1.0 - self.smoothing).powf(frames)
            }
        }
    }

    /// Move the displayed rotation toward the target.
    pub fn smooth_step(&mut self, dt: f32) {
        let t = self.smoothing_factor(dt).clamp(0.0, 1.0);
        self.displayed.pitch += (self.target.pitch - self.displayed.pitch) * t;
        self.displayed.yaw += (self.target.yaw - self.displayed.yaw) * t;
        self.displayed.pitch = self.displayed.pitch.clamp(-self.pitch_limit, self.pitch_limit);
    }

    /// Snap both displayed and target rotation (used by teleports).
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        let pitch = pitch.clamp(-self.pitch_limit, self.pitch_limit);
        self.target = Angles { pitch, yaw };
        self.displayed = self.target;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn displayed(&self) -> Angles {
        self.displayed
    }

    #[inline]
    pub fn target(&self) -> Angles {
        self.target
    }

    #[inline]
    pub fn pitch_limit(&self) -> f32 {
        self.pitch_limit
    }

    /// Camera look direction (camera -Z) of the displayed rotation.
    pub fn forward(&self) -> Vec3 {
        motion::look_direction(self.displayed.yaw, self.displayed.pitch)
    }

    pub fn horizontal_forward(&self) -> Option<Vec3> {
        motion::horizontal_forward(self.displayed.yaw, self.displayed.pitch)
    }

    pub fn side(&self) -> Option<Vec3> {
        motion::side_vector(self.displayed.yaw, self.displayed.pitch)
    }
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(
            MOUSE_SENSITIVITY,
            ROTATION_SMOOTHING,
            SmoothingMode::default(),
            MAX_PITCH_DEG.to_radians(),
        )
    }
}
