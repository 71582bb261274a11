use std::collections::HashSet;

use thiserror::Error;

use crate::{
    bitmask_flags::{Feature, FeatureSet},
    collision::{Point3, Vec3},
    constants::{
        ACCELERATION_FACTOR, BASE_SPEED, CAPSULE_EYE_OFFSET, CAPSULE_FOOT_OFFSET, CAPSULE_RADIUS,
        CONTROLS_SPAWN, DAMPING_RATE, FLOOR_DAMPING_BOOST, INTRO_SPAWN, MAX_PITCH_DEG,
        MOUSE_SENSITIVITY, PITCH_LIMIT_CEILING, POI_PROXIMITY_RADIUS, ROTATION_SMOOTHING,
    },
    input::KeyBindings,
    orientation::SmoothingMode,
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("rotation smoothing must be in (0, 1], got {0}")]
    SmoothingOutOfRange(f32),

    #[error("pitch limit must be in (0, 90) degrees, got {0} rad")]
    PitchLimitOutOfRange(f32),

    #[error("capsule eye offset ({eye}) must be above foot offset ({foot})")]
    InvertedCapsule { foot: f32, eye: f32 },

    #[error("key code {0:?} is bound more than once")]
    DuplicateBinding(String),

    #[error("correction mask must be finite with a zero vertical component, got {0:?}")]
    VerticalCorrection([f32; 3]),

    #[error("spawn point {0} is not finite")]
    NonFiniteSpawn(&'static str),
}

/// Where (and facing which way) the player capsule is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    /// Ground point under the capsule.
    pub position: Point3,
    pub yaw: f32,
    pub pitch: f32,
}

impl SpawnPoint {
    /// Start of the free walk, right after the intro.
    pub const CONTROLS: SpawnPoint = SpawnPoint {
        position: Point3::new(CONTROLS_SPAWN[0], CONTROLS_SPAWN[1], CONTROLS_SPAWN[2]),
        yaw: 0.0,
        pitch: 0.0,
    };

    /// Vantage point used while the intro plays.
    pub const INTRO: SpawnPoint = SpawnPoint {
        position: Point3::new(INTRO_SPAWN[0], INTRO_SPAWN[1], INTRO_SPAWN[2]),
        yaw: 0.0,
        pitch: -0.15,
    };

    pub fn new(position: Point3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite()) && self.yaw.is_finite() && self.pitch.is_finite()
    }
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self::CONTROLS
    }
}

/// Everything a `FirstPersonController` needs, fixed at construction.
#[derive(Clone, Debug)]
pub struct ControllerConfig {
    pub base_speed: f32,
    pub acceleration: f32,
    pub damping_rate: f32,
    pub floor_damping_boost: f32,
    pub sensitivity: f32,
    pub smoothing: f32,
    pub smoothing_mode: SmoothingMode,
    /// Radians.
    pub pitch_limit: f32,
    pub capsule_radius: f32,
    pub foot_offset: f32,
    pub eye_offset: f32,
    pub poi_radius: f32,
    /// Mask applied to collision corrections; vertical is zeroed by default.
    pub correction_mask: Vec3,
    pub spawn: SpawnPoint,
    pub features: FeatureSet,
    pub bindings: KeyBindings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            base_speed: BASE_SPEED,
            acceleration: ACCELERATION_FACTOR,
            damping_rate: DAMPING_RATE,
            floor_damping_boost: FLOOR_DAMPING_BOOST,
            sensitivity: MOUSE_SENSITIVITY,
            smoothing: ROTATION_SMOOTHING,
            smoothing_mode: SmoothingMode::default(),
            pitch_limit: MAX_PITCH_DEG.to_radians(),
            capsule_radius: CAPSULE_RADIUS,
            foot_offset: CAPSULE_FOOT_OFFSET,
            eye_offset: CAPSULE_EYE_OFFSET,
            poi_radius: POI_PROXIMITY_RADIUS,
            correction_mask: Vec3::new(1.0, 0.0, 1.0),
            spawn: SpawnPoint::CONTROLS,
            features: FeatureSet::from_slice(&[Feature::PoiProximity]),
            bindings: KeyBindings::default(),
        }
    }
}

impl ControllerConfig {
    pub fn with_base_speed(mut self, speed: f32) -> Self {
        self.base_speed = speed;
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: f32) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_smoothing(mut self, factor: f32, mode: SmoothingMode) -> Self {
        self.smoothing = factor;
        self.smoothing_mode = mode;
        self
    }

    pub fn with_pitch_limit_deg(mut self, degrees: f32) -> Self {
        self.pitch_limit = degrees.to_radians();
        self
    }

    pub fn with_capsule_radius(mut self, radius: f32) -> Self {
        self.capsule_radius = radius;
        self
    }

    pub fn with_spawn(mut self, spawn: SpawnPoint) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn with_feature(mut self, feature: Feature, on: bool) -> Self {
        self.features.set(feature, on);
        self
    }

    pub fn with_bindings(mut self, bindings: KeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    #[inline]
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.has(feature)
    }

    /// Reject values the controller cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("base speed", self.base_speed),
            ("acceleration", self.acceleration),
            ("damping rate", self.damping_rate),
            ("floor damping boost", self.floor_damping_boost),
            ("sensitivity", self.sensitivity),
            ("capsule radius", self.capsule_radius),
            ("poi radius", self.poi_radius),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if !(self.smoothing.is_finite() && self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::SmoothingOutOfRange(self.smoothing));
        }

        if !(self.pitch_limit.is_finite()
            && self.pitch_limit > 0.0
            && self.pitch_limit < PITCH_LIMIT_CEILING)
        {
            return Err(ConfigError::PitchLimitOutOfRange(self.pitch_limit));
        }

        if !(self.foot_offset.is_finite()
            && self.eye_offset.is_finite()
            && self.eye_offset > self.foot_offset)
        {
            return Err(ConfigError::InvertedCapsule {
                foot: self.foot_offset,
                eye: self.eye_offset,
            });
        }

        let mask = self.correction_mask;
        if !(mask.iter().all(|v| v.is_finite()) && mask.y == 0.0) {
            return Err(ConfigError::VerticalCorrection([mask.x, mask.y, mask.z]));
        }

        if !self.spawn.is_finite() {
            return Err(ConfigError::NonFiniteSpawn("spawn"));
        }

        let mut seen = HashSet::new();
        for code in self.bindings.codes() {
            if !seen.insert(code) {
                return Err(ConfigError::DuplicateBinding(code.to_string()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmask_flags::MoveAction;

    #[test]
    fn default_config_is_valid() {
        let cfg = ControllerConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.base_speed, 12.0);
        assert_eq!(cfg.sensitivity, 3000.0);
        assert_eq!(cfg.capsule_radius, 1.5);
        assert_eq!(cfg.spawn.position, Point3::new(-13.0, 1.0, -60.0));
    }

    #[test]
    fn rejects_non_positive_values() {
        let err = ControllerConfig::default().with_base_speed(0.0).validate();
        assert!(matches!(err, Err(ConfigError::NotPositive { name: "base speed", .. })));

        let err = ControllerConfig::default().with_capsule_radius(f32::NAN).validate();
        assert!(matches!(err, Err(ConfigError::NotPositive { name: "capsule radius", .. })));
    }

    #[test]
    fn rejects_bad_smoothing_and_pitch() {
        let err = ControllerConfig::default()
            .with_smoothing(1.5, SmoothingMode::PerFrame)
            .validate();
        assert_eq!(err, Err(ConfigError::SmoothingOutOfRange(1.5)));

        let err = ControllerConfig::default().with_pitch_limit_deg(90.0).validate();
        assert!(matches!(err, Err(ConfigError::PitchLimitOutOfRange(_))));
    }

    #[test]
    fn rejects_vertical_correction_mask() {
        let cfg = ControllerConfig {
            correction_mask: Vec3::new(1.0, 1.0, 1.0),
            ..ControllerConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::VerticalCorrection([1.0, 1.0, 1.0]))
        );
    }

    #[test]
    fn rejects_non_finite_spawn() {
        let spawn = SpawnPoint::new(Point3::new(f32::INFINITY, 0.0, 0.0), 0.0, 0.0);
        let err = ControllerConfig::default().with_spawn(spawn).validate();
        assert_eq!(err, Err(ConfigError::NonFiniteSpawn("spawn")));
    }

    #[test]
    fn rejects_duplicate_binding() {
        let mut bindings = KeyBindings::empty();
        bindings.bind("KeyW", MoveAction::Forward);
        bindings.bind("KeyW", MoveAction::Back);
        let err = ControllerConfig::default().with_bindings(bindings).validate();
        assert_eq!(err, Err(ConfigError::DuplicateBinding("KeyW".into())));
    }
}
