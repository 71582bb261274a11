//! Walkthrough tunables. All distances are in meters, times in seconds, angles in radians.

use std::f32::consts::FRAC_PI_2;

/// Default walking speed. Impulses scale with this value.
///
/// Observed useful range: 8 .. 45.
pub const BASE_SPEED: f32 = 12.0;

/// Multiplier applied to `BASE_SPEED * dt` for each held movement action.
pub const ACCELERATION_FACTOR: f32 = 4.0;

/// Exponential damping rate applied to the velocity every frame.
pub const DAMPING_RATE: f32 = 4.0;

/// Damping multiplier while standing on a floor (ground detection feature only).
pub const FLOOR_DAMPING_BOOST: f32 = 1.25;

/// Mouse counts per radian of rotation. Larger is slower.
///
/// Observed useful range: 2000 .. 3000.
pub const MOUSE_SENSITIVITY: f32 = 3000.0;

/// Fraction of the remaining angle covered by the smoothed camera per reference frame.
pub const ROTATION_SMOOTHING: f32 = 0.1;

/// Frame rate at which `ROTATION_SMOOTHING` was tuned.
pub const SMOOTHING_REFERENCE_HZ: f32 = 60.0;

/// Pitch limit in degrees (up and down).
pub const MAX_PITCH_DEG: f32 = 89.0;

/// Hard upper bound for any configured pitch limit.
pub const PITCH_LIMIT_CEILING: f32 = FRAC_PI_2;

/// Player capsule radius.
pub const CAPSULE_RADIUS: f32 = 1.5;

/// Height of the capsule's lower endpoint above the spawn point.
pub const CAPSULE_FOOT_OFFSET: f32 = 0.25;

/// Height of the capsule's upper endpoint (and the camera) above the spawn point.
pub const CAPSULE_EYE_OFFSET: f32 = 3.0;

/// A point of interest is "nearby" when closer than this to the camera.
pub const POI_PROXIMITY_RADIUS: f32 = 5.0;

/// Where the player is placed once the intro is over.
pub const CONTROLS_SPAWN: [f32; 3] = [-13.0, 1.0, -60.0];

/// Where the intro plays, looking down the nave.
pub const INTRO_SPAWN: [f32; 3] = [-13.0, 1.0, -20.0];

/// Length of the intro before control is handed to the player.
pub const INTRO_DURATION_SECS: f32 = 12.0;
