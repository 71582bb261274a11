pub mod bitmask_flags;
pub mod camera_rig;
pub mod collision;
pub mod config;
pub mod constants;
pub mod controller;
pub mod input;
pub mod motion;
pub mod movement;
pub mod orientation;
pub mod poi;

pub use bitmask_flags::{ActionSet, Feature, FeatureSet, MoveAction};
pub use camera_rig::{CameraPose, CameraRig};
pub use collision::{Capsule, CollisionWorld, Penetration, TriangleMesh};
pub use config::{ConfigError, ControllerConfig, SpawnPoint};
pub use controller::{FirstPersonController, FrameOutput};
pub use input::{InputSampler, InputSource, KeyBindings, KeyEvent, QueuedInput};
pub use movement::{MovementIntegrator, MovementParams, StepResult};
pub use orientation::{Angles, OrientationController, SmoothingMode};
pub use poi::{PoiKind, PoiRegistry, PointOfInterest, is_saint_name};
