use crate::{
    bitmask_flags::{Feature, MoveAction},
    camera_rig::{CameraPose, CameraRig},
    collision::CollisionWorld,
    config::{ConfigError, ControllerConfig, SpawnPoint},
    input::{InputSampler, InputSource},
    movement::{MovementIntegrator, MovementParams, StepResult},
    orientation::OrientationController,
    poi::PoiRegistry,
};

/// What the host needs after one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub pose: CameraPose,
    pub step: StepResult,
    /// Name of the exhibit within reach, when proximity reporting is on.
    pub nearby: Option<String>,
    /// Text to show because interact is held near an exhibit.
    pub display_text: Option<String>,
}

/// The whole first-person pipeline: input, movement, look smoothing, camera.
#[derive(Clone, Debug)]
pub struct FirstPersonController {
    config: ControllerConfig,
    input: InputSampler,
    orientation: OrientationController,
    movement: MovementIntegrator,
    rig: CameraRig,
}

impl FirstPersonController {
    pub fn new(config: ControllerConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut orientation = OrientationController::new(
            config.sensitivity,
            config.smoothing,
            config.smoothing_mode,
            config.pitch_limit,
        );
        orientation.set_orientation(config.spawn.yaw, config.spawn.pitch);

        let movement = MovementIntegrator::new(MovementParams::from_config(&config), &config.spawn);
        let angles = orientation.displayed();
        let rig = CameraRig::new(CameraPose::new(movement.eye(), angles.pitch, angles.yaw));

        log::debug!(
            "controller: speed {} sensitivity {} radius {} spawn {:?}",
            config.base_speed,
            config.sensitivity,
            config.capsule_radius,
            config.spawn.position
        );

        Ok(Self {
            input: InputSampler::new(config.bindings.clone()),
            orientation,
            movement,
            rig,
            config,
        })
    }

    /// Run one frame.
    ///
    /// Order: drain input, apply look delta to the target rotation, integrate
    /// movement along the current heading, smooth the rotation, commit the camera.
    pub fn frame(
        &mut self,
        dt: f32,
        source: &mut dyn InputSource,
        world: &CollisionWorld,
        pois: &PoiRegistry,
    ) -> FrameOutput {
        self.input.pump(source);
        let (dx, dy) = self.input.take_mouse_delta();
        self.orientation.update_rotation(dx, dy);

        let step = self.movement.update(
            dt,
            self.input.actions(),
            self.orientation.displayed(),
            world,
        );

        self.orientation.smooth_step(dt);
        let angles = self.orientation.displayed();
        self.rig.commit(step.eye, angles.pitch, angles.yaw);
        let pose = self.rig.pose();

        let mut nearby = None;
        let mut display_text = None;
        if self.config.has_feature(Feature::PoiProximity) {
            if let Some(poi) = pois.nearest_within(&pose.position, self.config.poi_radius) {
                if self.input.is_held(MoveAction::Interact) {
                    display_text = Some(poi.text.clone());
                }
                nearby = Some(poi.name.clone());
            }
        }

        FrameOutput {
            pose,
            step,
            nearby,
            display_text,
        }
    }

    /// Gate all mouse and key input. Disabling forgets held keys and pending deltas.
    pub fn set_movement_enabled(&mut self, enabled: bool) {
        self.input.set_enabled(enabled);
        self.orientation.set_enabled(enabled);
    }

    #[inline]
    pub fn movement_enabled(&self) -> bool {
        self.input.is_enabled()
    }

    /// Move the player to `spawn`, stopped, facing the spawn's direction.
    pub fn teleport(&mut self, spawn: &SpawnPoint) {
        if !spawn.is_finite() {
            log::warn!("controller: ignoring teleport to non-finite spawn {spawn:?}");
            return;
        }
        self.movement.teleport(spawn);
        self.orientation.set_orientation(spawn.yaw, spawn.pitch);
        let angles = self.orientation.displayed();
        self.rig.commit(self.movement.eye(), angles.pitch, angles.yaw);
    }

    #[inline]
    pub fn pose(&self) -> CameraPose {
        self.rig.pose()
    }

    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[inline]
    pub fn input(&self) -> &InputSampler {
        &self.input
    }

    #[inline]
    pub fn orientation(&self) -> &OrientationController {
        &self.orientation
    }

    #[inline]
    pub fn movement(&self) -> &MovementIntegrator {
        &self.movement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::{Point3, TriangleMesh},
        input::QueuedInput,
    };

    const DT: f32 = 1.0 / 60.0;

    fn controller() -> FirstPersonController {
        let spawn = SpawnPoint::new(Point3::new(0.0, 0.0, 0.0), 0.0, 0.0);
        FirstPersonController::new(ControllerConfig::default().with_spawn(spawn)).expect("valid")
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = FirstPersonController::new(ControllerConfig::default().with_sensitivity(-1.0));
        assert!(matches!(err, Err(ConfigError::NotPositive { .. })));
    }

    #[test]
    fn camera_follows_capsule_end() {
        let mut c = controller();
        let world = CollisionWorld::empty();
        let pois = PoiRegistry::new();
        let mut q = QueuedInput::new(true);
        q.key_down("KeyW");
        let out = c.frame(DT, &mut q, &world, &pois);
        assert_eq!(out.pose.position, c.movement().eye());
        assert!(out.pose.position.z < 0.0);
        assert_eq!(out.pose.roll, 0.0);
    }

    #[test]
    fn disabled_controller_neither_moves_nor_rotates() {
        let mut c = controller();
        let world = CollisionWorld::empty();
        let pois = PoiRegistry::new();
        c.set_movement_enabled(false);
        let start = c.pose();

        let mut q = QueuedInput::new(true);
        q.key_down("KeyW").pointer_move(400.0, 200.0);
        for _ in 0..30 {
            c.frame(DT, &mut q, &world, &pois);
        }
        assert_eq!(c.pose(), start);

        // Re-enabling only reacts to new events: the old key-down is gone.
        c.set_movement_enabled(true);
        for _ in 0..5 {
            c.frame(DT, &mut q, &world, &pois);
        }
        assert_eq!(c.pose(), start);

        q.key_down("KeyW");
        c.frame(DT, &mut q, &world, &pois);
        assert_ne!(c.pose().position, start.position);
    }

    #[test]
    fn mouse_look_is_smoothed_toward_target() {
        let mut c = controller();
        let world = CollisionWorld::empty();
        let pois = PoiRegistry::new();
        let mut q = QueuedInput::new(true);
        q.pointer_move(-300.0, 0.0);
        c.frame(DT, &mut q, &world, &pois);
        let yaw = c.pose().yaw;
        assert!(yaw > 0.0 && yaw < 0.1);
        for _ in 0..300 {
            c.frame(DT, &mut q, &world, &pois);
        }
        assert!((c.pose().yaw - 0.1).abs() < 1.0e-4);
    }

    #[test]
    fn pointer_motion_without_capture_is_ignored() {
        let mut c = controller();
        let world = CollisionWorld::empty();
        let pois = PoiRegistry::new();
        let mut q = QueuedInput::new(false);
        q.pointer_move(500.0, 500.0);
        c.frame(DT, &mut q, &world, &pois);
        assert_eq!(c.orientation().target().yaw, 0.0);
    }

    #[test]
    fn teleport_resets_motion_and_pose() {
        let mut c = controller();
        let world = CollisionWorld::empty();
        let pois = PoiRegistry::new();
        let mut q = QueuedInput::new(true);
        q.key_down("KeyW");
        for _ in 0..10 {
            c.frame(DT, &mut q, &world, &pois);
        }
        c.teleport(&SpawnPoint::CONTROLS);
        assert_eq!(c.pose().position, Point3::new(-13.0, 4.0, -60.0));
        assert_eq!(c.movement().velocity().norm(), 0.0);

        c.teleport(&SpawnPoint::new(Point3::new(f32::NAN, 0.0, 0.0), 0.0, 0.0));
        assert_eq!(c.pose().position, Point3::new(-13.0, 4.0, -60.0));
    }

    #[test]
    fn nearby_saint_is_reported_and_text_shown_on_interact() {
        let mut c = controller();
        let world = CollisionWorld::empty();
        let mut pois = PoiRegistry::new();
        pois.register_saint("SactusPaulus", Point3::new(0.0, 3.0, -2.0));

        let mut q = QueuedInput::new(true);
        let out = c.frame(DT, &mut q, &world, &pois);
        assert_eq!(out.nearby.as_deref(), Some("SactusPaulus"));
        assert!(out.display_text.is_none());

        q.key_down("KeyE");
        let out = c.frame(DT, &mut q, &world, &pois);
        assert!(out.display_text.expect("text").contains("Saint Paul"));
    }

    #[test]
    fn wall_blocks_walk_through_full_pipeline() {
        let wall = TriangleMesh::new(
            vec![
                Point3::new(-50.0, -10.0, -6.0),
                Point3::new(-50.0, 40.0, -6.0),
                Point3::new(50.0, 40.0, -6.0),
                Point3::new(50.0, -10.0, -6.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let world = CollisionWorld::build([&wall]);
        let pois = PoiRegistry::new();
        let mut c = controller();
        let eye_y = c.pose().position.y;

        let mut q = QueuedInput::new(true);
        q.key_down("KeyW");
        for _ in 0..180 {
            c.frame(DT, &mut q, &world, &pois);
        }
        assert!((c.pose().position.z - (-4.5)).abs() < 1.0e-3);
        assert_eq!(c.pose().position.y, eye_y);
    }
}
