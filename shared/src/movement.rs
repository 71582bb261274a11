use crate::{
    bitmask_flags::{ActionSet, Feature, MoveAction},
    collision::{Capsule, CollisionWorld, Penetration, Point3, Vec3, is_floor_contact},
    config::{ControllerConfig, SpawnPoint},
    motion::{self, damping_coefficient, impulse, sanitize_dt},
    orientation::Angles,
};

/// Constants the integrator needs every frame.
#[derive(Clone, Copy, Debug)]
pub struct MovementParams {
    pub base_speed: f32,
    pub acceleration: f32,
    pub damping_rate: f32,
    pub floor_damping_boost: f32,
    pub ground_detection: bool,
    /// Component-wise mask applied to collision corrections. The vertical
    /// component is always dropped regardless of the mask.
    pub correction_mask: Vec3,
    pub radius: f32,
    pub foot_offset: f32,
    pub eye_offset: f32,
}

impl MovementParams {
    pub fn from_config(cfg: &ControllerConfig) -> Self {
        Self {
            base_speed: cfg.base_speed,
            acceleration: cfg.acceleration,
            damping_rate: cfg.damping_rate,
            floor_damping_boost: cfg.floor_damping_boost,
            ground_detection: cfg.has_feature(Feature::GroundDetection),
            correction_mask: cfg.correction_mask,
            radius: cfg.capsule_radius,
            foot_offset: cfg.foot_offset,
            eye_offset: cfg.eye_offset,
        }
    }
}

impl Default for MovementParams {
    fn default() -> Self {
        Self::from_config(&ControllerConfig::default())
    }
}

/// Output of a single `MovementIntegrator::update()` tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    /// Upper capsule endpoint after collision: where the camera goes.
    pub eye: Point3,
    /// Raw collision reported by the world this tick, before masking.
    pub collision: Option<Penetration>,
    /// Translation actually applied to resolve the collision (masked).
    pub correction: Vec3,
    /// Whether this tick's contact counts as floor for the next tick's damping.
    pub on_floor: bool,
}

/// Owns the player capsule and its velocity.
#[derive(Clone, Debug)]
pub struct MovementIntegrator {
    capsule: Capsule,
    velocity: Vec3,
    on_floor: bool,
    params: MovementParams,
}

impl MovementIntegrator {
    pub fn new(params: MovementParams, spawn: &SpawnPoint) -> Self {
        Self {
            capsule: Self::capsule_at(&params, spawn),
            velocity: Vec3::zeros(),
            on_floor: false,
            params,
        }
    }

    fn capsule_at(params: &MovementParams, spawn: &SpawnPoint) -> Capsule {
        Capsule::upright(
            spawn.position,
            params.foot_offset,
            params.eye_offset,
            params.radius,
        )
    }

    /// One tick: damping, impulses, translation, collision.
    ///
    /// `heading` is the camera rotation the impulses are taken from.
    pub fn update(
        &mut self,
        dt: f32,
        actions: ActionSet,
        heading: Angles,
        world: &CollisionWorld,
    ) -> StepResult {
        let dt = sanitize_dt(dt);
        let p = self.params;

        // 1) Damping.
        let k = if p.ground_detection && self.on_floor {
            p.floor_damping_boost
        } else {
            1.0
        };
        self.velocity += self.velocity * damping_coefficient(p.damping_rate, dt, k);

        // 2) Impulses from held actions.
        self.velocity += self.wish_velocity(dt, actions, heading);

        // 3) Translate.
        let delta = self.velocity * dt;
        if delta.iter().all(|v| v.is_finite()) {
            self.capsule.translate(&delta);
        } else {
            log::warn!("movement: dropping non-finite velocity {:?}", self.velocity);
            self.velocity = Vec3::zeros();
        }

        // 4) + 5) Collision, with the masked (horizontal) correction.
        let collision = world.query_capsule(&self.capsule);
        let mut correction = Vec3::zeros();
        let mut on_floor = false;
        if let Some(pen) = collision {
            correction = pen.horizontal_correction().component_mul(&p.correction_mask);
            self.capsule.translate(&correction);
            on_floor = p.ground_detection && is_floor_contact(&pen);
        }
        self.on_floor = on_floor;

        StepResult {
            eye: self.capsule.end,
            collision,
            correction,
            on_floor,
        }
    }

    /// Sum of this tick's impulses for the held actions.
    fn wish_velocity(&self, dt: f32, actions: ActionSet, heading: Angles) -> Vec3 {
        let p = &self.params;
        let forward = motion::horizontal_forward(heading.yaw, heading.pitch);
        let side = motion::side_vector(heading.yaw, heading.pitch);

        let mut wish = Vec3::zeros();
        for (action, dir, sign) in [
            (MoveAction::Forward, forward, 1.0),
            (MoveAction::Back, forward, -1.0),
            (MoveAction::Left, side, -1.0),
            (MoveAction::Right, side, 1.0),
        ] {
            if !actions.has(action) {
                continue;
            }
            if let Some(dir) = dir {
                wish += impulse(dir * sign, dt, p.base_speed, p.acceleration);
            }
        }
        wish
    }

    /// Replace the capsule and stop all motion.
    pub fn teleport(&mut self, spawn: &SpawnPoint) {
        self.capsule = Self::capsule_at(&self.params, spawn);
        self.velocity = Vec3::zeros();
        self.on_floor = false;
    }

    #[inline]
    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn eye(&self) -> Point3 {
        self.capsule.end
    }

    #[inline]
    pub fn on_floor(&self) -> bool {
        self.on_floor
    }

    #[inline]
    pub fn params(&self) -> &MovementParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::TriangleMesh;
    use std::f32::consts::PI;

    fn held(actions: &[MoveAction]) -> ActionSet {
        ActionSet::from_slice(actions)
    }

    fn quad(a: Point3, b: Point3, c: Point3, d: Point3) -> TriangleMesh {
        TriangleMesh::new(vec![a, b, c, d], vec![[0, 1, 2], [0, 2, 3]])
    }

    fn spawn_at(x: f32, y: f32, z: f32) -> SpawnPoint {
        SpawnPoint::new(Point3::new(x, y, z), 0.0, 0.0)
    }

    #[test]
    fn damping_decreases_speed_monotonically() {
        let world = CollisionWorld::empty();
        let mut m = MovementIntegrator::new(MovementParams::default(), &spawn_at(0.0, 0.0, 0.0));
        let heading = Angles::default();
        for _ in 0..30 {
            m.update(1.0 / 60.0, held(&[MoveAction::Forward]), heading, &world);
        }
        let mut prev = m.velocity();
        assert!(prev.norm() > 0.0);
        for _ in 0..600 {
            m.update(1.0 / 60.0, ActionSet::default(), heading, &world);
            let v = m.velocity();
            assert!(v.norm() <= prev.norm());
            // Never reverses.
            assert!(v.dot(&prev) >= 0.0);
            prev = v;
        }
        assert!(prev.norm() < 1.0e-3);
    }

    #[test]
    fn straight_walk_matches_closed_form() {
        let params = MovementParams {
            base_speed: 10.0,
            ..MovementParams::default()
        };
        let world = CollisionWorld::empty();
        let mut m = MovementIntegrator::new(params, &spawn_at(0.0, 0.0, 0.0));
        let start = m.eye();
        let heading = Angles { pitch: 0.0, yaw: PI };
        let dt = 0.1f32;
        for _ in 0..10 {
            m.update(dt, held(&[MoveAction::Forward]), heading, &world);
        }
        let moved = m.eye() - start;

        let e = (-params.damping_rate * dt).exp();
        let a = dt * params.base_speed * params.acceleration;
        let n = 10.0f32;
        let expected = dt * a / (1.0 - e) * (n - e * (1.0 - e.powf(n)) / (1.0 - e));

        assert!((moved.z - expected).abs() < 1.0e-3, "{} vs {}", moved.z, expected);
        assert!(moved.x.abs() < 1.0e-4);
        assert_eq!(moved.y, 0.0);
    }

    #[test]
    fn opposite_actions_cancel() {
        let world = CollisionWorld::empty();
        let mut m = MovementIntegrator::new(MovementParams::default(), &spawn_at(0.0, 0.0, 0.0));
        m.update(
            0.1,
            held(&[MoveAction::Forward, MoveAction::Back, MoveAction::Left, MoveAction::Right]),
            Angles::default(),
            &world,
        );
        assert!(m.velocity().norm() < 1.0e-6);
    }

    #[test]
    fn looking_straight_up_contributes_nothing() {
        let world = CollisionWorld::empty();
        let mut m = MovementIntegrator::new(MovementParams::default(), &spawn_at(0.0, 0.0, 0.0));
        let heading = Angles {
            pitch: PI / 2.0,
            yaw: 0.0,
        };
        m.update(0.1, held(&[MoveAction::Forward, MoveAction::Right]), heading, &world);
        assert_eq!(m.velocity(), Vec3::zeros());
    }

    #[test]
    fn bad_dt_is_treated_as_zero() {
        let world = CollisionWorld::empty();
        let mut m = MovementIntegrator::new(MovementParams::default(), &spawn_at(0.0, 0.0, 0.0));
        let before = *m.capsule();
        for dt in [f32::NAN, -1.0, f32::INFINITY] {
            m.update(dt, held(&[MoveAction::Forward]), Angles::default(), &world);
        }
        assert_eq!(*m.capsule(), before);
        assert_eq!(m.velocity(), Vec3::zeros());
    }

    #[test]
    fn walking_into_wall_stops_at_radius() {
        let floor = quad(
            Point3::new(-50.0, 0.0, -50.0),
            Point3::new(-50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, -50.0),
        );
        // Wall plane z = -10, facing +Z.
        let wall = quad(
            Point3::new(-50.0, -10.0, -10.0),
            Point3::new(-50.0, 40.0, -10.0),
            Point3::new(50.0, 40.0, -10.0),
            Point3::new(50.0, -10.0, -10.0),
        );
        let world = CollisionWorld::build([&floor, &wall]);
        let mut m = MovementIntegrator::new(MovementParams::default(), &spawn_at(0.0, 1.0, 0.0));
        let start_y = m.eye().y;

        let mut touched = false;
        for _ in 0..240 {
            let step = m.update(1.0 / 60.0, held(&[MoveAction::Forward]), Angles::default(), &world);
            assert_eq!(step.correction.y, 0.0);
            if step.correction.z > 0.0 {
                touched = true;
            }
        }
        assert!(touched);
        let distance = m.capsule().start.z - (-10.0);
        assert!((distance - 1.5).abs() < 1.0e-3, "distance {distance}");
        assert_eq!(m.eye().y, start_y);
    }

    #[test]
    fn collision_correction_reduces_penetration() {
        let wall = quad(
            Point3::new(-50.0, -10.0, -10.0),
            Point3::new(-50.0, 40.0, -10.0),
            Point3::new(50.0, 40.0, -10.0),
            Point3::new(50.0, -10.0, -10.0),
        );
        let world = CollisionWorld::build([&wall]);
        let mut m = MovementIntegrator::new(MovementParams::default(), &spawn_at(0.0, 1.0, -9.0));
        let before = world
            .query_capsule(m.capsule())
            .map(|p| p.depth)
            .unwrap_or(0.0);
        assert!(before > 0.0);
        m.update(0.0, ActionSet::default(), Angles::default(), &world);
        let after = world
            .query_capsule(m.capsule())
            .map(|p| p.depth)
            .unwrap_or(0.0);
        assert!(after <= before);
    }

    #[test]
    fn ground_detection_boosts_damping_on_floor() {
        let floor = quad(
            Point3::new(-50.0, 0.0, -50.0),
            Point3::new(-50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, -50.0),
        );
        let world = CollisionWorld::build([&floor]);

        let plain = MovementParams::default();
        let boosted = MovementParams {
            ground_detection: true,
            ..plain
        };
        // Spawn slightly sunk into the floor so the capsule always touches it.
        let spawn = spawn_at(0.0, -0.5, 0.0);
        let mut a = MovementIntegrator::new(plain, &spawn);
        let mut b = MovementIntegrator::new(boosted, &spawn);

        for m in [&mut a, &mut b] {
            for _ in 0..20 {
                m.update(1.0 / 60.0, held(&[MoveAction::Forward]), Angles::default(), &world);
            }
        }
        assert!(!a.on_floor());
        assert!(b.on_floor());
        assert!(b.velocity().norm() < a.velocity().norm());
    }

    #[test]
    fn long_frame_on_floor_does_not_reverse_velocity() {
        let floor = quad(
            Point3::new(-50.0, 0.0, -50.0),
            Point3::new(-50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, -50.0),
        );
        let world = CollisionWorld::build([&floor]);
        let params = MovementParams {
            ground_detection: true,
            ..MovementParams::default()
        };
        let mut m = MovementIntegrator::new(params, &spawn_at(0.0, -0.5, 0.0));
        for _ in 0..20 {
            m.update(1.0 / 60.0, held(&[MoveAction::Forward]), Angles::default(), &world);
        }
        assert!(m.on_floor());
        let before = m.velocity();
        assert!(before.norm() > 0.0);

        m.update(0.5, ActionSet::default(), Angles::default(), &world);
        let after = m.velocity();
        assert!(after.dot(&before) >= 0.0, "{before:?} -> {after:?}");
        assert!(after.norm() <= before.norm());
    }

    #[test]
    fn correction_stays_horizontal_with_full_mask() {
        let floor = quad(
            Point3::new(-50.0, 0.0, -50.0),
            Point3::new(-50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, 50.0),
            Point3::new(50.0, 0.0, -50.0),
        );
        let world = CollisionWorld::build([&floor]);
        let params = MovementParams {
            correction_mask: Vec3::new(1.0, 1.0, 1.0),
            ..MovementParams::default()
        };
        let mut m = MovementIntegrator::new(params, &spawn_at(0.0, -0.5, 0.0));
        let step = m.update(1.0 / 60.0, ActionSet::default(), Angles::default(), &world);
        assert!(step.collision.is_some());
        assert_eq!(step.correction.y, 0.0);
        assert_eq!(m.capsule().start.y, -0.5 + params.foot_offset);
    }

    #[test]
    fn teleport_replaces_capsule_and_stops() {
        let world = CollisionWorld::empty();
        let mut m = MovementIntegrator::new(MovementParams::default(), &spawn_at(0.0, 0.0, 0.0));
        m.update(0.1, held(&[MoveAction::Forward]), Angles::default(), &world);
        assert!(m.velocity().norm() > 0.0);

        m.teleport(&SpawnPoint::CONTROLS);
        assert_eq!(m.velocity(), Vec3::zeros());
        assert_eq!(m.eye(), Point3::new(-13.0, 4.0, -60.0));
        assert_eq!(m.capsule().start, Point3::new(-13.0, 1.25, -60.0));
    }
}
