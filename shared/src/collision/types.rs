/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms beyond trivial accessors. It
defines the data exchanged between:
- broad (octree over the static triangle soup, candidate queries)
- narrow_phase (capsule versus single triangle penetration)
- world (the immutable collision world and its capsule query)
- ground (contact classification)
- the movement integrator, which owns the player capsule
*/

use nalgebra as na;
use parry3d::bounding_volume::Aabb;

use super::settings::DEGENERATE_AREA_SQ;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// The player's collision volume: a segment swept by a sphere.
///
/// `start` is the lower endpoint (feet), `end` the upper one (eyes). The
/// camera is placed at `end` every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    pub start: Point3,
    pub end: Point3,
    pub radius: f32,
}

impl Capsule {
    #[inline]
    pub fn new(start: Point3, end: Point3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Build an upright capsule standing at `feet`.
    ///
    /// The segment runs from `feet + foot_offset` to `feet + eye_offset` along +Y.
    #[inline]
    pub fn upright(feet: Point3, foot_offset: f32, eye_offset: f32, radius: f32) -> Self {
        Self {
            start: feet + Vec3::new(0.0, foot_offset, 0.0),
            end: feet + Vec3::new(0.0, eye_offset, 0.0),
            radius,
        }
    }

    #[inline]
    pub fn translate(&mut self, delta: &Vec3) {
        self.start += *delta;
        self.end += *delta;
    }

    #[inline]
    pub fn translated(mut self, delta: &Vec3) -> Self {
        self.translate(delta);
        self
    }

    #[inline]
    pub fn center(&self) -> Point3 {
        na::center(&self.start, &self.end)
    }

    /// World-space bounding box of the whole capsule (segment inflated by the radius).
    pub fn aabb(&self) -> Aabb {
        let r = Vec3::repeat(self.radius);
        Aabb::new(
            self.start.inf(&self.end) - r,
            self.start.sup(&self.end) + r,
        )
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.start.iter().all(|v| v.is_finite())
            && self.end.iter().all(|v| v.is_finite())
            && self.radius.is_finite()
    }
}

/// A single world-space triangle of static level geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Point3,
    pub b: Point3,
    pub c: Point3,
}

impl Triangle {
    #[inline]
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self { a, b, c }
    }

    /// Unit face normal following the winding `a -> b -> c`, or `None` when degenerate.
    pub fn normal(&self) -> Option<Vec3> {
        let n = (self.b - self.a).cross(&(self.c - self.a));
        let len_sq = n.norm_squared();
        if !len_sq.is_finite() || len_sq <= DEGENERATE_AREA_SQ {
            return None;
        }
        Some(n / len_sq.sqrt())
    }

    /// A triangle is usable for collision if all its vertices are finite and it has area.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.vertices()
            .iter()
            .all(|p| p.iter().all(|v| v.is_finite()))
            && self.normal().is_some()
    }

    #[inline]
    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    #[inline]
    pub fn edges(&self) -> [(Point3, Point3); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.a.inf(&self.b).inf(&self.c),
            self.a.sup(&self.b).sup(&self.c),
        )
    }
}

/// Indexed triangle soup in world space, as handed over by the level loader.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Point3>,
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new(positions: Vec<Point3>, indices: Vec<[u32; 3]>) -> Self {
        Self { positions, indices }
    }

    /// Build a mesh from a flat index buffer (three indices per triangle).
    ///
    /// A trailing partial triangle is dropped.
    pub fn from_flat_indices(positions: Vec<Point3>, flat: &[u32]) -> Self {
        let indices = flat
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect();
        Self { positions, indices }
    }

    /// Non-indexed soup: every three consecutive positions form a triangle.
    pub fn from_soup(positions: Vec<Point3>) -> Self {
        let count = (positions.len() / 3) as u32;
        let indices = (0..count).map(|t| [t * 3, t * 3 + 1, t * 3 + 2]).collect();
        Self { positions, indices }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate triangles, skipping any whose indices fall outside `positions`.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.iter().filter_map(|&[i, j, k]| {
            let a = *self.positions.get(i as usize)?;
            let b = *self.positions.get(j as usize)?;
            let c = *self.positions.get(k as usize)?;
            Some(Triangle::new(a, b, c))
        })
    }
}

/// Result of a capsule query: push the capsule by `normal * depth` to separate it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    /// Unit direction pointing out of the geometry, toward free space.
    pub normal: Vec3,
    /// Distance to travel along `normal` (meters, > 0).
    pub depth: f32,
}

impl Penetration {
    #[inline]
    pub fn correction(&self) -> Vec3 {
        self.normal * self.depth
    }

    /// Correction with the vertical (up-axis) component removed.
    #[inline]
    pub fn horizontal_correction(&self) -> Vec3 {
        let mut v = self.correction();
        v.y = 0.0;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_capsule_stands_on_y() {
        let c = Capsule::upright(Point3::new(-13.0, 1.0, -60.0), 0.25, 3.0, 1.5);
        assert_eq!(c.start, Point3::new(-13.0, 1.25, -60.0));
        assert_eq!(c.end, Point3::new(-13.0, 4.0, -60.0));
        assert!(c.start.y < c.end.y);
    }

    #[test]
    fn capsule_aabb_is_inflated_by_radius() {
        let c = Capsule::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 2.0, 0.0), 0.5);
        let aabb = c.aabb();
        assert_eq!(aabb.mins, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(aabb.maxs, Point3::new(0.5, 2.5, 0.5));
    }

    #[test]
    fn degenerate_triangle_has_no_normal() {
        let t = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        );
        assert!(t.normal().is_none());
        assert!(!t.is_valid());
    }

    #[test]
    fn mesh_skips_out_of_range_indices() {
        let mesh = TriangleMesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 1, 9]],
        );
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn horizontal_correction_drops_y() {
        let p = Penetration {
            normal: Vec3::new(0.6, 0.8, 0.0),
            depth: 2.0,
        };
        let h = p.horizontal_correction();
        assert_eq!(h.y, 0.0);
        assert!((h.x - 1.2).abs() < 1.0e-6);
    }
}
