use super::{
    settings::DIST_EPS,
    types::{Capsule, Penetration, Point3, Triangle, Vec3},
};

/// Closest points between segments `p1-q1` and `p2-q2`.
///
/// Returns `(point_on_first, point_on_second)`. Degenerate (zero-length) segments
/// are treated as points.
pub fn closest_points_segment_segment(
    p1: Point3,
    q1: Point3,
    p2: Point3,
    q2: Point3,
) -> (Point3, Point3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t) = if a <= DIST_EPS && e <= DIST_EPS {
        (0.0, 0.0)
    } else if a <= DIST_EPS {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= DIST_EPS {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            // Parallel segments: any s works, pick the start and let t clamp.
            let mut s = if denom > DIST_EPS * DIST_EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;

            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// Barycentric containment test for a point already lying in the triangle's plane.
pub fn triangle_contains_coplanar_point(tri: &Triangle, p: &Point3) -> bool {
    let v0 = tri.c - tri.a;
    let v1 = tri.b - tri.a;
    let v2 = p - tri.a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() <= f32::EPSILON {
        return false;
    }
    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;

    const SLACK: f32 = 1.0e-5;
    u >= -SLACK && v >= -SLACK && u + v <= 1.0 + SLACK
}

/// Penetration of a capsule into a single triangle, if any.
///
/// Triangles are two-sided: the capsule is pushed toward whichever side of the
/// triangle plane holds the middle of its segment.
///
/// Cases
/// - The capsule axis pierces the triangle: push along the face normal until the
///   lower endpoint sits `radius` above the plane.
/// - Otherwise the closest feature pair between the segment and the triangle is
///   either an endpoint projected onto the face or a segment/edge pair; the
///   capsule penetrates when that distance is below the radius.
pub fn capsule_triangle_penetration(capsule: &Capsule, tri: &Triangle) -> Option<Penetration> {
    let mut n = tri.normal()?;
    let radius = capsule.radius;

    let mut ds = n.dot(&(capsule.start - tri.a));
    let mut de = n.dot(&(capsule.end - tri.a));

    // Choose the side of the plane the capsule is (mostly) on.
    if ds + de < 0.0 {
        n = -n;
        ds = -ds;
        de = -de;
    }

    // Both endpoints farther from the plane than the radius: no contact possible.
    if ds > radius && de > radius {
        return None;
    }

    // Axis crosses the plane: check whether the crossing point lies inside the face.
    if ds * de < 0.0 {
        let t = ds / (ds - de);
        let crossing = capsule.start + (capsule.end - capsule.start) * t;
        if triangle_contains_coplanar_point(tri, &crossing) {
            return Some(Penetration {
                normal: n,
                depth: radius - ds.min(de),
            });
        }
    }

    // Closest distance between segment and triangle.
    let mut best: Option<(f32, Point3, Point3)> = None;
    let mut consider = |seg_pt: Point3, tri_pt: Point3| {
        let dist_sq = (seg_pt - tri_pt).norm_squared();
        if best.map_or(true, |(b, _, _)| dist_sq < b) {
            best = Some((dist_sq, seg_pt, tri_pt));
        }
    };

    for (endpoint, d) in [(capsule.start, ds), (capsule.end, de)] {
        let projected = endpoint - n * d;
        if triangle_contains_coplanar_point(tri, &projected) {
            consider(endpoint, projected);
        }
    }
    for (e0, e1) in tri.edges() {
        let (seg_pt, tri_pt) = closest_points_segment_segment(capsule.start, capsule.end, e0, e1);
        consider(seg_pt, tri_pt);
    }

    let (dist_sq, seg_pt, tri_pt) = best?;
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > DIST_EPS {
        (seg_pt - tri_pt) / dist
    } else {
        // Touching exactly: the only stable direction is the face normal.
        n
    };

    Some(Penetration {
        normal,
        depth: radius - dist,
    })
}

/// Signed distance from `p` to the triangle's plane (positive on the normal side).
#[inline]
pub fn plane_distance(tri: &Triangle, p: &Point3) -> Option<f32> {
    let n: Vec3 = tri.normal()?;
    Some(n.dot(&(p - tri.a)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at_z(z: f32) -> Triangle {
        // Large vertical triangle in the plane z = `z`, normal facing -Z.
        Triangle::new(
            Point3::new(-50.0, -50.0, z),
            Point3::new(50.0, -50.0, z),
            Point3::new(0.0, 50.0, z),
        )
    }

    #[test]
    fn closest_points_of_crossing_segments() {
        let (a, b) = closest_points_segment_segment(
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        );
        assert!((a - Point3::new(0.0, 0.0, 0.0)).norm() < 1.0e-6);
        assert!((b - Point3::new(0.0, 0.0, 1.0)).norm() < 1.0e-6);
    }

    #[test]
    fn closest_points_of_parallel_segments_are_a_valid_pair() {
        let (a, b) = closest_points_segment_segment(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 5.0, 0.0),
        );
        assert!(((a - b).norm() - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn closest_points_degenerate_segments_are_points() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let q = Point3::new(4.0, 2.0, 3.0);
        let (a, b) = closest_points_segment_segment(p, p, q, q);
        assert_eq!(a, p);
        assert_eq!(b, q);
    }

    #[test]
    fn coplanar_containment() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        );
        assert!(triangle_contains_coplanar_point(&tri, &Point3::new(0.25, 0.0, 0.25)));
        assert!(triangle_contains_coplanar_point(&tri, &Point3::new(0.0, 0.0, 0.0)));
        assert!(!triangle_contains_coplanar_point(&tri, &Point3::new(0.8, 0.0, 0.8)));
    }

    #[test]
    fn capsule_near_wall_face_is_pushed_out_along_face_normal() {
        let capsule = Capsule::new(Point3::new(0.0, 0.0, 9.0), Point3::new(0.0, 2.0, 9.0), 1.5);
        let pen = capsule_triangle_penetration(&capsule, &wall_at_z(10.0)).expect("contact");
        assert!((pen.normal - Vec3::new(0.0, 0.0, -1.0)).norm() < 1.0e-5);
        assert!((pen.depth - 0.5).abs() < 1.0e-5);
    }

    #[test]
    fn capsule_far_from_wall_has_no_contact() {
        let capsule = Capsule::new(Point3::new(0.0, 0.0, 5.0), Point3::new(0.0, 2.0, 5.0), 1.5);
        assert!(capsule_triangle_penetration(&capsule, &wall_at_z(10.0)).is_none());
    }

    #[test]
    fn back_side_contact_pushes_toward_back() {
        let capsule = Capsule::new(Point3::new(0.0, 0.0, 11.0), Point3::new(0.0, 2.0, 11.0), 1.5);
        let pen = capsule_triangle_penetration(&capsule, &wall_at_z(10.0)).expect("contact");
        assert!(pen.normal.z > 0.99);
        assert!((pen.depth - 0.5).abs() < 1.0e-5);
    }

    #[test]
    fn edge_contact_points_away_from_edge() {
        // Floor triangle spanning x in [0, 10]; vertical capsule at x = -1, just off the x = 0 edge.
        let floor = Triangle::new(
            Point3::new(0.0, 0.0, -10.0),
            Point3::new(0.0, 0.0, 10.0),
            Point3::new(10.0, 0.0, 0.0),
        );
        let capsule = Capsule::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(-1.0, 2.0, 0.0), 1.5);
        let pen = capsule_triangle_penetration(&capsule, &floor).expect("contact");
        assert!(pen.normal.x < -0.99);
        assert!((pen.depth - 0.5).abs() < 1.0e-5);
    }

    #[test]
    fn piercing_axis_pushes_lower_end_above_plane() {
        let floor = Triangle::new(
            Point3::new(-10.0, 0.0, -10.0),
            Point3::new(-10.0, 0.0, 10.0),
            Point3::new(10.0, 0.0, 0.0),
        );
        let capsule = Capsule::new(Point3::new(0.0, -0.5, 0.0), Point3::new(0.0, 2.5, 0.0), 1.0);
        let pen = capsule_triangle_penetration(&capsule, &floor).expect("contact");
        assert!(pen.normal.y > 0.99);
        assert!((pen.depth - 1.5).abs() < 1.0e-5);
    }
}
