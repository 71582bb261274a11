use super::{
    broad::Octree,
    narrow_phase::capsule_triangle_penetration,
    settings::MIN_CORRECTION,
    types::{Capsule, Penetration, Triangle, TriangleMesh},
};

/// Immutable collision world built once from the level's physical meshes.
///
/// The world is read-only after construction; queries borrow it immutably.
#[derive(Clone, Debug, Default)]
pub struct CollisionWorld {
    octree: Octree,
    skipped: usize,
}

impl CollisionWorld {
    /// A world with no geometry. Every query reports no collision.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index every triangle of `meshes`. Degenerate triangles are skipped.
    pub fn build<'a>(meshes: impl IntoIterator<Item = &'a TriangleMesh>) -> Self {
        Self::from_triangles(meshes.into_iter().flat_map(TriangleMesh::triangles))
    }

    pub fn from_triangles(triangles: impl IntoIterator<Item = Triangle>) -> Self {
        let mut skipped = 0usize;
        let valid: Vec<Triangle> = triangles
            .into_iter()
            .filter(|t| {
                let ok = t.is_valid();
                if !ok {
                    skipped += 1;
                }
                ok
            })
            .collect();

        if skipped > 0 {
            log::warn!("collision world: skipped {skipped} degenerate triangle(s)");
        }

        let octree = Octree::build(valid);
        log::debug!(
            "collision world: {} triangles, {} nodes ({} leaves), depth {}",
            octree.triangle_count(),
            octree.node_count(),
            octree.leaf_count(),
            octree.depth()
        );

        Self { octree, skipped }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.octree.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.octree.triangle_count()
    }

    /// Number of input triangles rejected as degenerate during `build`.
    #[inline]
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    #[inline]
    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    /// Net correction that separates `capsule` from the world, if it overlaps anything.
    ///
    /// Candidates come from the octree (capsule AABB), then each one is resolved
    /// in turn against a scratch copy of the capsule, so later candidates see the
    /// earlier pushes. The reported penetration is the total displacement of the
    /// scratch capsule.
    pub fn query_capsule(&self, capsule: &Capsule) -> Option<Penetration> {
        if self.octree.is_empty() || !capsule.is_finite() || capsule.radius <= 0.0 {
            return None;
        }

        let candidates = self.octree.candidates(&capsule.aabb());
        if candidates.is_empty() {
            return None;
        }

        let mut scratch = *capsule;
        let mut hit = false;
        for index in candidates {
            let Some(tri) = self.octree.triangle(index) else {
                continue;
            };
            if let Some(pen) = capsule_triangle_penetration(&scratch, tri) {
                scratch.translate(&pen.correction());
                hit = true;
            }
        }
        if !hit {
            return None;
        }

        let total = scratch.start - capsule.start;
        let depth = total.norm();
        if !depth.is_finite() || depth < MIN_CORRECTION {
            return None;
        }

        Some(Penetration {
            normal: total / depth,
            depth,
        })
    }
}
