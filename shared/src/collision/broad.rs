use parry3d::bounding_volume::{Aabb, BoundingVolume};

use super::{
    settings::{MAX_OCTREE_DEPTH, MAX_TRIANGLES_PER_LEAF, ROOT_BOUNDS_MARGIN, SAT_EPS},
    types::{Point3, Triangle, Vec3},
};

/// One cell of the octree. Interior nodes own no triangles; leaves own no children.
#[derive(Clone, Debug)]
pub struct OctreeNode {
    pub bounds: Aabb,
    /// Indices into `Octree::nodes`.
    pub children: Vec<u32>,
    /// Indices into `Octree::triangles`.
    pub triangles: Vec<u32>,
}

impl OctreeNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Broad-phase acceleration structure over a static triangle soup.
///
/// Notes:
/// - Nodes live in a flat arena; node 0 is the root when the tree is non-empty.
/// - A triangle straddling several children is referenced by each of them, so
///   candidate lists are deduplicated before being returned.
/// - A node stops splitting once it holds at most `MAX_TRIANGLES_PER_LEAF`
///   triangles, reaches `MAX_OCTREE_DEPTH`, or when a split would hand the whole
///   set to a single child (coincident triangles would otherwise recurse forever).
#[derive(Clone, Debug, Default)]
pub struct Octree {
    pub nodes: Vec<OctreeNode>,
    pub triangles: Vec<Triangle>,
}

impl Octree {
    /// Build the tree over already-validated triangles.
    pub fn build(triangles: Vec<Triangle>) -> Self {
        if triangles.is_empty() {
            return Self::default();
        }

        let root_bounds = triangles
            .iter()
            .map(Triangle::aabb)
            .reduce(|acc, b| acc.merged(&b))
            .map(|b| b.loosened(ROOT_BOUNDS_MARGIN))
            .unwrap_or_else(|| Aabb::new(Point3::origin(), Point3::origin()));

        let mut tree = Self {
            nodes: Vec::new(),
            triangles,
        };
        let all: Vec<u32> = (0..tree.triangles.len() as u32).collect();
        tree.build_node(root_bounds, all, 0);
        tree
    }

    fn build_node(&mut self, bounds: Aabb, subset: Vec<u32>, depth: u32) -> u32 {
        let id = self.nodes.len() as u32;
        self.nodes.push(OctreeNode {
            bounds,
            children: Vec::new(),
            triangles: Vec::new(),
        });

        if subset.len() <= MAX_TRIANGLES_PER_LEAF || depth >= MAX_OCTREE_DEPTH {
            self.nodes[id as usize].triangles = subset;
            return id;
        }

        let parent_len = subset.len();
        let mut children = Vec::with_capacity(8);
        for child_bounds in bounds.split_at_center() {
            let child_subset: Vec<u32> = subset
                .iter()
                .copied()
                .filter(|&t| triangle_intersects_aabb(&self.triangles[t as usize], &child_bounds))
                .collect();
            if child_subset.is_empty() {
                continue;
            }
            let child = if child_subset.len() == parent_len {
                // No progress: everything overlaps this octant too. Stop here.
                let leaf = self.nodes.len() as u32;
                self.nodes.push(OctreeNode {
                    bounds: child_bounds,
                    children: Vec::new(),
                    triangles: child_subset,
                });
                leaf
            } else {
                self.build_node(child_bounds, child_subset, depth + 1)
            };
            children.push(child);
        }

        self.nodes[id as usize].children = children;
        id
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Deepest level reached by the tree (root is 0). Empty tree reports 0.
    pub fn depth(&self) -> u32 {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut max_depth = 0;
        let mut stack = vec![(0u32, 0u32)];
        while let Some((id, d)) = stack.pop() {
            max_depth = max_depth.max(d);
            for &c in &self.nodes[id as usize].children {
                stack.push((c, d + 1));
            }
        }
        max_depth
    }

    #[inline]
    pub fn triangle(&self, index: u32) -> Option<&Triangle> {
        self.triangles.get(index as usize)
    }

    /// Indices of triangles stored in leaves whose bounds overlap `query`.
    ///
    /// The result is sorted and free of duplicates.
    pub fn candidates(&self, query: &Aabb) -> Vec<u32> {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return out;
        }

        let mut stack = vec![0u32];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id as usize];
            if !node.bounds.intersects(query) {
                continue;
            }
            if node.is_leaf() {
                out.extend(
                    node.triangles
                        .iter()
                        .copied()
                        .filter(|&t| self.triangles[t as usize].aabb().intersects(query)),
                );
            } else {
                stack.extend(node.children.iter().copied());
            }
        }

        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Exact triangle/box overlap test (separating axis theorem, 13 axes).
///
/// Axes tested: the 3 box face normals, the triangle normal, and the 9 cross
/// products of box axes with triangle edges. Touching counts as overlapping.
pub fn triangle_intersects_aabb(tri: &Triangle, aabb: &Aabb) -> bool {
    let c = aabb.center();
    let h = aabb.half_extents();

    let v0 = tri.a - c;
    let v1 = tri.b - c;
    let v2 = tri.c - c;

    // Box face normals.
    for i in 0..3 {
        let min = v0[i].min(v1[i]).min(v2[i]);
        let max = v0[i].max(v1[i]).max(v2[i]);
        if min > h[i] + SAT_EPS || max < -h[i] - SAT_EPS {
            return false;
        }
    }

    let edges = [v1 - v0, v2 - v1, v0 - v2];
    let axes = [Vec3::x(), Vec3::y(), Vec3::z()];

    // Edge cross products.
    for e in &edges {
        for u in &axes {
            let axis = u.cross(e);
            if axis.norm_squared() <= SAT_EPS * SAT_EPS {
                continue;
            }
            if separated_on_axis(&axis, &v0, &v1, &v2, &h) {
                return false;
            }
        }
    }

    // Triangle normal.
    let n = edges[0].cross(&edges[1]);
    if n.norm_squared() > SAT_EPS * SAT_EPS && separated_on_axis(&n, &v0, &v1, &v2, &h) {
        return false;
    }

    true
}

#[inline]
fn separated_on_axis(axis: &Vec3, v0: &Vec3, v1: &Vec3, v2: &Vec3, h: &Vec3) -> bool {
    let p0 = v0.dot(axis);
    let p1 = v1.dot(axis);
    let p2 = v2.dot(axis);
    let r = h.x * axis.x.abs() + h.y * axis.y.abs() + h.z * axis.z.abs();
    let slack = SAT_EPS * axis.norm();
    p0.min(p1).min(p2) > r + slack || p0.max(p1).max(p2) < -r - slack
}
