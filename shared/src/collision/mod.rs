/*!
Collision root module.

Static level geometry is indexed once into an octree; the player capsule is
then tested against it every frame. The code is split for clarity:

- types:        shared data types (Capsule, Triangle, TriangleMesh, Penetration)
- settings:     octree limits and tolerance constants
- broad:        octree over the triangle soup, box/triangle SAT, candidate queries
- narrow_phase: capsule versus single triangle penetration
- world:        the immutable collision world and its capsule query
- ground:       floor / wall / ceiling contact classification
*/

pub mod broad;
pub mod ground;
pub mod narrow_phase;
pub mod settings;
pub mod types;
pub mod world;

// Re-export commonly used types and functions.
pub use ground::{ContactKind, classify_normal, is_floor_contact};
pub use types::{Capsule, Penetration, Point3, Quat, Triangle, TriangleMesh, Vec3};
pub use world::CollisionWorld;
