/*!
Collision tuning constants and tolerances.

These constants centralize the parameters used by the octree build, the
capsule/triangle narrow phase and contact classification. Keeping them
together makes tuning easier.

Notes
- Distances are in meters.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// A node is split into eight children while it holds more triangles than this.
pub const MAX_TRIANGLES_PER_LEAF: usize = 8;

/// Maximum subdivision depth of the octree (root is depth 0).
pub const MAX_OCTREE_DEPTH: u32 = 16;

/// Margin added around the root bounds so triangles lying exactly on the
/// outer faces still fall strictly inside (meters).
pub const ROOT_BOUNDS_MARGIN: f32 = 0.01;

/// Squared length of the unnormalized triangle normal below which a triangle is
/// treated as degenerate (zero area) and skipped.
pub const DEGENERATE_AREA_SQ: f32 = 1.0e-12;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Slack used by separating-axis tests so that touching counts as overlapping.
pub const SAT_EPS: f32 = 1.0e-5;

/// Net corrections shorter than this are reported as "no collision".
pub const MIN_CORRECTION: f32 = 1.0e-5;

/// Contacts whose normal has at least this much +Y are classified as floor.
///
/// 0.0 matches the walkthrough's historical "normal.y > 0" rule; raise it to
/// exclude steep ramps.
pub const FLOOR_NORMAL_MIN_Y: f32 = 0.0;

/// Contacts whose normal has at most this much +Y (i.e. facing down) are ceilings.
pub const CEILING_NORMAL_MAX_Y: f32 = -0.5;
